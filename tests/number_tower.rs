//! Promotion-lattice properties across the number tower (C4, §4.4).

use db48x::number::integer::{Integer, SMALL_INT_MAX};
use db48x::number::{based::Based, fraction::Fraction, promote, Real};
use db48x::settings::Settings;
use num_bigint::{BigInt, BigUint};

fn int(v: i64) -> Real {
    Real::Integer(Integer::small(v))
}

#[test]
fn integer_addition_stays_at_integer_rung_when_exact() {
    let settings = Settings::default();
    let result = promote::add(&int(2), &int(3), &settings);
    assert_eq!(result, int(5));
}

#[test]
fn dividing_integers_that_dont_divide_evenly_promotes_to_fraction() {
    let settings = Settings::default();
    let result = promote::div(&int(1), &int(3), &settings).unwrap();
    assert_eq!(result, Real::Fraction(Fraction::new(1.into(), 3.into()).unwrap()));
}

#[test]
fn a_fraction_that_reduces_to_a_whole_number_demotes_to_integer() {
    let settings = Settings::default();
    let result = promote::div(&int(6), &int(3), &settings).unwrap();
    assert_eq!(result, int(2));
}

#[test]
fn division_by_exact_zero_is_an_error() {
    let settings = Settings::default();
    assert!(promote::div(&int(1), &int(0), &settings).is_err());
}

#[test]
fn overflowing_small_integer_addition_widens_to_bignum() {
    let settings = Settings::default();
    let near_max = Real::Integer(Integer::small(SMALL_INT_MAX));
    let result = promote::add(&near_max, &int(10), &settings);
    match result {
        Real::Integer(Integer::Big(v)) => {
            assert_eq!(v, BigInt::from(SMALL_INT_MAX) + BigInt::from(10))
        }
        other => panic!("expected a widened bignum, got {other:?}"),
    }
}

#[test]
fn big_fraction_arithmetic_reduces_through_gcd() {
    let a = Fraction::new(BigInt::from(2), BigInt::from(4)).unwrap();
    assert_eq!(a.numerator(), &BigInt::from(1));
    assert_eq!(a.denominator(), &BigInt::from(2));
}

#[test]
fn based_integer_arithmetic_wraps_at_the_configured_word_size() {
    let a = Based::new(BigUint::from(1u32), 8, 16);
    let b = Based::new(BigUint::from(255u32), 8, 16);
    let sum = db48x::number::based::add(&a, &b);
    assert_eq!(sum.value(), &BigUint::from(0u32), "0x01 + 0xFF wraps to 0 at an 8-bit word size");
}

#[test]
fn based_shift_and_rotate_stay_masked_to_word_size() {
    let a = Based::new(BigUint::from(0b1000_0000u32), 8, 2);
    let shifted = db48x::number::based::shl(&a, 1);
    assert_eq!(shifted.value(), &BigUint::from(0u32));

    let rotated = db48x::number::based::rotate_left(&a, 1);
    assert_eq!(rotated.value(), &BigUint::from(1u32));
}
