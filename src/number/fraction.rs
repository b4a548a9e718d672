//! Reduced rational numbers (§4.4).
//!
//! Always stored reduced, with the denominator positive and the sign
//! carried by the numerator. The fraction/big_fraction byte-encoding
//! distinction collapses here into one arbitrary-precision representation,
//! since in-memory `Integer` already demotes to `Small` when possible.

use crate::number::integer::Integer;
use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{One, Signed, Zero};

/// A reduced rational number: `numerator / denominator`, `denominator > 0`,
/// `gcd(|numerator|, denominator) == 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    /// Builds and reduces `n/d`. Returns `None` if `d` is zero.
    pub fn new(n: BigInt, d: BigInt) -> Option<Self> {
        if d.is_zero() {
            return None;
        }
        let (mut n, mut d) = (n, d);
        if d.is_negative() {
            n = -n;
            d = -d;
        }
        let g = n.gcd(&d);
        if !g.is_zero() && !g.is_one() {
            n /= &g;
            d /= &g;
        }
        Some(Self { numerator: n, denominator: d })
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// `Some(integer)` when the fraction has reduced to a whole number.
    pub fn as_integer(&self) -> Option<Integer> {
        self.denominator
            .is_one()
            .then(|| Integer::from_bigint(self.numerator.clone()))
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn negate(&self) -> Self {
        Self {
            numerator: -self.numerator.clone(),
            denominator: self.denominator.clone(),
        }
    }
}

/// `1 3 /` style division of two exact integers: an integer when the
/// quotient is exact, else a fraction (§4.4.1 "Integer / Integer").
pub enum IntegerDivision {
    Integer(Integer),
    Fraction(Fraction),
    DivideByZero,
}

pub fn divide_integers(a: &Integer, b: &Integer) -> IntegerDivision {
    if b.is_zero() {
        return IntegerDivision::DivideByZero;
    }
    match Fraction::new(a.to_bigint(), b.to_bigint()) {
        None => IntegerDivision::DivideByZero,
        Some(f) => match f.as_integer() {
            Some(i) => IntegerDivision::Integer(i),
            None => IntegerDivision::Fraction(f),
        },
    }
}

fn cross(a: &Fraction, b: &Fraction) -> (BigInt, BigInt, BigInt) {
    (
        &a.numerator * &b.denominator,
        &b.numerator * &a.denominator,
        &a.denominator * &b.denominator,
    )
}

pub fn add(a: &Fraction, b: &Fraction) -> Fraction {
    let (an, bn, d) = cross(a, b);
    Fraction::new(an + bn, d).expect("product of two positive denominators is never zero")
}

pub fn sub(a: &Fraction, b: &Fraction) -> Fraction {
    let (an, bn, d) = cross(a, b);
    Fraction::new(an - bn, d).expect("product of two positive denominators is never zero")
}

pub fn mul(a: &Fraction, b: &Fraction) -> Fraction {
    Fraction::new(&a.numerator * &b.numerator, &a.denominator * &b.denominator)
        .expect("product of two positive denominators is never zero")
}

/// `None` on division by an exact zero.
pub fn div(a: &Fraction, b: &Fraction) -> Option<Fraction> {
    Fraction::new(&a.numerator * &b.denominator, &a.denominator * &b.numerator)
}

/// `MOD`/`REM` on fractions: reduce both operands to a common denominator
/// and apply the integer rule to the numerators (§4.4.2).
pub fn modulo(a: &Fraction, b: &Fraction) -> Option<Fraction> {
    if b.is_zero() {
        return None;
    }
    let (an, bn, d) = cross(a, b);
    let m = ((&an % &bn) + &bn) % &bn;
    Fraction::new(m, d)
}

pub fn remainder(a: &Fraction, b: &Fraction) -> Option<Fraction> {
    if b.is_zero() {
        return None;
    }
    let (an, bn, d) = cross(a, b);
    Fraction::new(an % bn, d)
}

/// `→Q`: best rational approximation of a decimal within `max_denominator`,
/// via the standard continued-fraction expansion.
pub fn from_decimal(d: &crate::number::decimal::Decimal, max_denominator: u64) -> Option<Fraction> {
    let v = d.to_f64_lossy();
    if !v.is_finite() {
        return None;
    }
    let negative = v < 0.0;
    let mut x = v.abs();
    let (mut h_prev, mut h_curr) = (1i64, 0i64);
    let (mut k_prev, mut k_curr) = (0i64, 1i64);
    for _ in 0..64 {
        let a = x.floor();
        let h_next = (a as i64).checked_mul(h_curr)?.checked_add(h_prev)?;
        let k_next = (a as i64).checked_mul(k_curr)?.checked_add(k_prev)?;
        if k_next == 0 || k_next as u64 > max_denominator {
            break;
        }
        h_prev = h_curr;
        h_curr = h_next;
        k_prev = k_curr;
        k_curr = k_next;
        let frac = x - a;
        if frac.abs() < 1e-12 {
            break;
        }
        x = 1.0 / frac;
    }
    let n = if negative { -h_curr } else { h_curr };
    Fraction::new(BigInt::from(n), BigInt::from(k_curr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_decimal_recovers_a_simple_fraction() {
        let d = crate::number::decimal::Decimal::from_f64(0.75, 10);
        let f = from_decimal(&d, 1_000_000).unwrap();
        assert_eq!(f.numerator(), &BigInt::from(3));
        assert_eq!(f.denominator(), &BigInt::from(4));
    }

    #[test]
    fn one_third_is_reduced_and_renders_as_expected() {
        let r = divide_integers(&Integer::small(1), &Integer::small(3));
        match r {
            IntegerDivision::Fraction(f) => {
                assert_eq!(f.numerator(), &BigInt::from(1));
                assert_eq!(f.denominator(), &BigInt::from(3));
            }
            _ => panic!("expected a fraction"),
        }
    }

    #[test]
    fn four_over_two_demotes_to_integer() {
        let r = divide_integers(&Integer::small(4), &Integer::small(2));
        assert!(matches!(r, IntegerDivision::Integer(Integer::Small(2))));
    }

    #[test]
    fn addition_is_commutative_and_reduced() {
        let a = Fraction::new(BigInt::from(1), BigInt::from(6)).unwrap();
        let b = Fraction::new(BigInt::from(1), BigInt::from(3)).unwrap();
        let sum = add(&a, &b);
        assert_eq!(sum.numerator(), &BigInt::from(1));
        assert_eq!(sum.denominator(), &BigInt::from(2));
        assert_eq!(add(&b, &a), sum);
    }

    #[test]
    fn denominator_is_always_positive() {
        let f = Fraction::new(BigInt::from(3), BigInt::from(-9)).unwrap();
        assert!(f.denominator() > &BigInt::from(0));
        assert_eq!(f.numerator(), &BigInt::from(-1));
        assert_eq!(f.denominator(), &BigInt::from(3));
    }
}
