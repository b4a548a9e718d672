//! The single promotion/overflow rule for every numeric operation
//! (§4.4.1, §4.4.2, §9 redesign flag 4 / open question 4).
//!
//! Every public function here takes two [`Real`] operands and the current
//! [`Settings`] and returns the result at the minimum lattice rung that can
//! represent it exactly, per the post-conditions of §4.4.2.3. No call site
//! outside this module decides how to promote.

use super::{fraction, fraction::Fraction, integer, integer::Integer, Real};
use crate::error::ErrorKind;
use crate::settings::{Settings, ZeroPowerZeroPolicy};

fn to_fraction(r: &Real) -> Fraction {
    match r {
        Real::Integer(i) => Fraction::new(i.to_bigint(), 1.into()).expect("denominator 1 is never zero"),
        Real::Fraction(f) => f.clone(),
        Real::Decimal(_) => unreachable!("decimal operands are handled before reaching fraction arithmetic"),
    }
}

fn simplify_fraction(f: Fraction) -> Real {
    match f.as_integer() {
        Some(i) => Real::Integer(i),
        None => Real::Fraction(f),
    }
}

fn has_decimal(a: &Real, b: &Real) -> bool {
    matches!(a, Real::Decimal(_)) || matches!(b, Real::Decimal(_))
}

/// `a + b`.
pub fn add(a: &Real, b: &Real, settings: &Settings) -> Real {
    match (a, b) {
        (Real::Integer(x), Real::Integer(y)) => Real::Integer(integer::add(x, y)),
        _ if has_decimal(a, b) => {
            let p = settings.precision();
            Real::Decimal(super::decimal::add(&a.to_decimal(p), &b.to_decimal(p), p))
        }
        _ => simplify_fraction(fraction::add(&to_fraction(a), &to_fraction(b))),
    }
}

/// `a - b`.
pub fn sub(a: &Real, b: &Real, settings: &Settings) -> Real {
    match (a, b) {
        (Real::Integer(x), Real::Integer(y)) => Real::Integer(integer::sub(x, y)),
        _ if has_decimal(a, b) => {
            let p = settings.precision();
            Real::Decimal(super::decimal::sub(&a.to_decimal(p), &b.to_decimal(p), p))
        }
        _ => simplify_fraction(fraction::sub(&to_fraction(a), &to_fraction(b))),
    }
}

/// `a * b`.
pub fn mul(a: &Real, b: &Real, settings: &Settings) -> Real {
    match (a, b) {
        (Real::Integer(x), Real::Integer(y)) => Real::Integer(integer::mul(x, y)),
        _ if has_decimal(a, b) => {
            let p = settings.precision();
            Real::Decimal(super::decimal::mul(&a.to_decimal(p), &b.to_decimal(p), p))
        }
        _ => simplify_fraction(fraction::mul(&to_fraction(a), &to_fraction(b))),
    }
}

/// `a / b`. `Integer / Integer` produces a fraction when inexact
/// (§4.4.1 "Integer / Integer").
pub fn div(a: &Real, b: &Real, settings: &Settings) -> Result<Real, ErrorKind> {
    if b.is_zero() {
        return Err(ErrorKind::DivideByZero);
    }
    match (a, b) {
        (Real::Integer(x), Real::Integer(y)) => match fraction::divide_integers(x, y) {
            fraction::IntegerDivision::Integer(i) => Ok(Real::Integer(i)),
            fraction::IntegerDivision::Fraction(f) => Ok(Real::Fraction(f)),
            fraction::IntegerDivision::DivideByZero => Err(ErrorKind::DivideByZero),
        },
        _ if has_decimal(a, b) => {
            let p = settings.precision();
            super::decimal::div(&a.to_decimal(p), &b.to_decimal(p), p)
                .map(Real::Decimal)
                .ok_or(ErrorKind::DivideByZero)
        }
        _ => fraction::div(&to_fraction(a), &to_fraction(b))
            .map(simplify_fraction)
            .ok_or(ErrorKind::DivideByZero),
    }
}

/// `MOD`: result takes the sign of the divisor.
pub fn modulo(a: &Real, b: &Real, settings: &Settings) -> Result<Real, ErrorKind> {
    if b.is_zero() {
        return Err(ErrorKind::DivideByZero);
    }
    match (a, b) {
        (Real::Integer(x), Real::Integer(y)) => {
            Ok(Real::Integer(integer::modulo(x, y).expect("checked nonzero above")))
        }
        _ if has_decimal(a, b) => {
            // MOD on decimals: a - floor(a/b)*b, with the divisor's sign.
            let p = settings.precision();
            let q = super::decimal::div(&a.to_decimal(p), &b.to_decimal(p), p).expect("checked nonzero above");
            let q_trunc = truncate_decimal(&q);
            let prod = super::decimal::mul(&q_trunc, &b.to_decimal(p), p);
            let mut r = super::decimal::sub(&a.to_decimal(p), &prod, p);
            if r.is_negative() != b.to_decimal(p).is_negative() && !r.is_zero() {
                r = super::decimal::add(&r, &b.to_decimal(p), p);
            }
            Ok(Real::Decimal(r))
        }
        _ => Ok(simplify_fraction(
            fraction::modulo(&to_fraction(a), &to_fraction(b)).expect("checked nonzero above"),
        )),
    }
}

/// `REM`: result takes the sign of the dividend.
pub fn remainder(a: &Real, b: &Real, settings: &Settings) -> Result<Real, ErrorKind> {
    if b.is_zero() {
        return Err(ErrorKind::DivideByZero);
    }
    match (a, b) {
        (Real::Integer(x), Real::Integer(y)) => {
            Ok(Real::Integer(integer::remainder(x, y).expect("checked nonzero above")))
        }
        _ if has_decimal(a, b) => {
            let p = settings.precision();
            let q = super::decimal::div(&a.to_decimal(p), &b.to_decimal(p), p).expect("checked nonzero above");
            let q_trunc = truncate_decimal(&q);
            let prod = super::decimal::mul(&q_trunc, &b.to_decimal(p), p);
            Ok(Real::Decimal(super::decimal::sub(&a.to_decimal(p), &prod, p)))
        }
        _ => Ok(simplify_fraction(
            fraction::remainder(&to_fraction(a), &to_fraction(b)).expect("checked nonzero above"),
        )),
    }
}

fn truncate_decimal(d: &super::decimal::Decimal) -> super::decimal::Decimal {
    let v = d.to_f64_lossy().trunc();
    super::decimal::Decimal::from_i64(v as i64)
}

/// `a ^ b`. Integer exponents on exact bases stay exact (repeated
/// squaring); anything else falls back to the hardware-float fast path
/// re-expressed as decimal, matching §4.4.1's fast-path carve-out.
pub fn pow(a: &Real, b: &Real, settings: &Settings) -> Result<Real, ErrorKind> {
    if let Real::Integer(Integer::Small(n)) = b {
        if a.is_zero() && *n == 0 {
            return match settings.zero_power_zero() {
                ZeroPowerZeroPolicy::IsOne => Ok(Real::Integer(Integer::small(1))),
                ZeroPowerZeroPolicy::IsUndefined => Err(ErrorKind::ArgumentOutsideDomain),
            };
        }
        if *n == 0 {
            return Ok(Real::Integer(Integer::small(1)));
        }
        if !matches!(a, Real::Decimal(_)) {
            let magnitude = exact_pow(a, n.unsigned_abs(), settings);
            return if *n > 0 {
                Ok(magnitude)
            } else {
                div(&Real::Integer(Integer::small(1)), &magnitude, settings)
            };
        }
    }
    let p = settings.precision();
    let base = a.to_decimal(p).to_f64_lossy();
    let exp = b.to_decimal(p).to_f64_lossy();
    if base == 0.0 && exp == 0.0 {
        return match settings.zero_power_zero() {
            ZeroPowerZeroPolicy::IsOne => Ok(Real::Integer(Integer::small(1))),
            ZeroPowerZeroPolicy::IsUndefined => Err(ErrorKind::ArgumentOutsideDomain),
        };
    }
    Ok(Real::Decimal(super::decimal::Decimal::from_f64(base.powf(exp), p)))
}

fn exact_pow(base: &Real, mut n: u64, settings: &Settings) -> Real {
    let mut result = Real::Integer(Integer::small(1));
    let mut b = base.clone();
    while n > 0 {
        if n & 1 == 1 {
            result = mul(&result, &b, settings);
        }
        b = mul(&b, &b, settings);
        n >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Real {
        Real::Integer(Integer::small(v))
    }

    #[test]
    fn addition_and_multiplication_are_commutative() {
        let s = Settings::default();
        let a = int(7);
        let b = int(-3);
        assert_eq!(add(&a, &b, &s), add(&b, &a, &s));
        assert_eq!(mul(&a, &b, &s), mul(&b, &a, &s));
    }

    #[test]
    fn integer_division_promotes_to_fraction_when_inexact() {
        let s = Settings::default();
        let r = div(&int(1), &int(3), &s).unwrap();
        assert!(matches!(r, Real::Fraction(_)));
    }

    #[test]
    fn zero_power_zero_follows_policy() {
        let mut s = Settings::default();
        assert_eq!(pow(&int(0), &int(0), &s).unwrap(), int(1));
        s.set_zero_power_zero(ZeroPowerZeroPolicy::IsUndefined);
        assert_eq!(pow(&int(0), &int(0), &s), Err(ErrorKind::ArgumentOutsideDomain));
    }

    #[test]
    fn negative_exponent_inverts() {
        let s = Settings::default();
        let r = pow(&int(2), &int(-3), &s).unwrap();
        match r {
            Real::Fraction(f) => {
                assert_eq!(f.numerator(), &num_bigint::BigInt::from(1));
                assert_eq!(f.denominator(), &num_bigint::BigInt::from(8));
            }
            other => panic!("expected 1/8, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let s = Settings::default();
        assert_eq!(div(&int(1), &int(0), &s), Err(ErrorKind::DivideByZero));
    }
}
