//! Small integers and bignums (§4.4, §9 redesign flag 4).
//!
//! A value is either a native `i64` (the "small integer" kind, holding up
//! to 63 bits of magnitude) or a [`num_bigint::BigInt`]. All
//! overflow/promotion decisions for integer arithmetic are centralized in
//! [`add`], [`sub`], [`mul`] and [`div_exact`] below: one explicit
//! "overflow implies promote" rule rather than several call sites each
//! deciding independently.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// The largest magnitude a small integer may hold (63 bits, per §3.2).
pub const SMALL_INT_MAX: i64 = (1i64 << 62) | ((1i64 << 62) - 1); // 2^63 - 1 == i64::MAX

/// An exact integer, either native or arbitrary-precision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Integer {
    /// Fits in 63 bits of magnitude; stored natively for speed.
    Small(i64),
    /// Overflowed the small representation.
    Big(BigInt),
}

impl Integer {
    /// Builds from a native `i64` (always representable as `Small`).
    pub const fn small(v: i64) -> Self {
        Self::Small(v)
    }

    /// Demotes a [`BigInt`] to [`Integer::Small`] when it fits.
    pub fn from_bigint(v: BigInt) -> Self {
        match v.to_i64() {
            Some(v) if v.unsigned_abs() as i128 <= SMALL_INT_MAX as i128 => Self::Small(v),
            _ => Self::Big(v),
        }
    }

    /// Widens to [`BigInt`] for uniform arithmetic.
    pub fn to_bigint(&self) -> BigInt {
        match self {
            Self::Small(v) => BigInt::from(*v),
            Self::Big(v) => v.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Small(v) => *v == 0,
            Self::Big(v) => v.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Small(v) => *v < 0,
            Self::Big(v) => v.sign() == num_bigint::Sign::Minus,
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            Self::Small(v) => v
                .checked_neg()
                .map(Self::Small)
                .unwrap_or_else(|| Self::from_bigint(-BigInt::from(*v))),
            Self::Big(v) => Self::from_bigint(-v.clone()),
        }
    }
}

/// `a + b`, promoting to [`Integer::Big`] on native overflow (§4.4.2.1).
pub fn add(a: &Integer, b: &Integer) -> Integer {
    if let (Integer::Small(x), Integer::Small(y)) = (a, b) {
        if let Some(r) = x.checked_add(*y) {
            return Integer::Small(r);
        }
    }
    Integer::from_bigint(a.to_bigint() + b.to_bigint())
}

/// `a - b`, promoting on overflow.
pub fn sub(a: &Integer, b: &Integer) -> Integer {
    if let (Integer::Small(x), Integer::Small(y)) = (a, b) {
        if let Some(r) = x.checked_sub(*y) {
            return Integer::Small(r);
        }
    }
    Integer::from_bigint(a.to_bigint() - b.to_bigint())
}

/// `a * b`, promoting on overflow.
pub fn mul(a: &Integer, b: &Integer) -> Integer {
    if let (Integer::Small(x), Integer::Small(y)) = (a, b) {
        if let Some(r) = x.checked_mul(*y) {
            return Integer::Small(r);
        }
    }
    Integer::from_bigint(a.to_bigint() * b.to_bigint())
}

/// Exact division: `Some(quotient)` iff `b` divides `a` evenly. Callers that
/// want the fraction-producing `/` of §4.4.1 should use
/// [`crate::number::fraction::divide_integers`] instead.
pub fn div_exact(a: &Integer, b: &Integer) -> Option<Integer> {
    if b.is_zero() {
        return None;
    }
    let (ab, bb) = (a.to_bigint(), b.to_bigint());
    let (q, r) = num_integer::Integer::div_rem(&ab, &bb);
    if r.is_zero() {
        Some(Integer::from_bigint(q))
    } else {
        None
    }
}

/// `MOD`: result takes the sign of the divisor (§4.4.2, "Modulo sign").
pub fn modulo(a: &Integer, b: &Integer) -> Option<Integer> {
    if b.is_zero() {
        return None;
    }
    let (ab, bb) = (a.to_bigint(), b.to_bigint());
    let m = ((ab % &bb) + &bb) % &bb;
    Some(Integer::from_bigint(m))
}

/// `REM`: result takes the sign of the dividend.
pub fn remainder(a: &Integer, b: &Integer) -> Option<Integer> {
    if b.is_zero() {
        return None;
    }
    Some(Integer::from_bigint(a.to_bigint() % b.to_bigint()))
}

/// Greatest common divisor, always nonnegative.
pub fn gcd(a: &Integer, b: &Integer) -> Integer {
    Integer::from_bigint(num_integer::Integer::gcd(&a.to_bigint(), &b.to_bigint()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_addition_stays_small() {
        assert_eq!(add(&Integer::small(2), &Integer::small(3)), Integer::Small(5));
    }

    #[test]
    fn overflow_promotes_to_bignum() {
        let max = Integer::Small(i64::MAX);
        let r = add(&max, &Integer::small(1));
        assert!(matches!(r, Integer::Big(_)));
        assert_eq!(r.to_bigint(), BigInt::from(i64::MAX) + 1);
    }

    #[test]
    fn bignum_multiply_matches_spec_scenario() {
        // §8.3 scenario 1
        let a = Integer::Big(BigInt::parse_bytes(b"999999999999999999", 10).unwrap());
        let b = a.clone();
        let r = mul(&a, &b);
        let expected = BigInt::parse_bytes(b"999999999999999998000000000000000001", 10).unwrap();
        assert_eq!(r.to_bigint(), expected);
    }

    #[test]
    fn mod_takes_divisor_sign_rem_takes_dividend_sign() {
        let a = Integer::small(-7);
        let b = Integer::small(3);
        assert_eq!(modulo(&a, &b).unwrap(), Integer::Small(2));
        assert_eq!(remainder(&a, &b).unwrap(), Integer::Small(-1));
    }

    #[test]
    fn division_by_zero_is_none() {
        assert!(div_exact(&Integer::small(4), &Integer::small(0)).is_none());
        assert!(modulo(&Integer::small(4), &Integer::small(0)).is_none());
    }
}
