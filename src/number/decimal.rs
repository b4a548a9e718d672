//! Variable-precision decimal (§4.4, §9 open question 1).
//!
//! Only the variable-precision path is implemented; no fixed-width
//! decimal32/64/128 representation. A value is `sign * mantissa *
//! 10^exponent` where `mantissa` is an arbitrary-length unsigned decimal
//! digit sequence (`BigUint`, a vetted bignum crate rather than hand-rolled
//! long division/multiplication). Rounding to the current `Precision`
//! happens after every arithmetic op, never mid-computation.

use num_bigint::BigUint;
use num_integer::Integer as _;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Rounding applied when a mantissa exceeds the target digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round half away from zero, the common calculator default.
    HalfUp,
}

/// A variable-precision decimal: `(-1)^sign * mantissa * 10^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    negative: bool,
    mantissa: BigUint,
    exponent: i64,
}

fn digit_count(m: &BigUint) -> usize {
    if m.is_zero() {
        1
    } else {
        m.to_string().len()
    }
}

impl Decimal {
    /// `0`.
    pub fn zero() -> Self {
        Self { negative: false, mantissa: BigUint::zero(), exponent: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// The raw `(sign, mantissa, exponent)` triple, for codecs that need to
    /// serialize a decimal's exact bits rather than go through `f64`.
    pub fn parts(&self) -> (bool, &BigUint, i64) {
        (self.negative, &self.mantissa, self.exponent)
    }

    /// Builds directly from sign/mantissa/exponent, rounding to `precision`
    /// significant digits.
    pub fn from_parts(negative: bool, mantissa: BigUint, exponent: i64, precision: usize) -> Self {
        let (mantissa, exponent) = round(mantissa, exponent, precision, Rounding::HalfUp);
        Self { negative: negative && !mantissa.is_zero(), mantissa, exponent }
    }

    /// Exact conversion from a native integer (never loses precision,
    /// unlike [`Self::from_parts`] on huge integers it is still exact: the
    /// mantissa simply grows).
    pub fn from_i64(v: i64) -> Self {
        Self {
            negative: v < 0,
            mantissa: BigUint::from(v.unsigned_abs()),
            exponent: 0,
        }
    }

    pub fn negate(&self) -> Self {
        Self { negative: !self.negative && !self.is_zero(), ..self.clone() }
    }

    /// Approximate `f64` view, used only by the hardware-float fast path
    /// (§4.4.1) and by rendering helpers; never used as a source of truth
    /// for exactness decisions.
    pub fn to_f64_lossy(&self) -> f64 {
        let m = self.mantissa.to_string().parse::<f64>().unwrap_or(f64::NAN);
        let v = m * 10f64.powi(self.exponent.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
        if self.negative { -v } else { v }
    }

    /// Builds from an `f64`, used only by the hardware-float fast path to
    /// re-express a float result as decimal (§4.4.1).
    pub fn from_f64(v: f64, precision: usize) -> Self {
        if v == 0.0 {
            return Self::zero();
        }
        let negative = v.is_sign_negative();
        let s = format!("{:.*e}", precision.max(1) - 1, v.abs());
        let (mantissa_part, exp_part) = s.split_once('e').expect("formatted with exponent");
        let exp: i64 = exp_part.parse().unwrap_or(0);
        let digits: String = mantissa_part.chars().filter(|c| *c != '.').collect();
        let mantissa = digits.parse::<BigUint>().unwrap_or_default();
        let shift = digits.len() as i64 - 1;
        Self::from_parts(negative, mantissa, exp - shift, precision)
    }

    /// Number of significant digits currently stored.
    pub fn significant_digits(&self) -> usize {
        digit_count(&self.mantissa)
    }

    fn signed_mantissa(&self) -> num_bigint::BigInt {
        let m = num_bigint::BigInt::from(self.mantissa.clone());
        if self.negative { -m } else { m }
    }
}

/// Rounds `mantissa * 10^exponent` to at most `precision` significant
/// digits, returning the adjusted `(mantissa, exponent)`.
fn round(mantissa: BigUint, exponent: i64, precision: usize, mode: Rounding) -> (BigUint, i64) {
    let precision = precision.max(1);
    let digits = digit_count(&mantissa);
    if digits <= precision || mantissa.is_zero() {
        return (mantissa, exponent);
    }
    let drop = digits - precision;
    let ten = BigUint::from(10u32);
    let divisor = ten.pow(drop as u32);
    let (mut q, r) = mantissa.div_rem(&divisor);
    match mode {
        Rounding::HalfUp => {
            let half = &divisor / 2u32;
            if r > half || (r == half && &divisor % 2u32 == BigUint::zero()) {
                q += 1u32;
            }
        }
    }
    let mut exponent = exponent + drop as i64;
    // Rounding up (e.g. 999 -> 1000) can add a digit; re-check.
    if digit_count(&q) > precision {
        let (q2, r2) = q.div_rem(&BigUint::from(10u32));
        debug_assert!(r2.is_zero());
        return (q2, exponent + 1);
    }
    if q.is_zero() {
        exponent = 0;
    }
    (q, exponent)
}

fn align(a: &Decimal, b: &Decimal) -> (num_bigint::BigInt, num_bigint::BigInt, i64) {
    let exp = a.exponent.min(b.exponent);
    let ten = num_bigint::BigInt::from(10u32);
    let scale = |d: &Decimal| -> num_bigint::BigInt {
        let shift = (d.exponent - exp) as u32;
        d.signed_mantissa() * ten.pow(shift)
    };
    (scale(a), scale(b), exp)
}

fn from_signed(m: num_bigint::BigInt, exponent: i64, precision: usize) -> Decimal {
    let negative = m.is_negative();
    Decimal::from_parts(negative, m.abs().to_biguint().expect("abs is nonnegative"), exponent, precision)
}

pub fn add(a: &Decimal, b: &Decimal, precision: usize) -> Decimal {
    let (am, bm, exp) = align(a, b);
    from_signed(am + bm, exp, precision)
}

pub fn sub(a: &Decimal, b: &Decimal, precision: usize) -> Decimal {
    let (am, bm, exp) = align(a, b);
    from_signed(am - bm, exp, precision)
}

pub fn mul(a: &Decimal, b: &Decimal, precision: usize) -> Decimal {
    let m = &a.mantissa * &b.mantissa;
    let negative = a.negative ^ b.negative;
    Decimal::from_parts(negative, m, a.exponent + b.exponent, precision)
}

/// `None` on division by an exact zero.
pub fn div(a: &Decimal, b: &Decimal, precision: usize) -> Option<Decimal> {
    if b.is_zero() {
        return None;
    }
    // Scale the numerator up by `precision + guard` digits before integer
    // division so the quotient carries enough significant digits.
    let guard = precision as u32 + 2;
    let scaled = &a.mantissa * BigUint::from(10u32).pow(guard);
    let (q, _) = scaled.div_rem(&b.mantissa);
    let negative = a.negative ^ b.negative;
    let exponent = a.exponent - b.exponent - guard as i64;
    Some(Decimal::from_parts(negative, q, exponent, precision))
}

pub fn compare(a: &Decimal, b: &Decimal) -> std::cmp::Ordering {
    let (am, bm, _) = align(a, b);
    am.cmp(&bm)
}

/// Renders using the `Std` display style: plain digits with a decimal
/// point, no grouping (C9/C10 own the user-facing formatting settings;
/// this is the minimal lossless form used by `Display`).
impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        let digits = self.mantissa.to_string();
        let point = digits.len() as i64 + self.exponent;
        if self.exponent >= 0 {
            write!(f, "{digits}")?;
            for _ in 0..self.exponent {
                write!(f, "0")?;
            }
        } else if point <= 0 {
            write!(f, "0.")?;
            for _ in 0..(-point) {
                write!(f, "0")?;
            }
            write!(f, "{digits}")?;
        } else {
            let (int_part, frac_part) = digits.split_at(point as usize);
            write!(f, "{int_part}.{frac_part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_third_to_34_digits_matches_spec_scenario() {
        let one = Decimal::from_i64(1);
        let three = Decimal::from_i64(3);
        let q = div(&one, &three, 34).unwrap();
        let s = q.to_string();
        assert!(s.starts_with("0.333333333333333333333333333333333"), "{s}");
        assert_eq!(q.significant_digits(), 34);
    }

    #[test]
    fn addition_rounds_to_precision() {
        let a = Decimal::from_i64(1);
        let b = div(&Decimal::from_i64(1), &Decimal::from_i64(3), 10).unwrap();
        let sum = add(&a, &b, 10);
        assert_eq!(sum.significant_digits(), 10);
    }

    #[test]
    fn multiplication_is_commutative() {
        let a = Decimal::from_i64(7);
        let b = div(&Decimal::from_i64(22), &Decimal::from_i64(7), 12).unwrap();
        assert_eq!(mul(&a, &b, 12), mul(&b, &a, 12));
    }

    #[test]
    fn rounding_up_through_nines_carries() {
        // 9.99...9 (5 nines) rounded to 4 digits carries into a new leading digit.
        let m = BigUint::parse_bytes(b"99999", 10).unwrap();
        let (q, exp) = round(m, 0, 4, Rounding::HalfUp);
        assert_eq!(q, BigUint::from(1000u32));
        assert_eq!(exp, 1);
    }

    #[test]
    fn display_handles_small_and_large_magnitudes() {
        assert_eq!(Decimal::from_i64(0).to_string(), "0");
        assert_eq!(Decimal::from_i64(-5).to_string(), "-5");
        let tenth = div(&Decimal::from_i64(1), &Decimal::from_i64(10), 5).unwrap();
        assert_eq!(tenth.to_string(), "0.1");
    }
}
