//! Trigonometric special cases (§4.4.3): exact rational results for
//! multiples of 30°/45° under Degrees, Grads or PiRadians.
//!
//! Two lookup grids cover the two families: an eighths-of-a-turn grid (45°
//! steps) and a twelfths-of-a-turn grid (30° steps). Neither grid is a
//! subdivision of the other (`gcd(45, 30) = 15`), so both are checked
//! independently rather than folded into one table.

use super::fraction::Fraction;
use super::integer::Integer;
use super::{decimal::Decimal, Real};
use crate::settings::{AngleMode, Settings};
use num_bigint::BigInt;

/// Which trig function to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
}

/// Normalizes `angle` (in the current `AngleMode`) to a reduced multiple of
/// the quarter-turn, returning `Some(n)` for `angle == n * 45°` when that
/// holds exactly, else `None` (signaling "promote to decimal").
fn exact_eighth_turns(angle: &Real, mode: AngleMode) -> Option<i64> {
    let degrees_per_unit = match mode {
        AngleMode::Degrees => 1.0,
        AngleMode::Grads => 0.9,
        AngleMode::PiRadians => 180.0,
        AngleMode::Radians => return None, // never exact in radians per §4.4.3
    };
    let as_f64 = match angle {
        Real::Integer(Integer::Small(v)) => *v as f64,
        Real::Integer(Integer::Big(v)) => v.to_string().parse().ok()?,
        Real::Fraction(f) => {
            let n: f64 = f.numerator().to_string().parse().ok()?;
            let d: f64 = f.denominator().to_string().parse().ok()?;
            n / d
        }
        Real::Decimal(_) => return None,
    };
    let degrees = as_f64 * degrees_per_unit;
    let eighths = degrees / 45.0;
    let rounded = eighths.round();
    if (eighths - rounded).abs() < 1e-9 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn exact_value_at_eighth(n: i64, f: Function) -> Option<Real> {
    // Reduce to 0..8 eighths of a turn (45° steps).
    let k = n.rem_euclid(8);
    let sqrt2_half = || Real::Fraction(Fraction::new(BigInt::from(1), BigInt::from(2)).unwrap());
    let table_sin = |k: i64| -> Option<(Real, bool)> {
        // Returns (magnitude, is_irrational_sqrt2_half)
        match k {
            0 => Some((Real::Integer(Integer::small(0)), false)),
            1 => Some((sqrt2_half(), true)),
            2 => Some((Real::Integer(Integer::small(1)), false)),
            3 => Some((sqrt2_half(), true)),
            4 => Some((Real::Integer(Integer::small(0)), false)),
            5 => Some((sqrt2_half(), true)),
            6 => Some((Real::Integer(Integer::small(-1)), false)),
            7 => Some((sqrt2_half(), true)),
            _ => None,
        }
    };
    match f {
        Function::Sin => {
            let (mag, irrational) = table_sin(k)?;
            if irrational {
                return None; // sqrt(2)/2 is not rational; caller promotes to decimal.
            }
            Some(mag)
        }
        Function::Cos => exact_value_at_eighth((k + 2).rem_euclid(8), Function::Sin),
        Function::Tan => {
            // tan is exact at multiples of 45 deg away from the undefined points.
            match k {
                0 => Some(Real::Integer(Integer::small(0))),
                2 => None, // undefined (90deg)
                4 => Some(Real::Integer(Integer::small(0))),
                6 => None, // undefined (270deg)
                1 | 5 => Some(Real::Integer(Integer::small(1))),
                3 | 7 => Some(Real::Integer(Integer::small(-1))),
                _ => None,
            }
        }
    }
}

/// Like [`exact_eighth_turns`] but for 30° steps (twelfths of a turn).
fn exact_twelfth_turns(angle: &Real, mode: AngleMode) -> Option<i64> {
    let degrees_per_unit = match mode {
        AngleMode::Degrees => 1.0,
        AngleMode::Grads => 0.9,
        AngleMode::PiRadians => 180.0,
        AngleMode::Radians => return None,
    };
    let as_f64 = match angle {
        Real::Integer(Integer::Small(v)) => *v as f64,
        Real::Integer(Integer::Big(v)) => v.to_string().parse().ok()?,
        Real::Fraction(f) => {
            let n: f64 = f.numerator().to_string().parse().ok()?;
            let d: f64 = f.denominator().to_string().parse().ok()?;
            n / d
        }
        Real::Decimal(_) => return None,
    };
    let degrees = as_f64 * degrees_per_unit;
    let twelfths = degrees / 30.0;
    let rounded = twelfths.round();
    if (twelfths - rounded).abs() < 1e-9 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn exact_value_at_twelfth(n: i64, f: Function) -> Option<Real> {
    // Reduce to 0..12 twelfths of a turn (30° steps).
    let k = n.rem_euclid(12);
    let half = || Real::Fraction(Fraction::new(BigInt::from(1), BigInt::from(2)).unwrap());
    let neg_half = || Real::Fraction(Fraction::new(BigInt::from(-1), BigInt::from(2)).unwrap());
    let table_sin = |k: i64| -> Option<(Real, bool)> {
        // Returns (magnitude, is_irrational_sqrt3_half)
        match k {
            0 => Some((Real::Integer(Integer::small(0)), false)),
            1 => Some((half(), false)),
            2 => Some((half(), true)), // sqrt(3)/2
            3 => Some((Real::Integer(Integer::small(1)), false)),
            4 => Some((half(), true)), // sqrt(3)/2
            5 => Some((half(), false)),
            6 => Some((Real::Integer(Integer::small(0)), false)),
            7 => Some((neg_half(), false)),
            8 => Some((neg_half(), true)), // -sqrt(3)/2
            9 => Some((Real::Integer(Integer::small(-1)), false)),
            10 => Some((neg_half(), true)), // -sqrt(3)/2
            11 => Some((neg_half(), false)),
            _ => None,
        }
    };
    match f {
        Function::Sin => {
            let (mag, irrational) = table_sin(k)?;
            if irrational {
                return None; // sqrt(3)/2 is not rational; caller promotes to decimal.
            }
            Some(mag)
        }
        Function::Cos => exact_value_at_twelfth((k + 3).rem_euclid(12), Function::Sin),
        Function::Tan => match k {
            0 => Some(Real::Integer(Integer::small(0))),
            3 => None,  // undefined (90deg)
            6 => Some(Real::Integer(Integer::small(0))),
            9 => None,  // undefined (270deg)
            _ => None,  // irrational (sqrt(3) or 1/sqrt(3)) at 30/60/120/150/...
        },
    }
}

/// Evaluates a trig function, returning an exact rational result when the
/// angle is a multiple of 30°/45° under Degrees/Grads/PiRadians and the
/// argument is exact (integer or fraction); otherwise promotes to decimal.
pub fn evaluate(f: Function, angle: &Real, settings: &Settings) -> Real {
    if let Some(n) = exact_eighth_turns(angle, settings.angle_mode()) {
        if let Some(exact) = exact_value_at_eighth(n, f) {
            return exact;
        }
    }
    if let Some(n) = exact_twelfth_turns(angle, settings.angle_mode()) {
        if let Some(exact) = exact_value_at_twelfth(n, f) {
            return exact;
        }
    }
    let radians = to_radians(angle, settings);
    let v = match f {
        Function::Sin => radians.sin(),
        Function::Cos => radians.cos(),
        Function::Tan => radians.tan(),
    };
    Real::Decimal(Decimal::from_f64(v, settings.precision()))
}

fn to_radians(angle: &Real, settings: &Settings) -> f64 {
    let v = angle.to_decimal(settings.precision()).to_f64_lossy();
    match settings.angle_mode() {
        AngleMode::Radians => v,
        AngleMode::Degrees => v.to_radians(),
        AngleMode::Grads => v * std::f64::consts::PI / 200.0,
        AngleMode::PiRadians => v * std::f64::consts::PI,
    }
}

/// The inverse of [`to_radians`]: converts a value in radians into the
/// current `AngleMode`, used by the inverse trig commands (§4.4.3).
pub fn from_radians(radians: f64, mode: AngleMode) -> f64 {
    match mode {
        AngleMode::Radians => radians,
        AngleMode::Degrees => radians.to_degrees(),
        AngleMode::Grads => radians * 200.0 / std::f64::consts::PI,
        AngleMode::PiRadians => radians / std::f64::consts::PI,
    }
}

/// The tag name an inverse trig result carries when `SetAngleUnits` is on.
pub fn angle_unit_name(mode: AngleMode) -> &'static str {
    match mode {
        AngleMode::Radians => "r",
        AngleMode::Degrees => "deg",
        AngleMode::Grads => "grad",
        AngleMode::PiRadians => "pir",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;

    #[test]
    fn sin_30_degrees_is_one_half() {
        let s = Settings::default(); // Degrees by default
        let r = evaluate(Function::Sin, &Real::Integer(Integer::small(30)), &s);
        match r {
            Real::Fraction(f) => {
                assert_eq!(f.numerator(), &BigInt::from(1));
                assert_eq!(f.denominator(), &BigInt::from(2));
            }
            other => panic!("expected 1/2, got {other:?}"),
        }
    }

    #[test]
    fn sin_zero_radians_is_zero() {
        let mut s = Settings::default();
        s.set_angle_mode(AngleMode::Radians);
        let r = evaluate(Function::Sin, &Real::Integer(Integer::small(0)), &s);
        assert_eq!(r, Real::Integer(Integer::small(0)));
    }

    #[test]
    fn tan_45_degrees_is_one() {
        let s = Settings::default();
        let r = evaluate(Function::Tan, &Real::Integer(Integer::small(45)), &s);
        assert_eq!(r, Real::Integer(Integer::small(1)));
    }

    #[test]
    fn cos_60_degrees_is_one_half() {
        let s = Settings::default();
        let r = evaluate(Function::Cos, &Real::Integer(Integer::small(60)), &s);
        match r {
            Real::Fraction(f) => {
                assert_eq!(f.numerator(), &BigInt::from(1));
                assert_eq!(f.denominator(), &BigInt::from(2));
            }
            other => panic!("expected 1/2, got {other:?}"),
        }
    }

    #[test]
    fn sin_150_degrees_is_one_half() {
        let s = Settings::default();
        let r = evaluate(Function::Sin, &Real::Integer(Integer::small(150)), &s);
        match r {
            Real::Fraction(f) => {
                assert_eq!(f.numerator(), &BigInt::from(1));
                assert_eq!(f.denominator(), &BigInt::from(2));
            }
            other => panic!("expected 1/2, got {other:?}"),
        }
    }
}
