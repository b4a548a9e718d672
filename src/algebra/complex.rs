//! Complex numbers: rectangular and polar storage shapes (§4.5).
//!
//! Automatic simplification removes a zero imaginary part or a zero polar
//! argument (`0 + 0i -> 0`, `r∡0 -> r`); multiplication/division in polar
//! form never loses precision of the modulus, since it avoids a
//! rectangular round-trip.

use crate::number::{promote, Real};
use crate::settings::Settings;
use crate::symbolic::symbol::Symbol;

/// Any real kind or a symbol may occupy a complex component (§3.2).
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Real(Real),
    Symbol(Symbol),
}

impl Component {
    fn as_real(&self) -> Option<&Real> {
        match self {
            Component::Real(r) => Some(r),
            Component::Symbol(_) => None,
        }
    }

    fn is_zero(&self) -> bool {
        matches!(self, Component::Real(r) if r.is_zero())
    }
}

/// `real + imag*i` or `modulus ∡ argument` (§3.2, §4.5).
#[derive(Debug, Clone, PartialEq)]
pub enum Complex {
    Rectangular { real: Component, imag: Component },
    Polar { modulus: Component, argument: Component, angle_unit: crate::settings::AngleMode },
}

/// Result of evaluating an arithmetic op on a complex value: either it
/// stays complex, or it simplifies to a plain real (§4.5, §8.2).
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexOrReal {
    Complex(Complex),
    Real(Real),
}

fn simplify_rect(real: Component, imag: Component) -> ComplexOrReal {
    if imag.is_zero() {
        match real {
            Component::Real(r) => ComplexOrReal::Real(r),
            sym => ComplexOrReal::Complex(Complex::Rectangular { real: sym, imag }),
        }
    } else {
        ComplexOrReal::Complex(Complex::Rectangular { real, imag })
    }
}

fn simplify_polar(modulus: Component, argument: Component, unit: crate::settings::AngleMode) -> ComplexOrReal {
    if argument.is_zero() {
        match modulus {
            Component::Real(r) => ComplexOrReal::Real(r),
            sym => ComplexOrReal::Complex(Complex::Polar { modulus: sym, argument, angle_unit: unit }),
        }
    } else {
        ComplexOrReal::Complex(Complex::Polar { modulus, argument, angle_unit: unit })
    }
}

fn to_rect(c: &Complex, settings: &Settings) -> (Real, Real) {
    match c {
        Complex::Rectangular { real, imag } => (
            real.as_real().cloned().unwrap_or_else(Real::default_zero),
            imag.as_real().cloned().unwrap_or_else(Real::default_zero),
        ),
        Complex::Polar { modulus, argument, angle_unit } => {
            let m = modulus.as_real().cloned().unwrap_or_else(Real::default_zero).to_decimal(settings.precision());
            let theta_native = argument.as_real().cloned().unwrap_or_else(Real::default_zero);
            let theta_radians = match angle_unit {
                crate::settings::AngleMode::Radians => theta_native.to_decimal(settings.precision()).to_f64_lossy(),
                crate::settings::AngleMode::Degrees => theta_native.to_decimal(settings.precision()).to_f64_lossy().to_radians(),
                crate::settings::AngleMode::Grads => {
                    theta_native.to_decimal(settings.precision()).to_f64_lossy() * std::f64::consts::PI / 200.0
                }
                crate::settings::AngleMode::PiRadians => {
                    theta_native.to_decimal(settings.precision()).to_f64_lossy() * std::f64::consts::PI
                }
            };
            let m = m.to_f64_lossy();
            let re = m * theta_radians.cos();
            let im = m * theta_radians.sin();
            (
                Real::Decimal(crate::number::decimal::Decimal::from_f64(re, settings.precision())),
                Real::Decimal(crate::number::decimal::Decimal::from_f64(im, settings.precision())),
            )
        }
    }
}

/// Componentwise addition (§4.5); addition/subtraction of polar values
/// converts to rectangular first, since neither operation has a clean
/// closed form directly in polar coordinates.
pub fn add(a: &Complex, b: &Complex, settings: &Settings) -> ComplexOrReal {
    let (ar, ai) = to_rect(a, settings);
    let (br, bi) = to_rect(b, settings);
    simplify_rect(
        Component::Real(promote::add(&ar, &br, settings)),
        Component::Real(promote::add(&ai, &bi, settings)),
    )
}

pub fn sub(a: &Complex, b: &Complex, settings: &Settings) -> ComplexOrReal {
    let (ar, ai) = to_rect(a, settings);
    let (br, bi) = to_rect(b, settings);
    simplify_rect(
        Component::Real(promote::sub(&ar, &br, settings)),
        Component::Real(promote::sub(&ai, &bi, settings)),
    )
}

/// `(a+bi)(c+di) = (ac-bd) + (ad+bc)i` when both operands are rectangular;
/// polar operands multiply moduli and add arguments directly (§4.5).
pub fn mul(a: &Complex, b: &Complex, settings: &Settings) -> ComplexOrReal {
    if let (Complex::Polar { modulus: am, argument: aa, angle_unit }, Complex::Polar { modulus: bm, argument: ba, .. }) =
        (a, b)
    {
        let am_r = am.as_real().cloned().unwrap_or_else(Real::default_zero);
        let bm_r = bm.as_real().cloned().unwrap_or_else(Real::default_zero);
        let aa_r = aa.as_real().cloned().unwrap_or_else(Real::default_zero);
        let ba_r = ba.as_real().cloned().unwrap_or_else(Real::default_zero);
        let m = promote::mul(&am_r, &bm_r, settings);
        let arg = promote::add(&aa_r, &ba_r, settings);
        return simplify_polar(Component::Real(m), Component::Real(arg), *angle_unit);
    }
    let (ar, ai) = to_rect(a, settings);
    let (br, bi) = to_rect(b, settings);
    let re = promote::sub(&promote::mul(&ar, &br, settings), &promote::mul(&ai, &bi, settings), settings);
    let im = promote::add(&promote::mul(&ar, &bi, settings), &promote::mul(&ai, &br, settings), settings);
    simplify_rect(Component::Real(re), Component::Real(im))
}

/// Division: polar divides moduli/subtracts arguments; rectangular uses the
/// standard conjugate formula.
pub fn div(a: &Complex, b: &Complex, settings: &Settings) -> Result<ComplexOrReal, crate::error::ErrorKind> {
    if let (Complex::Polar { modulus: am, argument: aa, angle_unit }, Complex::Polar { modulus: bm, argument: ba, .. }) =
        (a, b)
    {
        let bm_r = bm.as_real().cloned().unwrap_or_else(Real::default_zero);
        let am_r = am.as_real().cloned().unwrap_or_else(Real::default_zero);
        let m = promote::div(&am_r, &bm_r, settings)?;
        let arg = promote::sub(
            &aa.as_real().cloned().unwrap_or_else(Real::default_zero),
            &ba.as_real().cloned().unwrap_or_else(Real::default_zero),
            settings,
        );
        return Ok(simplify_polar(Component::Real(m), Component::Real(arg), *angle_unit));
    }
    let (ar, ai) = to_rect(a, settings);
    let (br, bi) = to_rect(b, settings);
    let denom = promote::add(&promote::mul(&br, &br, settings), &promote::mul(&bi, &bi, settings), settings);
    if denom.is_zero() {
        return Err(crate::error::ErrorKind::DivideByZero);
    }
    let re_num = promote::add(&promote::mul(&ar, &br, settings), &promote::mul(&ai, &bi, settings), settings);
    let im_num = promote::sub(&promote::mul(&ai, &br, settings), &promote::mul(&ar, &bi, settings), settings);
    Ok(simplify_rect(
        Component::Real(promote::div(&re_num, &denom, settings)?),
        Component::Real(promote::div(&im_num, &denom, settings)?),
    ))
}

impl Real {
    fn default_zero() -> Real {
        Real::Integer(crate::number::integer::Integer::small(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;

    fn r(v: i64) -> Component {
        Component::Real(Real::Integer(Integer::small(v)))
    }

    #[test]
    fn multiply_matches_spec_scenario() {
        // §8.3 scenario 4: (1+2i)(3+4i) = -5+10i
        let s = Settings::default();
        let a = Complex::Rectangular { real: r(1), imag: r(2) };
        let b = Complex::Rectangular { real: r(3), imag: r(4) };
        let result = mul(&a, &b, &s);
        match result {
            ComplexOrReal::Complex(Complex::Rectangular { real, imag }) => {
                assert_eq!(real, r(-5));
                assert_eq!(imag, r(10));
            }
            other => panic!("expected rectangular complex, got {other:?}"),
        }
    }

    #[test]
    fn zero_imaginary_simplifies_to_real() {
        let s = Settings::default();
        let a = Complex::Rectangular { real: r(0), imag: r(0) };
        let b = Complex::Rectangular { real: r(5), imag: r(0) };
        match add(&a, &b, &s) {
            ComplexOrReal::Real(v) => assert_eq!(v, Real::Integer(Integer::small(5))),
            other => panic!("expected a plain real, got {other:?}"),
        }
    }

    #[test]
    fn i_squared_is_minus_one() {
        let s = Settings::default();
        let i = Complex::Rectangular { real: r(0), imag: r(1) };
        match mul(&i, &i, &s) {
            ComplexOrReal::Real(v) => assert_eq!(v, Real::Integer(Integer::small(-1))),
            other => panic!("expected -1, got {other:?}"),
        }
    }
}
