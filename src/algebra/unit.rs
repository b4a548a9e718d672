//! Units: a value paired with a symbolic unit expression (§4.5).
//!
//! The unit-conversion table is plain data — `&[(name, Dimension,
//! ratio_to_si)]` — rather than generated code or per-unit `impl` blocks
//! (see DESIGN.md).

use crate::error::ErrorKind;
use crate::number::{promote, Real};
use crate::settings::Settings;

/// SI base-dimension exponents: length, mass, time, current, temperature,
/// amount, luminous intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension([i8; 7]);

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension([0; 7]);

    const fn single(axis: usize, exp: i8) -> Self {
        let mut d = [0i8; 7];
        d[axis] = exp;
        Dimension(d)
    }

    fn combine(self, other: Self, sign: i8) -> Self {
        let mut out = [0i8; 7];
        for i in 0..7 {
            out[i] = self.0[i] + sign * other.0[i];
        }
        Dimension(out)
    }
}

/// One entry in the conversion table.
struct UnitDef {
    name: &'static str,
    dimension: Dimension,
    ratio_to_si: f64,
}

/// A (deliberately small) built-in conversion table; extending it with
/// host-defined units is out of scope here (§4.5).
const TABLE: &[UnitDef] = &[
    UnitDef { name: "m", dimension: Dimension::single(0, 1), ratio_to_si: 1.0 },
    UnitDef { name: "cm", dimension: Dimension::single(0, 1), ratio_to_si: 0.01 },
    UnitDef { name: "km", dimension: Dimension::single(0, 1), ratio_to_si: 1000.0 },
    UnitDef { name: "in", dimension: Dimension::single(0, 1), ratio_to_si: 0.0254 },
    UnitDef { name: "ft", dimension: Dimension::single(0, 1), ratio_to_si: 0.3048 },
    UnitDef { name: "kg", dimension: Dimension::single(1, 1), ratio_to_si: 1.0 },
    UnitDef { name: "g", dimension: Dimension::single(1, 1), ratio_to_si: 0.001 },
    UnitDef { name: "lb", dimension: Dimension::single(1, 1), ratio_to_si: 0.453_592 },
    UnitDef { name: "s", dimension: Dimension::single(2, 1), ratio_to_si: 1.0 },
    UnitDef { name: "min", dimension: Dimension::single(2, 1), ratio_to_si: 60.0 },
    UnitDef { name: "hr", dimension: Dimension::single(2, 1), ratio_to_si: 3600.0 },
    UnitDef { name: "A", dimension: Dimension::single(3, 1), ratio_to_si: 1.0 },
    UnitDef { name: "K", dimension: Dimension::single(4, 1), ratio_to_si: 1.0 },
    UnitDef { name: "mol", dimension: Dimension::single(5, 1), ratio_to_si: 1.0 },
    UnitDef { name: "cd", dimension: Dimension::single(6, 1), ratio_to_si: 1.0 },
];

fn lookup(name: &str) -> Option<&'static UnitDef> {
    TABLE.iter().find(|u| u.name == name)
}

/// A symbolic unit expression: a product of atomic named units, each at
/// some integer power (e.g. `m/s^2` is `[("m", 1), ("s", -2)]`).
#[derive(Debug, Clone, PartialEq)]
pub struct UnitExpr {
    terms: Vec<(String, i32)>,
}

impl UnitExpr {
    pub fn atom(name: impl Into<String>) -> Self {
        Self { terms: vec![(name.into(), 1)] }
    }

    /// Rebuilds a unit expression from its raw term list, the inverse of
    /// [`Self::terms`]; used by the object codec to round-trip a unit
    /// value through its heap encoding.
    pub fn from_terms(terms: Vec<(String, i32)>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[(String, i32)] {
        &self.terms
    }

    pub fn dimension(&self) -> Result<Dimension, ErrorKind> {
        let mut dim = Dimension::DIMENSIONLESS;
        for (name, exp) in &self.terms {
            let def = lookup(name).ok_or(ErrorKind::InconsistentUnits)?;
            let scaled = Dimension(def.dimension.0.map(|e| e * (*exp as i8)));
            dim = dim.combine(scaled, 1);
        }
        Ok(dim)
    }

    fn ratio_to_si(&self) -> Result<f64, ErrorKind> {
        let mut ratio = 1.0;
        for (name, exp) in &self.terms {
            let def = lookup(name).ok_or(ErrorKind::InconsistentUnits)?;
            ratio *= def.ratio_to_si.powi(*exp);
        }
        Ok(ratio)
    }

    /// Composes `self * other^sign` (sign = 1 for multiply, -1 for divide).
    fn compose(&self, other: &Self, sign: i32) -> Self {
        let mut terms = self.terms.clone();
        for (name, exp) in &other.terms {
            if let Some(existing) = terms.iter_mut().find(|(n, _)| n == name) {
                existing.1 += sign * exp;
            } else {
                terms.push((name.clone(), sign * exp));
            }
        }
        terms.retain(|(_, exp)| *exp != 0);
        Self { terms }
    }
}

impl std::fmt::Display for UnitExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self
            .terms
            .iter()
            .map(|(n, e)| if *e == 1 { n.clone() } else { format!("{n}^{e}") })
            .collect();
        write!(f, "{}", rendered.join("*"))
    }
}

/// A unit value: `(magnitude, unit_expr)` (§3.2, §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub magnitude: Real,
    pub expr: UnitExpr,
}

fn require_same_dimension(a: &UnitExpr, b: &UnitExpr) -> Result<(), ErrorKind> {
    if a.dimension()? == b.dimension()? {
        Ok(())
    } else {
        Err(ErrorKind::InconsistentUnits)
    }
}

/// Addition/subtraction requires a common dimension; the result is
/// expressed in `a`'s unit (§4.5).
pub fn add(a: &Unit, b: &Unit, settings: &Settings) -> Result<Unit, ErrorKind> {
    require_same_dimension(&a.expr, &b.expr)?;
    let ratio = b.expr.ratio_to_si()? / a.expr.ratio_to_si()?;
    let converted = scale(&b.magnitude, ratio, settings);
    Ok(Unit { magnitude: promote::add(&a.magnitude, &converted, settings), expr: a.expr.clone() })
}

pub fn sub(a: &Unit, b: &Unit, settings: &Settings) -> Result<Unit, ErrorKind> {
    require_same_dimension(&a.expr, &b.expr)?;
    let ratio = b.expr.ratio_to_si()? / a.expr.ratio_to_si()?;
    let converted = scale(&b.magnitude, ratio, settings);
    Ok(Unit { magnitude: promote::sub(&a.magnitude, &converted, settings), expr: a.expr.clone() })
}

/// Multiplication/division composes the symbolic unit expression (§4.5).
pub fn mul(a: &Unit, b: &Unit, settings: &Settings) -> Unit {
    Unit {
        magnitude: promote::mul(&a.magnitude, &b.magnitude, settings),
        expr: a.expr.compose(&b.expr, 1),
    }
}

pub fn div(a: &Unit, b: &Unit, settings: &Settings) -> Result<Unit, ErrorKind> {
    Ok(Unit {
        magnitude: promote::div(&a.magnitude, &b.magnitude, settings)?,
        expr: a.expr.compose(&b.expr, -1),
    })
}

/// `→` : reinterprets the magnitude in `target`, refusing on dimension
/// mismatch (§4.5).
pub fn convert(value: &Unit, target: &UnitExpr, settings: &Settings) -> Result<Unit, ErrorKind> {
    require_same_dimension(&value.expr, target)?;
    let ratio = value.expr.ratio_to_si()? / target.ratio_to_si()?;
    Ok(Unit { magnitude: scale(&value.magnitude, ratio, settings), expr: target.clone() })
}

fn scale(v: &Real, ratio: f64, settings: &Settings) -> Real {
    if (ratio - 1.0).abs() < f64::EPSILON {
        return v.clone();
    }
    let factor = crate::number::decimal::Decimal::from_f64(ratio, settings.precision());
    promote::mul(v, &Real::Decimal(factor), settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;

    #[test]
    fn mixed_length_units_add_via_conversion() {
        let s = Settings::default();
        let a = Unit { magnitude: Real::Integer(Integer::small(1)), expr: UnitExpr::atom("m") };
        let b = Unit { magnitude: Real::Integer(Integer::small(100)), expr: UnitExpr::atom("cm") };
        let sum = add(&a, &b, &s).unwrap();
        assert_eq!(sum.magnitude.to_decimal(10).to_f64_lossy(), 2.0);
    }

    #[test]
    fn incompatible_dimensions_are_rejected() {
        let s = Settings::default();
        let length = Unit { magnitude: Real::Integer(Integer::small(1)), expr: UnitExpr::atom("m") };
        let mass = Unit { magnitude: Real::Integer(Integer::small(1)), expr: UnitExpr::atom("kg") };
        assert_eq!(add(&length, &mass, &s), Err(ErrorKind::InconsistentUnits));
    }

    #[test]
    fn division_composes_unit_expression() {
        let s = Settings::default();
        let distance = Unit { magnitude: Real::Integer(Integer::small(10)), expr: UnitExpr::atom("m") };
        let time = Unit { magnitude: Real::Integer(Integer::small(2)), expr: UnitExpr::atom("s") };
        let speed = div(&distance, &time, &s).unwrap();
        assert_eq!(speed.expr.to_string(), "m*s^-1");
    }
}
