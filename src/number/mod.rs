//! The number tower (C4): kinds, promotion lattice and exact operation
//! contracts (§4.4).

pub mod based;
pub mod decimal;
pub mod fraction;
pub mod integer;
pub mod promote;
pub mod trig;

use decimal::Decimal;
use fraction::Fraction;
use integer::Integer;

/// A real value at some rung of the promotion lattice
/// `integer -> bignum -> fraction -> big_fraction -> decimal` (§4.4.1).
/// Bignum/fraction vs. big_fraction is only a storage-width distinction;
/// `Integer`/`Fraction` already widen internally, so the lattice collapses
/// to three Rust variants without losing any of the promotion behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum Real {
    Integer(Integer),
    Fraction(Fraction),
    Decimal(Decimal),
}

impl Real {
    pub fn is_zero(&self) -> bool {
        match self {
            Real::Integer(i) => i.is_zero(),
            Real::Fraction(f) => f.is_zero(),
            Real::Decimal(d) => d.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Real::Integer(i) => i.is_negative(),
            Real::Fraction(f) => f.numerator().sign() == num_bigint::Sign::Minus,
            Real::Decimal(d) => d.is_negative(),
        }
    }

    /// Lattice rung, higher is "more promoted" (§4.4.1 diagram).
    fn rung(&self) -> u8 {
        match self {
            Real::Integer(_) => 0,
            Real::Fraction(_) => 1,
            Real::Decimal(_) => 2,
        }
    }

    pub fn to_decimal(&self, precision: usize) -> Decimal {
        match self {
            Real::Integer(Integer::Small(v)) => Decimal::from_i64(*v),
            Real::Integer(Integer::Big(v)) => {
                let negative = v.sign() == num_bigint::Sign::Minus;
                let mantissa = v.magnitude().clone();
                Decimal::from_parts(negative, mantissa, 0, precision.max(digit_len(v)))
            }
            Real::Fraction(f) => {
                let n = Decimal::from_parts(
                    f.numerator().sign() == num_bigint::Sign::Minus,
                    f.numerator().magnitude().clone(),
                    0,
                    precision,
                );
                let d = Decimal::from_parts(false, f.denominator().magnitude().clone(), 0, precision);
                decimal::div(&n, &d, precision).unwrap_or_else(Decimal::zero)
            }
            Real::Decimal(d) => d.clone(),
        }
    }
}

fn digit_len(v: &num_bigint::BigInt) -> usize {
    v.magnitude().to_string().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rung_orders_the_lattice() {
        assert!(Real::Integer(Integer::small(1)).rung() < Real::Fraction(
            fraction::Fraction::new(1.into(), 2.into()).unwrap()
        ).rung());
    }
}
