//! The per-kind dispatch table (§4.2, §9 redesign flag "dynamic dispatch
//! via switch on tag").
//!
//! One static record per kind — name, arity, precedence, help topic —
//! built once into a `OnceLock` and looked up by tag. `size`/`parse`
//! already live in [`super::codec`] as kind-generic functions (the codec
//! doesn't need a per-kind row to know an object's length, since every
//! encoding is self-delimiting); `evaluate`/`execute` live in the
//! evaluator's own match over [`super::Object`] rather than as function
//! pointers here, so this table stays plain data with no cross-module
//! function-pointer wiring to keep alive.

use super::kind::Kind;
use std::sync::OnceLock;

/// One dispatch-table row (§4.2's static per-kind record, minus the
/// size/parse/evaluate/execute hooks that live elsewhere, see module docs).
#[derive(Debug, Clone, Copy)]
pub struct DispatchRow {
    pub kind: Kind,
    pub name: &'static str,
    pub arity: usize,
    pub precedence: u8,
    pub help: &'static str,
}

fn arity_of(kind: Kind) -> usize {
    match kind {
        Kind::CmdAdd
        | Kind::CmdSub
        | Kind::CmdMul
        | Kind::CmdDiv
        | Kind::CmdPow
        | Kind::CmdMod
        | Kind::CmdRem
        | Kind::CmdSto
        | Kind::CmdSwap
        | Kind::CmdStof
        | Kind::CmdRclf
        | Kind::CmdMap
        | Kind::CmdIfErr => 2,
        Kind::CmdNeg
        | Kind::CmdInv
        | Kind::CmdSin
        | Kind::CmdCos
        | Kind::CmdTan
        | Kind::CmdAsin
        | Kind::CmdAcos
        | Kind::CmdAtan
        | Kind::CmdExp
        | Kind::CmdLn
        | Kind::CmdSqrt
        | Kind::CmdToQ
        | Kind::CmdToNum
        | Kind::CmdToFraction
        | Kind::CmdDup
        | Kind::CmdDrop
        | Kind::CmdRcl
        | Kind::CmdPurge
        | Kind::CmdSf
        | Kind::CmdCf
        | Kind::CmdFsq
        | Kind::CmdFcq
        | Kind::CmdFsqc
        | Kind::CmdFcqc
        | Kind::CmdDoerr
        | Kind::CmdExpand
        | Kind::CmdCollect
        | Kind::CmdSimplify
        | Kind::CmdEval => 1,
        Kind::CmdOver | Kind::CmdRot => match kind {
            Kind::CmdRot => 3,
            _ => 2,
        },
        _ if kind.is_command() => 0,
        _ => 0,
    }
}

fn precedence_of(kind: Kind) -> u8 {
    match kind {
        Kind::CmdAdd | Kind::CmdSub => 1,
        Kind::CmdMul | Kind::CmdDiv | Kind::CmdMod | Kind::CmdRem => 2,
        Kind::CmdPow => 3,
        Kind::CmdNeg => 4,
        _ => 0,
    }
}

fn help_of(kind: Kind) -> &'static str {
    match kind {
        Kind::Integer | Kind::NegInteger => "Exact integers up to 63 bits of magnitude",
        Kind::Bignum | Kind::NegBignum => "Arbitrary-precision integers",
        Kind::Fraction | Kind::NegFraction | Kind::BigFraction | Kind::NegBigFraction => {
            "Exact ratios, always stored reduced"
        }
        Kind::Decimal => "Variable-precision decimal numbers",
        Kind::ComplexRect | Kind::ComplexPolar => "Complex numbers, rectangular or polar",
        Kind::Unit => "A magnitude paired with a unit expression",
        Kind::List => "An ordered, heterogeneous sequence",
        Kind::Array => "A vector or matrix of numbers",
        Kind::Symbol => "A variable or function name",
        Kind::Expression => "A symbolic expression, rendered infix",
        Kind::Program => "A sequence of objects run in order",
        Kind::CmdAdd => "Adds the top two stack levels",
        Kind::CmdSub => "Subtracts level 1 from level 2",
        Kind::CmdMul => "Multiplies the top two stack levels",
        Kind::CmdDiv => "Divides level 2 by level 1",
        Kind::CmdSto => "Stores level 2 under the name in level 1",
        Kind::CmdRcl => "Recalls the value bound to a name",
        _ => "",
    }
}

fn build_table() -> Vec<DispatchRow> {
    use strum::IntoEnumIterator;
    Kind::iter()
        .map(|kind| DispatchRow {
            kind,
            name: kind.name(),
            arity: arity_of(kind),
            precedence: precedence_of(kind),
            help: help_of(kind),
        })
        .collect()
}

static TABLE: OnceLock<Vec<DispatchRow>> = OnceLock::new();

/// The full dispatch table, built on first use (§9 redesign flag: one
/// table, not per-kind `impl` blocks).
pub fn table() -> &'static [DispatchRow] {
    TABLE.get_or_init(build_table)
}

/// The row for a specific kind. Every [`Kind`] variant has a row, so this
/// never returns `None` in practice; it stays fallible because the tag
/// space is `#[non_exhaustive]`.
pub fn row(kind: Kind) -> Option<&'static DispatchRow> {
    table().iter().find(|row| row.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_a_row() {
        for kind in Kind::iter() {
            assert!(row(kind).is_some(), "missing dispatch row for {kind:?}");
        }
    }

    #[test]
    fn add_is_binary_and_low_precedence() {
        let row = row(Kind::CmdAdd).unwrap();
        assert_eq!(row.arity, 2);
        assert_eq!(row.precedence, 1);
    }
}
