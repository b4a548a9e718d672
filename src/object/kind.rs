//! The closed kind enumeration and its static classifiers (§3.2, C2).
//!
//! `Kind` is the tag every object's byte encoding starts with (varint-coded
//! in the heap; the numeric values below are the tag identifiers, kept
//! small and contiguous so the dispatch table is a plain array indexed by
//! `Kind as usize`). Data kinds come first, commands follow, as one flat
//! enum rather than splitting commands into their own space, so dispatch
//! stays a single lookup.

use strum::EnumIter;

/// A closed tag identifying an object's representation and dispatch row.
///
/// `#[non_exhaustive]` signals that the taxonomy is closed *to this crate's
/// release*, not literally closed in the type-system sense — new kinds are
/// an additive, versioned change, appended rather than reordered so that
/// persisted byte encodings referring to existing tags stay stable.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
#[non_exhaustive]
pub enum Kind {
    // -- numbers --
    Integer = 0,
    NegInteger = 1,
    BasedInteger = 2,
    Bignum = 3,
    NegBignum = 4,
    Fraction = 5,
    NegFraction = 6,
    BigFraction = 7,
    NegBigFraction = 8,
    Decimal = 9,
    ComplexRect = 10,
    ComplexPolar = 11,
    // -- algebraic containers --
    Unit = 12,
    List = 13,
    Array = 14,
    // -- symbolic --
    Symbol = 15,
    Expression = 16,
    Program = 17,
    // -- text & structure --
    Text = 18,
    Tag = 19,
    Directory = 20,
    // -- external, opaque to this crate --
    Grob = 21,
    Font = 22,
    // -- commands: arithmetic --
    CmdAdd = 100,
    CmdSub = 101,
    CmdMul = 102,
    CmdDiv = 103,
    CmdPow = 104,
    CmdMod = 105,
    CmdRem = 106,
    CmdNeg = 107,
    CmdInv = 108,
    // -- commands: trig & transcendental --
    CmdSin = 120,
    CmdCos = 121,
    CmdTan = 122,
    CmdAsin = 123,
    CmdAcos = 124,
    CmdAtan = 125,
    CmdExp = 126,
    CmdLn = 127,
    CmdSqrt = 128,
    // -- commands: conversion --
    CmdToQ = 140,
    CmdToNum = 141,
    CmdToFraction = 142,
    // -- commands: stack --
    CmdDup = 160,
    CmdDrop = 161,
    CmdSwap = 162,
    CmdOver = 163,
    CmdRot = 164,
    CmdEval = 165,
    // -- commands: directory/variables --
    CmdSto = 180,
    CmdRcl = 181,
    CmdPurge = 182,
    CmdHome = 183,
    CmdUpDir = 184,
    CmdPath = 185,
    // -- commands: flags/settings --
    CmdSf = 200,
    CmdCf = 201,
    CmdFsq = 202,
    CmdFcq = 203,
    CmdFsqc = 204,
    CmdFcqc = 205,
    CmdStof = 206,
    CmdRclf = 207,
    // -- commands: errors --
    CmdErrm = 220,
    CmdErrn = 221,
    CmdErr0 = 222,
    CmdDoerr = 223,
    CmdIfErr = 224,
    // -- commands: algebra --
    CmdExpand = 240,
    CmdCollect = 241,
    CmdSimplify = 242,
    CmdMap = 243,
}

impl Kind {
    /// The tag's numeric identifier, as written to the heap.
    pub const fn tag(self) -> u16 {
        self as u16
    }

    /// Short display name, e.g. `"+"` for [`Kind::CmdAdd`].
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Integer => "integer",
            Kind::NegInteger => "neg_integer",
            Kind::BasedInteger => "based_integer",
            Kind::Bignum => "bignum",
            Kind::NegBignum => "neg_bignum",
            Kind::Fraction => "fraction",
            Kind::NegFraction => "neg_fraction",
            Kind::BigFraction => "big_fraction",
            Kind::NegBigFraction => "neg_big_fraction",
            Kind::Decimal => "decimal",
            Kind::ComplexRect => "complex_rect",
            Kind::ComplexPolar => "complex_polar",
            Kind::Unit => "unit",
            Kind::List => "list",
            Kind::Array => "array",
            Kind::Symbol => "symbol",
            Kind::Expression => "expression",
            Kind::Program => "program",
            Kind::Text => "text",
            Kind::Tag => "tag",
            Kind::Directory => "directory",
            Kind::Grob => "grob",
            Kind::Font => "font",
            Kind::CmdAdd => "+",
            Kind::CmdSub => "-",
            Kind::CmdMul => "*",
            Kind::CmdDiv => "/",
            Kind::CmdPow => "^",
            Kind::CmdMod => "MOD",
            Kind::CmdRem => "REM",
            Kind::CmdNeg => "NEG",
            Kind::CmdInv => "INV",
            Kind::CmdSin => "SIN",
            Kind::CmdCos => "COS",
            Kind::CmdTan => "TAN",
            Kind::CmdAsin => "ASIN",
            Kind::CmdAcos => "ACOS",
            Kind::CmdAtan => "ATAN",
            Kind::CmdExp => "EXP",
            Kind::CmdLn => "LN",
            Kind::CmdSqrt => "SQRT",
            Kind::CmdToQ => "\u{2192}Q",
            Kind::CmdToNum => "\u{2192}Num",
            Kind::CmdToFraction => "\u{2192}Frac",
            Kind::CmdDup => "DUP",
            Kind::CmdDrop => "DROP",
            Kind::CmdSwap => "SWAP",
            Kind::CmdOver => "OVER",
            Kind::CmdRot => "ROT",
            Kind::CmdEval => "EVAL",
            Kind::CmdSto => "STO",
            Kind::CmdRcl => "RCL",
            Kind::CmdPurge => "PURGE",
            Kind::CmdHome => "HOME",
            Kind::CmdUpDir => "UPDIR",
            Kind::CmdPath => "PATH",
            Kind::CmdSf => "SF",
            Kind::CmdCf => "CF",
            Kind::CmdFsq => "FS?",
            Kind::CmdFcq => "FC?",
            Kind::CmdFsqc => "FS?C",
            Kind::CmdFcqc => "FC?C",
            Kind::CmdStof => "STOF",
            Kind::CmdRclf => "RCLF",
            Kind::CmdErrm => "errm",
            Kind::CmdErrn => "errn",
            Kind::CmdErr0 => "err0",
            Kind::CmdDoerr => "doerr",
            Kind::CmdIfErr => "IFERR",
            Kind::CmdExpand => "EXPAND",
            Kind::CmdCollect => "COLLECT",
            Kind::CmdSimplify => "SIMPLIFY",
            Kind::CmdMap => "MAP",
        }
    }

    /// True if this kind carries no payload bytes (a bare command).
    pub const fn is_command(self) -> bool {
        (self as u16) >= 100
    }

    /// True for any of the real-number kinds (everything below complex).
    pub const fn is_real(self) -> bool {
        matches!(
            self,
            Kind::Integer
                | Kind::NegInteger
                | Kind::BasedInteger
                | Kind::Bignum
                | Kind::NegBignum
                | Kind::Fraction
                | Kind::NegFraction
                | Kind::BigFraction
                | Kind::NegBigFraction
                | Kind::Decimal
        )
    }

    /// True for the two complex-number storage shapes.
    pub const fn is_complex(self) -> bool {
        matches!(self, Kind::ComplexRect | Kind::ComplexPolar)
    }

    /// True for exact integer-like kinds (small or bignum, either sign).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Integer | Kind::NegInteger | Kind::Bignum | Kind::NegBignum
        )
    }

    pub const fn is_based(self) -> bool {
        matches!(self, Kind::BasedInteger)
    }

    pub const fn is_bignum(self) -> bool {
        matches!(self, Kind::Bignum | Kind::NegBignum)
    }

    pub const fn is_fraction(self) -> bool {
        matches!(
            self,
            Kind::Fraction | Kind::NegFraction | Kind::BigFraction | Kind::NegBigFraction
        )
    }

    pub const fn is_decimal(self) -> bool {
        matches!(self, Kind::Decimal)
    }

    /// True for kinds that are algebraic values: symbols, expressions and
    /// numbers, i.e. anything `EVAL` may need to reduce.
    pub const fn is_algebraic(self) -> bool {
        self.is_real() || self.is_complex() || matches!(self, Kind::Symbol | Kind::Expression | Kind::Unit)
    }

    pub const fn is_symbolic(self) -> bool {
        matches!(self, Kind::Symbol | Kind::Expression)
    }

    /// True for menu/catalog commands that run at parse time rather than
    /// at evaluation time (§4.6, §9 open question 2). None of the core
    /// command set here is immediate; the flag exists on the type for
    /// hosts that register menu-only commands.
    pub const fn is_immediate(self) -> bool {
        false
    }
}
