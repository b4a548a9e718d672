//! Recursive-descent parser (C9, §4.9, §6.2): text source to [`Object`].
//!
//! The shared parser state is the `(source, position, end, output)` tuple
//! §4.9 describes; here it is [`Cursor`]. [`parse_object`] walks a
//! priority-ordered table of literal forms, the same data-over-dispatch
//! shape [`crate::object::dispatch`] uses for opcodes: each rule either
//! consumes and returns `Ok`, declines by returning `Skip` (position
//! rewound), or aborts the whole parse with `Error`.
//!
//! Positions are counted in `char`s, not bytes, since several literal forms
//! use multi-byte glyphs (`∡`, `ⅈ`, superscript/subscript digits); spans
//! recorded on [`crate::error::Error`] are therefore char offsets into the
//! source, not byte offsets.

pub mod renderer;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer as _;
use num_traits::{ToPrimitive, Zero};

use crate::algebra::array::Array;
use crate::algebra::complex::{Complex, Component};
use crate::algebra::list::List;
use crate::algebra::unit::{Unit, UnitExpr};
use crate::error::{Error, ErrorKind, Span};
use crate::number::based::Based;
use crate::number::decimal::Decimal;
use crate::number::fraction::Fraction;
use crate::number::integer::Integer;
use crate::number::Real;
use crate::object::Object;
use crate::settings::Settings;
use crate::symbolic::expression::{Expression, ExprNode};
use crate::symbolic::program::Program;
use crate::symbolic::symbol::Symbol;

/// Cursor over the source text, tracked by char index.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Cursor { chars: source.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }
}

/// The per-rule result a parse attempt returns (§9 design note: the
/// `(ok, skip, error, warn, commented)` result shape). `Warn`/`Commented`
/// have no handler in this object grammar yet, so the live contract is
/// the three variants actually produced; the richer shape stays the type's
/// documented intent for a host UI layered on top.
enum ParseOutcome {
    Ok(Object),
    Skip,
    Error(ErrorKind),
    #[allow(dead_code)]
    Warn(Object, String),
    #[allow(dead_code)]
    Commented(Object),
}

type ParseFn = fn(&mut Cursor, &Settings) -> ParseOutcome;

struct ParseRule {
    #[allow(dead_code)]
    name: &'static str,
    parse: ParseFn,
}

/// Priority order: delimiter-bounded forms first (unambiguous on their
/// first character), then the numeric/command grammar, symbols last.
const RULES: &[ParseRule] = &[
    ParseRule { name: "text", parse: parse_text },
    ParseRule { name: "program", parse: parse_program },
    ParseRule { name: "list", parse: parse_list },
    ParseRule { name: "array", parse: parse_array },
    ParseRule { name: "tag", parse: parse_tag },
    ParseRule { name: "expression", parse: parse_expression_literal },
    ParseRule { name: "number", parse: parse_number_like },
    ParseRule { name: "command", parse: parse_command },
    ParseRule { name: "symbol", parse: parse_symbol },
];

/// Parses a single object from `source`, per the active [`Settings`]
/// (display base, precision, angle mode feed literal defaults). Trailing
/// garbage after a fully-consumed object is a `SyntaxError`.
pub fn parse(source: &str, settings: &Settings) -> Result<Object, Error> {
    let mut cur = Cursor::new(source);
    cur.skip_ws();
    if cur.eof() {
        return Err(Error::new(ErrorKind::SyntaxError));
    }
    let obj = parse_object(&mut cur, settings)?;
    cur.skip_ws();
    if !cur.eof() {
        return Err(Error::new(ErrorKind::SyntaxError).with_span(Span::new(cur.pos, cur.chars.len())));
    }
    Ok(obj)
}

fn parse_object(cur: &mut Cursor, settings: &Settings) -> Result<Object, Error> {
    cur.skip_ws();
    if cur.eof() {
        return Err(Error::new(ErrorKind::Unterminated));
    }
    let checkpoint = cur.pos;
    for rule in RULES {
        cur.pos = checkpoint;
        match (rule.parse)(cur, settings) {
            ParseOutcome::Ok(obj) => return Ok(obj),
            ParseOutcome::Warn(obj, _) => return Ok(obj),
            ParseOutcome::Commented(obj) => return Ok(obj),
            ParseOutcome::Skip => continue,
            ParseOutcome::Error(kind) => {
                return Err(Error::new(kind).with_span(Span::new(checkpoint, cur.pos)))
            }
        }
    }
    cur.pos = checkpoint;
    Err(Error::new(ErrorKind::SyntaxError))
}

// ---------------------------------------------------------------------
// Text: "…" with "" as an embedded quote.
// ---------------------------------------------------------------------

fn parse_text(cur: &mut Cursor, _settings: &Settings) -> ParseOutcome {
    if cur.peek() != Some('"') {
        return ParseOutcome::Skip;
    }
    cur.advance();
    let mut s = String::new();
    loop {
        match cur.advance() {
            None => return ParseOutcome::Error(ErrorKind::Unterminated),
            Some('"') => {
                if cur.peek() == Some('"') {
                    cur.advance();
                    s.push('"');
                } else {
                    return ParseOutcome::Ok(Object::Text(s));
                }
            }
            Some(c) => s.push(c),
        }
    }
}

// ---------------------------------------------------------------------
// Program: «…», whitespace-separated objects.
// ---------------------------------------------------------------------

fn parse_program(cur: &mut Cursor, settings: &Settings) -> ParseOutcome {
    if cur.peek() != Some('\u{ab}') {
        return ParseOutcome::Skip;
    }
    cur.advance();
    let mut items = Vec::new();
    loop {
        cur.skip_ws();
        match cur.peek() {
            None => return ParseOutcome::Error(ErrorKind::Unterminated),
            Some('\u{bb}') => {
                cur.advance();
                return ParseOutcome::Ok(Object::Program(Program::new(items)));
            }
            _ => match parse_object(cur, settings) {
                Ok(obj) => items.push(obj),
                Err(e) => return ParseOutcome::Error(*e.kind()),
            },
        }
    }
}

// ---------------------------------------------------------------------
// List: {…}, comma- or whitespace-separated objects.
// ---------------------------------------------------------------------

fn parse_list(cur: &mut Cursor, settings: &Settings) -> ParseOutcome {
    if cur.peek() != Some('{') {
        return ParseOutcome::Skip;
    }
    cur.advance();
    let mut items = Vec::new();
    loop {
        cur.skip_ws();
        match cur.peek() {
            None => return ParseOutcome::Error(ErrorKind::Unterminated),
            Some(',') => {
                cur.advance();
            }
            Some('}') => {
                cur.advance();
                return ParseOutcome::Ok(Object::List(List::new(items)));
            }
            _ => match parse_object(cur, settings) {
                Ok(obj) => items.push(obj),
                Err(e) => return ParseOutcome::Error(*e.kind()),
            },
        }
    }
}

// ---------------------------------------------------------------------
// Array: […], rows separated by `;`, elements by `,` or whitespace.
// ---------------------------------------------------------------------

fn parse_array(cur: &mut Cursor, settings: &Settings) -> ParseOutcome {
    if cur.peek() != Some('[') {
        return ParseOutcome::Skip;
    }
    cur.advance();
    let mut rows: Vec<Vec<Real>> = vec![Vec::new()];
    loop {
        cur.skip_ws();
        match cur.peek() {
            None => return ParseOutcome::Error(ErrorKind::Unterminated),
            Some(']') => {
                cur.advance();
                break;
            }
            Some(',') => {
                cur.advance();
            }
            Some(';') => {
                cur.advance();
                rows.push(Vec::new());
            }
            _ => match scan_real(cur, settings) {
                Some(Ok(r)) => rows.last_mut().expect("rows always has one entry").push(r),
                Some(Err(e)) => return ParseOutcome::Error(e),
                None => return ParseOutcome::Error(ErrorKind::SyntaxError),
            },
        }
    }
    if rows.len() == 1 {
        return ParseOutcome::Ok(Object::Array(Array::vector(rows.into_iter().next().unwrap())));
    }
    let row_len = rows[0].len();
    if rows.iter().any(|r| r.len() != row_len) {
        return ParseOutcome::Error(ErrorKind::InvalidDimension);
    }
    let data: Vec<Real> = rows.into_iter().flatten().collect();
    match Array::matrix(data.len() / row_len.max(1), row_len, data) {
        Ok(a) => ParseOutcome::Ok(Object::Array(a)),
        Err(e) => ParseOutcome::Error(e),
    }
}

// ---------------------------------------------------------------------
// Tag: :name:value
// ---------------------------------------------------------------------

fn parse_tag(cur: &mut Cursor, settings: &Settings) -> ParseOutcome {
    if cur.peek() != Some(':') {
        return ParseOutcome::Skip;
    }
    cur.advance();
    let mut name = String::new();
    loop {
        match cur.peek() {
            Some(':') => {
                cur.advance();
                break;
            }
            Some(c) if !c.is_whitespace() => {
                name.push(c);
                cur.advance();
            }
            _ => return ParseOutcome::Error(ErrorKind::Unterminated),
        }
    }
    if name.is_empty() {
        return ParseOutcome::Error(ErrorKind::SyntaxError);
    }
    match parse_object(cur, settings) {
        Ok(value) => ParseOutcome::Ok(Object::Tag(name, Box::new(value))),
        Err(e) => ParseOutcome::Error(*e.kind()),
    }
}

// ---------------------------------------------------------------------
// Expression: 'infix text', parsed by local precedence climbing.
// ---------------------------------------------------------------------

fn parse_expression_literal(cur: &mut Cursor, settings: &Settings) -> ParseOutcome {
    if cur.peek() != Some('\'') {
        return ParseOutcome::Skip;
    }
    cur.advance();
    let mut inner = String::new();
    loop {
        match cur.advance() {
            None => return ParseOutcome::Error(ErrorKind::Unterminated),
            Some('\'') => break,
            Some(c) => inner.push(c),
        }
    }
    match parse_expr_str(&inner, settings) {
        Ok(node) => ParseOutcome::Ok(Object::Expression(Expression::from_tree(&node))),
        Err(kind) => ParseOutcome::Error(kind),
    }
}

struct ExprCursor {
    chars: Vec<char>,
    pos: usize,
}

impl ExprCursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }
}

fn normalize_op(c: char) -> char {
    match c {
        '\u{b7}' | '\u{d7}' => '*', // · ×
        '\u{f7}' => '/',            // ÷
        '\u{2191}' => '^',          // ↑
        other => other,
    }
}

/// `(left, right)` binding power; `^` binds right-associatively (its right
/// power is lower than its left). Only relative order matters — these are
/// not the same numbers as [`crate::symbolic::expression`]'s public
/// precedence table (that table is private to its module by design), but
/// they are kept in the same three-tier shape: `+`/`-` < `*`/`/` < `^`.
fn binding_power(op: char) -> Option<(u8, u8)> {
    match op {
        '+' | '-' => Some((1, 2)),
        '*' | '/' => Some((3, 4)),
        '^' => Some((6, 5)),
        _ => None,
    }
}

fn parse_expr_str(s: &str, settings: &Settings) -> Result<ExprNode, ErrorKind> {
    let mut ec = ExprCursor { chars: s.chars().collect(), pos: 0 };
    ec.skip_ws();
    let node = parse_expr_bp(&mut ec, settings, 0)?;
    ec.skip_ws();
    if ec.pos != ec.chars.len() {
        return Err(ErrorKind::SyntaxError);
    }
    Ok(node)
}

fn parse_expr_bp(ec: &mut ExprCursor, settings: &Settings, min_bp: u8) -> Result<ExprNode, ErrorKind> {
    let mut lhs = parse_expr_prefix(ec, settings)?;
    loop {
        ec.skip_ws();
        let Some(raw) = ec.peek() else { break };
        let op = normalize_op(raw);
        let Some((l_bp, r_bp)) = binding_power(op) else { break };
        if l_bp < min_bp {
            break;
        }
        ec.advance();
        let rhs = parse_expr_bp(ec, settings, r_bp)?;
        let name = Symbol::new(op.to_string()).map_err(|_| ErrorKind::SyntaxError)?;
        lhs = ExprNode::Apply(name, vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_expr_prefix(ec: &mut ExprCursor, settings: &Settings) -> Result<ExprNode, ErrorKind> {
    ec.skip_ws();
    match ec.peek() {
        Some('-') => {
            ec.advance();
            let operand = parse_expr_bp(ec, settings, 7)?;
            Ok(ExprNode::Apply(Symbol::new("neg").expect("operator symbol"), vec![operand]))
        }
        Some('\u{221a}') => {
            // √
            ec.advance();
            let operand = parse_expr_bp(ec, settings, 7)?;
            let sym = Symbol::new("sqrt").map_err(|_| ErrorKind::SyntaxError)?;
            Ok(ExprNode::Apply(sym, vec![operand]))
        }
        Some('(') => {
            ec.advance();
            let inner = parse_expr_bp(ec, settings, 0)?;
            ec.skip_ws();
            if ec.peek() != Some(')') {
                return Err(ErrorKind::Unterminated);
            }
            ec.advance();
            Ok(inner)
        }
        Some(c) if c.is_ascii_digit() => parse_expr_number(ec, settings),
        Some(c) if c.is_alphabetic() || c == '_' => parse_expr_identifier_or_call(ec, settings),
        _ => Err(ErrorKind::SyntaxError),
    }
}

fn parse_expr_number(ec: &mut ExprCursor, settings: &Settings) -> Result<ExprNode, ErrorKind> {
    let mut digits = String::new();
    while matches!(ec.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(ec.advance().unwrap());
    }
    if ec.peek() == Some('.') {
        ec.advance();
        let mut frac = String::new();
        while matches!(ec.peek(), Some(c) if c.is_ascii_digit()) {
            frac.push(ec.advance().unwrap());
        }
        let mantissa_str = format!("{digits}{frac}");
        let mantissa: BigUint = mantissa_str.parse().map_err(|_| ErrorKind::SyntaxError)?;
        let exponent = -(frac.len() as i64);
        let precision = settings.precision().max(mantissa_str.len());
        return Ok(ExprNode::Number(Real::Decimal(Decimal::from_parts(false, mantissa, exponent, precision))));
    }
    if digits.is_empty() {
        return Err(ErrorKind::SyntaxError);
    }
    let n: BigInt = digits.parse().map_err(|_| ErrorKind::SyntaxError)?;
    Ok(ExprNode::Number(Real::Integer(Integer::from_bigint(n))))
}

fn parse_expr_identifier_or_call(ec: &mut ExprCursor, settings: &Settings) -> Result<ExprNode, ErrorKind> {
    let mut name = String::new();
    while matches!(ec.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
        name.push(ec.advance().unwrap());
    }
    ec.skip_ws();
    if ec.peek() == Some('(') {
        ec.advance();
        let mut args = Vec::new();
        ec.skip_ws();
        if ec.peek() != Some(')') {
            loop {
                args.push(parse_expr_bp(ec, settings, 0)?);
                ec.skip_ws();
                match ec.peek() {
                    Some(',') => {
                        ec.advance();
                    }
                    Some(')') => break,
                    _ => return Err(ErrorKind::Unterminated),
                }
            }
        }
        if ec.peek() != Some(')') {
            return Err(ErrorKind::Unterminated);
        }
        ec.advance();
        let sym = Symbol::new(name).map_err(|_| ErrorKind::SyntaxError)?;
        return Ok(ExprNode::Apply(sym, args));
    }
    let sym = Symbol::new(name).map_err(|_| ErrorKind::SyntaxError)?;
    Ok(ExprNode::Symbol(sym))
}

// ---------------------------------------------------------------------
// Numbers: integer / based / decimal / DMS / fraction, plus the complex
// and unit suffixes that can follow a real literal.
// ---------------------------------------------------------------------

const SUPERSCRIPT_DIGITS: &[(char, u32)] = &[
    ('\u{2070}', 0), ('\u{b9}', 1), ('\u{b2}', 2), ('\u{b3}', 3), ('\u{2074}', 4),
    ('\u{2075}', 5), ('\u{2076}', 6), ('\u{2077}', 7), ('\u{2078}', 8), ('\u{2079}', 9),
];

const SUBSCRIPT_DIGITS: &[(char, u32)] = &[
    ('\u{2080}', 0), ('\u{2081}', 1), ('\u{2082}', 2), ('\u{2083}', 3), ('\u{2084}', 4),
    ('\u{2085}', 5), ('\u{2086}', 6), ('\u{2087}', 7), ('\u{2088}', 8), ('\u{2089}', 9),
];

fn superscript_digit(c: char) -> Option<u32> {
    SUPERSCRIPT_DIGITS.iter().find(|(ch, _)| *ch == c).map(|(_, v)| *v)
}

fn subscript_digit(c: char) -> Option<u32> {
    SUBSCRIPT_DIGITS.iter().find(|(ch, _)| *ch == c).map(|(_, v)| *v)
}

fn scan_superscript_digits(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while let Some(v) = cur.peek().and_then(superscript_digit) {
        s.push(char::from_digit(v, 10).unwrap());
        cur.advance();
    }
    s
}

fn scan_subscript_digits(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while let Some(v) = cur.peek().and_then(subscript_digit) {
        s.push(char::from_digit(v, 10).unwrap());
        cur.advance();
    }
    s
}

/// Digits with optional grouping separators. Plain space is deliberately
/// excluded: numbers are whitespace-delimited tokens (`« 2 3 + »`), so
/// treating a space as a thousands separator would swallow the next
/// token. `renderer` makes the matching choice (see DESIGN.md).
fn scan_digits_with_separators(cur: &mut Cursor) -> String {
    let mut s = String::new();
    loop {
        match cur.peek() {
            Some(c) if c.is_ascii_digit() => {
                s.push(c);
                cur.advance();
            }
            Some(c) if matches!(c, '\'' | ',' | '_') => {
                cur.advance();
            }
            _ => break,
        }
    }
    s
}

fn scan_based_digits(cur: &mut Cursor) -> String {
    let mut s = String::new();
    loop {
        match cur.peek() {
            Some(c) if c.is_ascii_alphanumeric() => {
                s.push(c);
                cur.advance();
            }
            Some(c) if matches!(c, '\'' | ',' | '_') => {
                cur.advance();
            }
            _ => break,
        }
    }
    s
}

fn looks_like_number_start(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '#' || superscript_digit(c).is_some()
}

/// `nn#digits` (explicit decimal base) or `#digits` (default/display base),
/// optionally followed by a subscript base (`#FF\u{2081}\u{2086}`). The
/// ambiguous HP-style trailing `b`/`o`/`d`/`h` shorthand is not supported:
/// `b`/`d` collide with valid hex digits and cannot be disambiguated
/// without first knowing the base (see DESIGN.md).
fn parse_based(cur: &mut Cursor, settings: &Settings) -> Option<Result<Based, ErrorKind>> {
    let start = cur.pos;
    let mut look = cur.pos;
    while matches!(cur.chars.get(look), Some(c) if c.is_ascii_digit()) {
        look += 1;
    }
    if look > cur.pos && cur.chars.get(look) == Some(&'#') {
        let base_str: String = cur.chars[cur.pos..look].iter().collect();
        let base: u32 = match base_str.parse() {
            Ok(b) => b,
            Err(_) => return Some(Err(ErrorKind::InvalidBase)),
        };
        cur.pos = look + 1;
        let digits = scan_based_digits(cur);
        return Some(based_from_digits(&digits, base, settings));
    }

    if cur.peek() != Some('#') {
        cur.pos = start;
        return None;
    }
    cur.advance();
    let digits = scan_based_digits(cur);
    let sub = scan_subscript_digits(cur);
    let base = if sub.is_empty() { settings.base() } else { sub.parse().unwrap_or(settings.base()) };
    Some(based_from_digits(&digits, base, settings))
}

fn based_from_digits(digits: &str, base: u32, settings: &Settings) -> Result<Based, ErrorKind> {
    if !(2..=36).contains(&base) || digits.is_empty() {
        return Err(ErrorKind::InvalidBase);
    }
    let radix = BigUint::from(base);
    let mut value = BigUint::zero();
    for c in digits.chars() {
        let d = c.to_digit(base).ok_or(ErrorKind::InvalidBase)?;
        value = value * &radix + BigUint::from(d);
    }
    Ok(Based::new(value, settings.word_size(), base))
}

fn build_fraction(numer_digits: &str, denom_digits: &str, negative: bool) -> Result<Real, ErrorKind> {
    let n: BigInt = numer_digits.parse().map_err(|_| ErrorKind::SyntaxError)?;
    let n = if negative { -n } else { n };
    let d: BigInt = denom_digits.parse().map_err(|_| ErrorKind::SyntaxError)?;
    let f = Fraction::new(n, d).ok_or(ErrorKind::DivideByZero)?;
    Ok(match f.as_integer() {
        Some(i) => Real::Integer(i),
        None => Real::Fraction(f),
    })
}

/// `1.2.3` degrees-minutes-seconds, folded to decimal degrees. Uses an
/// `f64` intermediate; exact only to double precision, acceptable for a
/// literal form whose whole point is a human-entered angle (see
/// DESIGN.md).
fn dms_to_decimal(deg: &str, min: &str, sec: &str, negative: bool, precision: usize) -> Decimal {
    let d: f64 = deg.parse().unwrap_or(0.0);
    let m: f64 = if min.is_empty() { 0.0 } else { min.parse().unwrap_or(0.0) };
    let s: f64 = if sec.is_empty() { 0.0 } else { sec.parse().unwrap_or(0.0) };
    let value = d + m / 60.0 + s / 3600.0;
    let mut dec = Decimal::from_f64(value, precision);
    if negative {
        dec = dec.negate();
    }
    dec
}

/// Scans one real-number literal: integer, decimal (with optional
/// exponent), DMS, or a fraction (ASCII `n/d` or superscript/subscript
/// `\u{207f}/\u{2099}`). Does not consume a trailing complex/unit suffix;
/// callers that need one go through [`parse_number_like`].
fn scan_real(cur: &mut Cursor, settings: &Settings) -> Option<Result<Real, ErrorKind>> {
    let start = cur.pos;
    let negative = if cur.peek() == Some('-') {
        cur.advance();
        true
    } else {
        false
    };

    let sup = scan_superscript_digits(cur);
    if !sup.is_empty() {
        if cur.peek() == Some('/') {
            cur.advance();
            let sub = scan_subscript_digits(cur);
            let denom = if sub.is_empty() { scan_digits_with_separators(cur) } else { sub };
            if denom.is_empty() {
                return Some(Err(ErrorKind::SyntaxError));
            }
            return Some(build_fraction(&sup, &denom, negative));
        }
        cur.pos = start;
        return None;
    }

    if !matches!(cur.peek(), Some(c) if c.is_ascii_digit()) {
        cur.pos = start;
        return None;
    }
    let mantissa_digits = scan_digits_with_separators(cur);

    if cur.peek() == Some('.') {
        cur.advance();
        let frac1 = scan_digits_with_separators(cur);
        if cur.peek() == Some('.') {
            cur.advance();
            let frac2 = scan_digits_with_separators(cur);
            return Some(Ok(Real::Decimal(dms_to_decimal(
                &mantissa_digits,
                &frac1,
                &frac2,
                negative,
                settings.precision(),
            ))));
        }
        let mut exponent_digits = String::new();
        let mut exponent_negative = false;
        if matches!(cur.peek(), Some('e') | Some('E') | Some('\u{2373}')) {
            cur.advance();
            if cur.peek() == Some('-') {
                exponent_negative = true;
                cur.advance();
            } else if cur.peek() == Some('+') {
                cur.advance();
            }
            exponent_digits = scan_digits_with_separators(cur);
        }
        let mantissa_str = format!("{mantissa_digits}{frac1}");
        let mantissa: BigUint = match mantissa_str.parse() {
            Ok(m) => m,
            Err(_) => return Some(Err(ErrorKind::SyntaxError)),
        };
        let mut exponent = -(frac1.len() as i64);
        if !exponent_digits.is_empty() {
            let e: i64 = match exponent_digits.parse() {
                Ok(e) => e,
                Err(_) => return Some(Err(ErrorKind::SyntaxError)),
            };
            exponent += if exponent_negative { -e } else { e };
        }
        let precision = settings.precision().max(mantissa_str.len());
        return Some(Ok(Real::Decimal(Decimal::from_parts(negative, mantissa, exponent, precision))));
    }

    if cur.peek() == Some('/') {
        cur.advance();
        let denom_digits = scan_digits_with_separators(cur);
        if denom_digits.is_empty() {
            return Some(Err(ErrorKind::SyntaxError));
        }
        return Some(build_fraction(&mantissa_digits, &denom_digits, negative));
    }

    let n: BigInt = match mantissa_digits.parse() {
        Ok(n) => n,
        Err(_) => return Some(Err(ErrorKind::SyntaxError)),
    };
    let n = if negative { -n } else { n };
    Some(Ok(Real::Integer(Integer::from_bigint(n))))
}

pub(crate) fn negate_real(r: &Real) -> Real {
    match r {
        Real::Integer(i) => Real::Integer(i.negate()),
        Real::Fraction(f) => Real::Fraction(f.negate()),
        Real::Decimal(d) => Real::Decimal(d.negate()),
    }
}

fn scan_identifier(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while matches!(cur.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
        s.push(cur.advance().unwrap());
    }
    s
}

/// Parses a compound unit expression: `name(^exp)? ((*|/) name(^exp)?)*`.
fn parse_unit_expr(cur: &mut Cursor) -> Result<UnitExpr, ErrorKind> {
    let mut terms = Vec::new();
    let mut sign = 1i32;
    loop {
        let name = scan_identifier(cur);
        if name.is_empty() {
            return Err(ErrorKind::SyntaxError);
        }
        let mut exp = sign;
        if cur.peek() == Some('^') {
            cur.advance();
            let neg = if cur.peek() == Some('-') {
                cur.advance();
                true
            } else {
                false
            };
            let digits = scan_digits_with_separators(cur);
            let v: i32 = digits.parse().unwrap_or(1);
            exp = sign * if neg { -v } else { v };
        }
        terms.push((name, exp));
        match cur.peek() {
            Some('*') => {
                cur.advance();
                sign = 1;
            }
            Some('/') => {
                cur.advance();
                sign = -1;
            }
            _ => break,
        }
    }
    Ok(UnitExpr::from_terms(terms))
}

/// Complex/unit suffixes that may follow a plain real literal, tried in
/// the order they cannot collide: polar `\u{2221}`, then rectangular
/// `+`/`-` ending in `\u{2148}`/`i`, then a unit tag `_unit`.
fn finish_with_suffix(cur: &mut Cursor, obj: Object, settings: &Settings) -> ParseOutcome {
    let real = match &obj {
        Object::Real(r) => r.clone(),
        _ => return ParseOutcome::Ok(obj),
    };

    if cur.peek() == Some('\u{2221}') {
        cur.advance();
        return match scan_real(cur, settings) {
            Some(Ok(theta)) => ParseOutcome::Ok(Object::Complex(Complex::Polar {
                modulus: Component::Real(real),
                argument: Component::Real(theta),
                angle_unit: settings.angle_mode(),
            })),
            Some(Err(e)) => ParseOutcome::Error(e),
            None => ParseOutcome::Error(ErrorKind::SyntaxError),
        };
    }

    if matches!(cur.peek(), Some('+') | Some('-')) {
        let checkpoint = cur.pos;
        let sign = cur.advance().unwrap();
        if let Some(Ok(imag)) = scan_real(cur, settings) {
            if matches!(cur.peek(), Some('\u{2148}') | Some('i')) {
                cur.advance();
                let imag = if sign == '-' { negate_real(&imag) } else { imag };
                return ParseOutcome::Ok(Object::Complex(Complex::Rectangular {
                    real: Component::Real(real),
                    imag: Component::Real(imag),
                }));
            }
        }
        cur.pos = checkpoint;
    }

    if cur.peek() == Some('_') {
        cur.advance();
        return match parse_unit_expr(cur) {
            Ok(expr) => ParseOutcome::Ok(Object::Unit(Unit { magnitude: real, expr })),
            Err(e) => ParseOutcome::Error(e),
        };
    }

    ParseOutcome::Ok(Object::Real(real))
}

fn parse_number_like(cur: &mut Cursor, settings: &Settings) -> ParseOutcome {
    let start = cur.pos;
    if !matches!(cur.peek(), Some(c) if looks_like_number_start(c)) {
        return ParseOutcome::Skip;
    }
    if let Some(result) = parse_based(cur, settings) {
        return match result {
            Ok(based) => ParseOutcome::Ok(Object::Based(based)),
            Err(e) => ParseOutcome::Error(e),
        };
    }
    match scan_real(cur, settings) {
        Some(Ok(real)) => finish_with_suffix(cur, Object::Real(real), settings),
        Some(Err(e)) => ParseOutcome::Error(e),
        None => {
            cur.pos = start;
            ParseOutcome::Skip
        }
    }
}

// ---------------------------------------------------------------------
// Commands and symbols.
// ---------------------------------------------------------------------

const OPERATOR_TOKENS: &[(char, crate::object::Kind)] = &[
    ('+', crate::object::Kind::CmdAdd),
    ('-', crate::object::Kind::CmdSub),
    ('*', crate::object::Kind::CmdMul),
    ('/', crate::object::Kind::CmdDiv),
    ('^', crate::object::Kind::CmdPow),
];

fn scan_word(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while let Some(c) = cur.peek() {
        if c.is_whitespace() || "\"'{}[]\u{ab}\u{bb}:,;#".contains(c) {
            break;
        }
        s.push(c);
        cur.advance();
    }
    s
}

/// A known command name (`STO`, `SIN`, …) or one of the single-character
/// operator tokens, looked up against the dispatch table by exact,
/// case-sensitive name. Falls through to [`parse_symbol`] on no match —
/// the same case-sensitivity that keeps `x` a variable and `SIN` a
/// command is what the reference grammar relies on (§6.2).
fn parse_command(cur: &mut Cursor, _settings: &Settings) -> ParseOutcome {
    let start = cur.pos;
    if let Some(c) = cur.peek() {
        if let Some((_, kind)) = OPERATOR_TOKENS.iter().find(|(op, _)| *op == c) {
            cur.advance();
            return ParseOutcome::Ok(Object::Command(*kind));
        }
    }
    let word = scan_word(cur);
    if word.is_empty() {
        cur.pos = start;
        return ParseOutcome::Skip;
    }
    match crate::object::dispatch::table().iter().find(|row| row.kind.is_command() && row.name == word) {
        Some(row) => ParseOutcome::Ok(Object::Command(row.kind)),
        None => {
            cur.pos = start;
            ParseOutcome::Skip
        }
    }
}

fn parse_symbol(cur: &mut Cursor, _settings: &Settings) -> ParseOutcome {
    let start = cur.pos;
    let name = scan_identifier(cur);
    if name.is_empty() {
        cur.pos = start;
        return ParseOutcome::Skip;
    }
    match Symbol::new(name) {
        Ok(s) => ParseOutcome::Ok(Object::Symbol(s)),
        Err(e) => ParseOutcome::Error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer as Int;

    fn s() -> Settings {
        Settings::default()
    }

    #[test]
    fn parses_small_integer() {
        assert_eq!(parse("42", &s()).unwrap(), Object::Real(Real::Integer(Int::small(42))));
    }

    #[test]
    fn parses_negative_integer() {
        assert_eq!(parse("-7", &s()).unwrap(), Object::Real(Real::Integer(Int::small(-7))));
    }

    #[test]
    fn parses_decimal_with_exponent() {
        let obj = parse("1.5\u{2373}2", &s()).unwrap();
        match obj {
            Object::Real(Real::Decimal(d)) => assert_eq!(d.to_f64_lossy(), 150.0),
            other => panic!("expected decimal, got {other:?}"),
        }
    }

    #[test]
    fn parses_fraction() {
        let obj = parse("1/3", &s()).unwrap();
        match obj {
            Object::Real(Real::Fraction(f)) => {
                assert_eq!(f.numerator(), &BigInt::from(1));
                assert_eq!(f.denominator(), &BigInt::from(3));
            }
            other => panic!("expected fraction, got {other:?}"),
        }
    }

    #[test]
    fn fraction_reduces_to_integer_when_exact() {
        assert_eq!(parse("4/2", &s()).unwrap(), Object::Real(Real::Integer(Int::small(2))));
    }

    #[test]
    fn parses_based_integer_explicit_base() {
        let obj = parse("16#FF", &s()).unwrap();
        match obj {
            Object::Based(b) => {
                assert_eq!(b.base(), 16);
                assert_eq!(b.value(), &BigUint::from(255u32));
            }
            other => panic!("expected based integer, got {other:?}"),
        }
    }

    #[test]
    fn parses_based_integer_default_base() {
        let mut settings = Settings::default();
        settings.set_base(16).unwrap();
        let obj = parse("#FF", &settings).unwrap();
        assert!(matches!(obj, Object::Based(_)));
    }

    #[test]
    fn parses_text_with_embedded_quote() {
        let obj = parse("\"a\"\"b\"", &s()).unwrap();
        assert_eq!(obj, Object::Text("a\"b".to_string()));
    }

    #[test]
    fn parses_program_of_numbers_and_operators() {
        let obj = parse("\u{ab} 2 3 + \u{bb}", &s()).unwrap();
        match obj {
            Object::Program(p) => assert_eq!(p.len(), 3),
            other => panic!("expected program, got {other:?}"),
        }
    }

    #[test]
    fn parses_list() {
        let obj = parse("{ 1 2 3 }", &s()).unwrap();
        match obj {
            Object::List(l) => assert_eq!(l.len(), 3),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn parses_vector() {
        let obj = parse("[1, 2, 3]", &s()).unwrap();
        match obj {
            Object::Array(a) => assert_eq!(a.shape(), (1, 3)),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn parses_matrix() {
        let obj = parse("[1, 2; 3, 4]", &s()).unwrap();
        match obj {
            Object::Array(a) => assert_eq!(a.shape(), (2, 2)),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn parses_tag() {
        let obj = parse(":x:42", &s()).unwrap();
        match obj {
            Object::Tag(name, value) => {
                assert_eq!(name, "x");
                assert_eq!(*value, Object::Real(Real::Integer(Int::small(42))));
            }
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn parses_rectangular_complex() {
        let obj = parse("3+4\u{2148}", &s()).unwrap();
        assert!(matches!(obj, Object::Complex(Complex::Rectangular { .. })));
    }

    #[test]
    fn parses_polar_complex() {
        let obj = parse("5\u{2221}90", &s()).unwrap();
        assert!(matches!(obj, Object::Complex(Complex::Polar { .. })));
    }

    #[test]
    fn parses_unit_value() {
        let obj = parse("3_m", &s()).unwrap();
        match obj {
            Object::Unit(u) => assert_eq!(u.expr.to_string(), "m"),
            other => panic!("expected unit, got {other:?}"),
        }
    }

    #[test]
    fn parses_expression_literal() {
        let obj = parse("'1 + 2 * 3'", &s()).unwrap();
        match obj {
            Object::Expression(e) => assert_eq!(e.render(), "1 + 2 * 3"),
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn parses_command_word() {
        assert_eq!(parse("DUP", &s()).unwrap(), Object::Command(crate::object::Kind::CmdDup));
    }

    #[test]
    fn parses_symbol_variable() {
        let obj = parse("alpha", &s()).unwrap();
        assert_eq!(obj, Object::Symbol(Symbol::new("alpha").unwrap()));
    }

    #[test]
    fn unterminated_text_is_an_error() {
        assert_eq!(parse("\"abc", &s()).unwrap_err().kind(), &ErrorKind::Unterminated);
    }

    #[test]
    fn trailing_garbage_is_a_syntax_error() {
        assert_eq!(parse("1 2", &s()).unwrap_err().kind(), &ErrorKind::SyntaxError);
    }
}
