//! Byte encoding and decoding for every object kind (§3.1, §4.2, §4.3).
//!
//! Every encoding starts with the kind's varint tag. Payload length is
//! implicit (commands: none), explicit (text/symbol/list-like: a leading
//! varint count), or derivable from the payload itself (numbers: the
//! terminating varint byte; fractions: two concatenated integer
//! encodings) — exactly the three shapes §3.1 names. Containers store
//! their children as complete, self-delimiting nested encodings, which is
//! what lets [`CodecWalker`] expose them to the garbage collector without
//! a second, parallel representation.

use super::kind::Kind;
use super::Object;
use crate::algebra::array::Array;
use crate::algebra::complex::{Complex, Component};
use crate::algebra::list::List;
use crate::algebra::unit::{Unit, UnitExpr};
use crate::error::ErrorKind;
use crate::number::based::Based;
use crate::number::decimal::Decimal;
use crate::number::fraction::Fraction;
use crate::number::integer::Integer;
use crate::number::Real;
use crate::settings::AngleMode;
use crate::symbolic::expression::{Expression, PostfixToken};
use crate::symbolic::program::Program;
use crate::symbolic::symbol::Symbol;
use crate::varint;
use num_bigint::{BigInt, BigUint, Sign};

/// The result of parsing one object starting at byte 0 of the given
/// slice: the decoded value, how many bytes it consumed, and the
/// byte offsets (relative to that same start) of any nested child
/// objects — used verbatim by the GC mark phase (§4.3).
struct Parsed {
    object: Object,
    consumed: usize,
    child_offsets: Vec<usize>,
}

/// Encodes `object` to its self-delimiting byte form.
pub fn encode(object: &Object) -> Vec<u8> {
    let mut out = Vec::new();
    varint::encode(object.kind().tag() as u64, &mut out);
    match object {
        Object::Command(_) => {}
        Object::Real(r) => encode_real(r, &mut out),
        Object::Based(b) => encode_based(b, &mut out),
        Object::Complex(c) => encode_complex(c, &mut out),
        Object::Unit(u) => encode_unit(u, &mut out),
        Object::Symbol(s) => encode_text(s.as_str(), &mut out),
        Object::Text(t) => encode_text(t, &mut out),
        Object::Tag(name, inner) => {
            encode_text(name, &mut out);
            out.extend(encode(inner));
        }
        Object::List(list) => encode_object_seq(list.as_slice(), &mut out),
        Object::Program(program) => encode_object_seq(program.items(), &mut out),
        Object::Array(array) => encode_array(array, &mut out),
        Object::Expression(expr) => encode_expression(expr, &mut out),
    }
    out
}

/// Decodes one object from the start of `bytes`, returning it and the
/// number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(Object, usize), ErrorKind> {
    parse(bytes).map(|p| (p.object, p.consumed))
}

/// Total encoded length of the object starting at byte 0 of `bytes`,
/// without materializing its decoded value (§3.1: "the object knows its
/// own total byte length").
pub fn size_of(bytes: &[u8]) -> Result<usize, ErrorKind> {
    parse(bytes).map(|p| p.consumed)
}

fn parse(bytes: &[u8]) -> Result<Parsed, ErrorKind> {
    let (tag, tag_len) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let kind = kind_from_tag(tag as u16)?;
    let payload = &bytes[tag_len..];
    let mut cursor = tag_len;
    let mut children = Vec::new();

    let object = if kind.is_command() {
        Object::Command(kind)
    } else {
        match kind {
            Kind::Integer | Kind::NegInteger | Kind::Bignum | Kind::NegBignum => {
                let (int, len) = decode_integer(payload, matches!(kind, Kind::NegInteger | Kind::NegBignum))?;
                cursor += len;
                Object::Real(Real::Integer(int))
            }
            Kind::Fraction | Kind::NegFraction | Kind::BigFraction | Kind::NegBigFraction => {
                let negative = matches!(kind, Kind::NegFraction | Kind::NegBigFraction);
                let (n, n_len) = decode_integer(payload, negative)?;
                let (d, d_len) = decode_integer(&payload[n_len..], false)?;
                cursor += n_len + d_len;
                let f = Fraction::new(n.to_bigint(), d.to_bigint()).ok_or(ErrorKind::InternalError)?;
                Object::Real(Real::Fraction(f))
            }
            Kind::Decimal => {
                let (decimal, len) = decode_decimal(payload)?;
                cursor += len;
                Object::Real(Real::Decimal(decimal))
            }
            Kind::BasedInteger => {
                let (based, len) = decode_based(payload)?;
                cursor += len;
                Object::Based(based)
            }
            Kind::ComplexRect | Kind::ComplexPolar => {
                let start = cursor;
                let (complex, len, mut kids) = decode_complex(payload, kind)?;
                cursor += len;
                for k in kids.iter_mut() {
                    *k += start;
                }
                children = kids;
                Object::Complex(complex)
            }
            Kind::Unit => {
                let start = cursor;
                let (unit, len) = decode_unit(payload)?;
                cursor += len;
                children.push(start);
                Object::Unit(unit)
            }
            Kind::Symbol => {
                let (s, len) = decode_text(payload)?;
                cursor += len;
                Object::Symbol(Symbol::new(s)?)
            }
            Kind::Text => {
                let (s, len) = decode_text(payload)?;
                cursor += len;
                Object::Text(s)
            }
            Kind::Tag => {
                let (name, name_len) = decode_text(payload)?;
                let child_start = cursor + name_len;
                let (inner, inner_len) = decode(&payload[name_len..])?;
                cursor += name_len + inner_len;
                children.push(child_start);
                Object::Tag(name, Box::new(inner))
            }
            Kind::List | Kind::Program => {
                let start = cursor;
                let (items, len, mut kids) = decode_object_seq(payload)?;
                cursor += len;
                for k in kids.iter_mut() {
                    *k += start;
                }
                children = kids;
                if kind == Kind::List {
                    Object::List(List::new(items))
                } else {
                    Object::Program(Program::new(items))
                }
            }
            Kind::Array => {
                let start = cursor;
                let (array, len, mut kids) = decode_array(payload)?;
                cursor += len;
                for k in kids.iter_mut() {
                    *k += start;
                }
                children = kids;
                Object::Array(array)
            }
            Kind::Expression => {
                let (expr, len) = decode_expression(payload)?;
                cursor += len;
                Object::Expression(expr)
            }
            Kind::Directory | Kind::Grob | Kind::Font => return Err(ErrorKind::InternalError),
            _ => unreachable!("command kinds are handled above"),
        }
    };

    Ok(Parsed { object, consumed: cursor, child_offsets: children })
}

fn kind_from_tag(tag: u16) -> Result<Kind, ErrorKind> {
    use strum::IntoEnumIterator;
    Kind::iter().find(|k| k.tag() == tag).ok_or(ErrorKind::InternalError)
}

fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

fn encode_integer(i: &Integer, out: &mut Vec<u8>) {
    let magnitude = i.to_bigint().magnitude().clone();
    let bytes = magnitude.to_bytes_be();
    varint::encode(bytes.len() as u64, out);
    out.extend(bytes);
}

fn decode_integer(bytes: &[u8], negative: bool) -> Result<(Integer, usize), ErrorKind> {
    let (len, len_bytes) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let len = len as usize;
    let magnitude_bytes = &bytes[len_bytes..len_bytes + len];
    let mut magnitude = BigInt::from_bytes_be(Sign::Plus, magnitude_bytes);
    if negative {
        magnitude = -magnitude;
    }
    Ok((Integer::from_bigint(magnitude), len_bytes + len))
}

fn encode_real(r: &Real, out: &mut Vec<u8>) {
    match r {
        Real::Integer(i) => encode_integer(i, out),
        Real::Fraction(f) => {
            encode_integer(&Integer::from_bigint(f.numerator().clone()), out);
            encode_integer(&Integer::from_bigint(f.denominator().clone()), out);
        }
        Real::Decimal(d) => encode_decimal(d, out),
    }
}

fn encode_decimal(d: &Decimal, out: &mut Vec<u8>) {
    let (negative, mantissa, exponent) = d.parts();
    out.push(negative as u8);
    varint::encode(zigzag_encode(exponent), out);
    let bytes = mantissa.to_bytes_be();
    varint::encode(bytes.len() as u64, out);
    out.extend(bytes);
}

fn decode_decimal(bytes: &[u8]) -> Result<(Decimal, usize), ErrorKind> {
    let negative = bytes[0] != 0;
    let mut cursor = 1;
    let (exp_zigzag, exp_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
    cursor += exp_len;
    let exponent = zigzag_decode(exp_zigzag);
    let (mantissa_len, ml_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
    cursor += ml_len;
    let mantissa_len = mantissa_len as usize;
    let mantissa = BigUint::from_bytes_be(&bytes[cursor..cursor + mantissa_len]);
    cursor += mantissa_len;
    // `precision` here only bounds re-rounding on reconstruction; the
    // serialized digits are already the rounded, canonical form.
    let precision = mantissa.to_string().len().max(1);
    Ok((Decimal::from_parts(negative, mantissa, exponent, precision), cursor))
}

/// `word_size`, `base`, then the magnitude as a length-prefixed big-endian
/// byte string, mirroring [`encode_integer`]'s shape.
fn encode_based(b: &Based, out: &mut Vec<u8>) {
    varint::encode(b.word_size() as u64, out);
    varint::encode(b.base() as u64, out);
    let bytes = b.value().to_bytes_be();
    varint::encode(bytes.len() as u64, out);
    out.extend(bytes);
}

fn decode_based(bytes: &[u8]) -> Result<(Based, usize), ErrorKind> {
    let (word_size, ws_len) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let mut cursor = ws_len;
    let (base, base_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
    cursor += base_len;
    let (mag_len, ml_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
    cursor += ml_len;
    let mag_len = mag_len as usize;
    let value = BigUint::from_bytes_be(&bytes[cursor..cursor + mag_len]);
    cursor += mag_len;
    Ok((Based::new(value, word_size as u32, base as u32), cursor))
}

fn encode_text(s: &str, out: &mut Vec<u8>) {
    let bytes = s.as_bytes();
    varint::encode(bytes.len() as u64, out);
    out.extend(bytes);
}

fn decode_text(bytes: &[u8]) -> Result<(String, usize), ErrorKind> {
    let (len, len_bytes) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let len = len as usize;
    let s = std::str::from_utf8(&bytes[len_bytes..len_bytes + len])
        .map_err(|_| ErrorKind::InternalError)?
        .to_string();
    Ok((s, len_bytes + len))
}

fn encode_object_seq(items: &[Object], out: &mut Vec<u8>) {
    varint::encode(items.len() as u64, out);
    for item in items {
        out.extend(encode(item));
    }
}

fn decode_object_seq(bytes: &[u8]) -> Result<(Vec<Object>, usize, Vec<usize>), ErrorKind> {
    let (count, mut cursor) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let mut items = Vec::with_capacity(count as usize);
    let mut offsets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        offsets.push(cursor);
        let (obj, len) = decode(&bytes[cursor..])?;
        cursor += len;
        items.push(obj);
    }
    Ok((items, cursor, offsets))
}

fn decode_real_component(bytes: &[u8]) -> Result<(Component, usize), ErrorKind> {
    if bytes[0] == 1 {
        let (s, len) = decode_text(&bytes[1..])?;
        return Ok((Component::Symbol(Symbol::new(s)?), 1 + len));
    }
    let (obj, len) = decode(&bytes[1..])?;
    match obj {
        Object::Real(r) => Ok((Component::Real(r), 1 + len)),
        _ => Err(ErrorKind::InternalError),
    }
}

fn encode_complex(c: &Complex, out: &mut Vec<u8>) {
    match c {
        Complex::Rectangular { real, imag } => {
            encode_component_tagged(real, out);
            encode_component_tagged(imag, out);
        }
        Complex::Polar { modulus, argument, angle_unit } => {
            encode_component_tagged(modulus, out);
            encode_component_tagged(argument, out);
            out.push(angle_mode_tag(*angle_unit));
        }
    }
}

/// Encodes a component as `0 + full Real-object encoding` or
/// `1 + symbol text`, making it self-delimiting the same way every other
/// object is (used so [`decode_real_component`] can reuse the generic
/// object decoder for the `Real` case).
fn encode_component_tagged(c: &Component, out: &mut Vec<u8>) {
    match c {
        Component::Real(r) => {
            out.push(0);
            out.extend(encode(&Object::Real(r.clone())));
        }
        Component::Symbol(s) => {
            out.push(1);
            encode_text(s.as_str(), out);
        }
    }
}

fn angle_mode_tag(mode: AngleMode) -> u8 {
    match mode {
        AngleMode::Degrees => 0,
        AngleMode::Radians => 1,
        AngleMode::Grads => 2,
        AngleMode::PiRadians => 3,
    }
}

fn angle_mode_from_tag(tag: u8) -> Result<AngleMode, ErrorKind> {
    match tag {
        0 => Ok(AngleMode::Degrees),
        1 => Ok(AngleMode::Radians),
        2 => Ok(AngleMode::Grads),
        3 => Ok(AngleMode::PiRadians),
        _ => Err(ErrorKind::InternalError),
    }
}

fn decode_complex(bytes: &[u8], kind: Kind) -> Result<(Complex, usize, Vec<usize>), ErrorKind> {
    let (real, real_len) = decode_real_component(bytes)?;
    let (imag, imag_len) = decode_real_component(&bytes[real_len..])?;
    let mut cursor = real_len + imag_len;
    // A component is only a GC-walkable child when it's a nested `Real`
    // object (discriminant 0); a `Symbol` component is inline text with
    // no heap tag of its own.
    let mut children = Vec::new();
    if bytes[0] == 0 {
        children.push(1);
    }
    if bytes[real_len] == 0 {
        children.push(1 + real_len);
    }
    if kind == Kind::ComplexRect {
        Ok((Complex::Rectangular { real, imag }, cursor, children))
    } else {
        let angle_unit = angle_mode_from_tag(bytes[cursor])?;
        cursor += 1;
        Ok((
            Complex::Polar { modulus: real, argument: imag, angle_unit },
            cursor,
            children,
        ))
    }
}

fn encode_unit(u: &Unit, out: &mut Vec<u8>) {
    out.extend(encode(&Object::Real(u.magnitude.clone())));
    let terms = u.expr.terms();
    varint::encode(terms.len() as u64, out);
    for (name, exp) in terms {
        encode_text(name, out);
        varint::encode(zigzag_encode(*exp as i64), out);
    }
}

fn decode_unit(bytes: &[u8]) -> Result<(Unit, usize), ErrorKind> {
    let (magnitude_obj, mag_len) = decode(bytes)?;
    let magnitude = match magnitude_obj {
        Object::Real(r) => r,
        _ => return Err(ErrorKind::InternalError),
    };
    let mut cursor = mag_len;
    let (count, count_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
    cursor += count_len;
    let mut terms = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (name, name_len) = decode_text(&bytes[cursor..])?;
        cursor += name_len;
        let (exp_zigzag, exp_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
        cursor += exp_len;
        terms.push((name, zigzag_decode(exp_zigzag) as i32));
    }
    Ok((Unit { magnitude, expr: UnitExpr::from_terms(terms) }, cursor))
}

fn encode_array(a: &Array, out: &mut Vec<u8>) {
    let (rows, cols) = a.shape();
    varint::encode(rows as u64, out);
    varint::encode(cols as u64, out);
    for v in a.data() {
        out.extend(encode(&Object::Real(v.clone())));
    }
}

fn decode_array(bytes: &[u8]) -> Result<(Array, usize, Vec<usize>), ErrorKind> {
    let (rows, r_len) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let (cols, c_len) = varint::decode(&bytes[r_len..]).map_err(|_| ErrorKind::InternalError)?;
    let mut cursor = r_len + c_len;
    let total = (rows * cols) as usize;
    let mut data = Vec::with_capacity(total);
    let mut offsets = Vec::with_capacity(total);
    for _ in 0..total {
        offsets.push(cursor);
        let (obj, len) = decode(&bytes[cursor..])?;
        cursor += len;
        match obj {
            Object::Real(r) => data.push(r),
            _ => return Err(ErrorKind::InternalError),
        }
    }
    let array = Array::matrix(rows as usize, cols as usize, data)?;
    Ok((array, cursor, offsets))
}

fn encode_expression(expr: &Expression, out: &mut Vec<u8>) {
    let tokens = expr.tokens();
    varint::encode(tokens.len() as u64, out);
    for tok in tokens {
        match tok {
            PostfixToken::Number(n) => {
                out.push(0);
                out.extend(encode(&Object::Real(n.clone())));
            }
            PostfixToken::Symbol(s) => {
                out.push(1);
                encode_text(s.as_str(), out);
            }
            PostfixToken::Apply(op, arity) => {
                out.push(2);
                encode_text(op.as_str(), out);
                varint::encode(*arity as u64, out);
            }
        }
    }
}

fn decode_expression(bytes: &[u8]) -> Result<(Expression, usize), ErrorKind> {
    let (count, mut cursor) = varint::decode(bytes).map_err(|_| ErrorKind::InternalError)?;
    let mut tokens = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let discriminant = bytes[cursor];
        cursor += 1;
        match discriminant {
            0 => {
                let (obj, len) = decode(&bytes[cursor..])?;
                cursor += len;
                match obj {
                    Object::Real(r) => tokens.push(PostfixToken::Number(r)),
                    _ => return Err(ErrorKind::InternalError),
                }
            }
            1 => {
                let (s, len) = decode_text(&bytes[cursor..])?;
                cursor += len;
                tokens.push(PostfixToken::Symbol(Symbol::new(s)?));
            }
            2 => {
                let (name, name_len) = decode_text(&bytes[cursor..])?;
                cursor += name_len;
                let (arity, arity_len) = varint::decode(&bytes[cursor..]).map_err(|_| ErrorKind::InternalError)?;
                cursor += arity_len;
                tokens.push(PostfixToken::Apply(Symbol::new(name)?, arity as usize));
            }
            _ => return Err(ErrorKind::InternalError),
        }
    }
    let tree_tokens = tokens;
    let expr = Expression::from_tree(&rebuild_from_tokens(&tree_tokens));
    Ok((expr, cursor))
}

fn rebuild_from_tokens(tokens: &[PostfixToken]) -> crate::symbolic::expression::ExprNode {
    use crate::symbolic::expression::ExprNode;
    let mut stack: Vec<ExprNode> = Vec::new();
    for tok in tokens {
        match tok {
            PostfixToken::Number(n) => stack.push(ExprNode::Number(n.clone())),
            PostfixToken::Symbol(s) => stack.push(ExprNode::Symbol(s.clone())),
            PostfixToken::Apply(op, arity) => {
                let at = stack.len() - arity;
                let args = stack.split_off(at);
                stack.push(ExprNode::Apply(op.clone(), args));
            }
        }
    }
    stack.pop().expect("a well-formed postfix stream reduces to one node")
}

/// Bridges the heap to the GC (§4.3), reading object structure straight
/// out of heap bytes rather than a parallel index.
pub struct CodecWalker;

impl crate::heap::gc::ObjectWalker for CodecWalker {
    fn size_at(&self, heap: &crate::heap::Heap, offset: usize) -> usize {
        size_of(heap.read_tail(offset)).expect("heap objects are always well-formed")
    }

    fn children_at(&self, heap: &crate::heap::Heap, offset: usize) -> Vec<usize> {
        let bytes = heap.read_tail(offset);
        let parsed = parse(bytes).expect("heap objects are always well-formed");
        parsed.child_offsets.into_iter().map(|c| c + offset).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;

    #[test]
    fn integer_round_trips() {
        let obj = Object::Real(Real::Integer(Integer::small(-42)));
        let bytes = encode(&obj);
        let (decoded, len) = decode(&bytes).unwrap();
        assert_eq!(decoded, obj);
        assert_eq!(len, bytes.len());
    }

    #[test]
    fn fraction_round_trips() {
        let f = Fraction::new(BigInt::from(3), BigInt::from(4)).unwrap();
        let obj = Object::Real(Real::Fraction(f));
        let bytes = encode(&obj);
        let (decoded, _) = decode(&bytes).unwrap();
        assert_eq!(decoded, obj);
    }

    #[test]
    fn symbol_and_text_round_trip() {
        let sym = Object::Symbol(Symbol::new("alpha").unwrap());
        let text = Object::Text("hello world".to_string());
        for obj in [sym, text] {
            let bytes = encode(&obj);
            let (decoded, len) = decode(&bytes).unwrap();
            assert_eq!(decoded, obj);
            assert_eq!(len, bytes.len());
        }
    }

    #[test]
    fn list_round_trips_and_exposes_children() {
        let items = vec![
            Object::Real(Real::Integer(Integer::small(1))),
            Object::Real(Real::Integer(Integer::small(2))),
        ];
        let obj = Object::List(List::new(items));
        let bytes = encode(&obj);
        let (decoded, len) = decode(&bytes).unwrap();
        assert_eq!(decoded, obj);
        assert_eq!(len, bytes.len());

        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed.child_offsets.len(), 2);
    }

    #[test]
    fn complex_round_trips() {
        let obj = Object::Complex(Complex::Rectangular {
            real: Component::Real(Real::Integer(Integer::small(1))),
            imag: Component::Real(Real::Integer(Integer::small(2))),
        });
        let bytes = encode(&obj);
        let (decoded, _) = decode(&bytes).unwrap();
        assert_eq!(decoded, obj);
    }

    #[test]
    fn based_integer_round_trips() {
        let obj = Object::Based(Based::new(BigUint::from(0xffu32), 8, 16));
        let bytes = encode(&obj);
        let (decoded, len) = decode(&bytes).unwrap();
        assert_eq!(decoded, obj);
        assert_eq!(len, bytes.len());
    }

    #[test]
    fn size_of_matches_decode_consumed_length() {
        let obj = Object::Real(Real::Integer(Integer::small(12345)));
        let bytes = encode(&obj);
        let mut padded = bytes.clone();
        padded.extend([0xAA, 0xBB, 0xCC]);
        assert_eq!(size_of(&padded).unwrap(), bytes.len());
    }
}
