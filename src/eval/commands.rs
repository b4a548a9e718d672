//! Command handlers invoked by the evaluator's step 3 (§4.7.2).
//!
//! The dispatch table (`object::dispatch`) only records a command's name,
//! arity and precedence; the actual stack effects live here, matched on
//! `Kind`, since several commands (`DUP`, `OVER`, `ROT`, `SWAP`) rearrange
//! the stack rather than consuming-then-producing a fixed arity the generic
//! "pop N, call, push results" shape can't express uniformly.

use crate::algebra::array::{self, Array};
use crate::algebra::complex::{self, Complex, ComplexOrReal};
use crate::algebra::list::List;
use crate::algebra::unit::{self, Unit};
use crate::error::{Error, ErrorKind, RuntimeError};
use crate::number::{promote, Real};
use crate::object::{Kind, Object};
use crate::settings::Settings;
use crate::symbolic::expression::Expression;
use crate::symbolic::rewrite;
use crate::symbolic::symbol::Symbol;

use super::context::VariableStore;
use super::evaluator::Evaluator;

fn err(kind: ErrorKind) -> RuntimeError {
    RuntimeError::Recoverable(Error::new(kind))
}

fn as_real(o: &Object) -> Result<&Real, RuntimeError> {
    match o {
        Object::Real(r) => Ok(r),
        _ => Err(err(ErrorKind::BadArgumentType)),
    }
}

fn as_complex(o: Object) -> Result<Complex, RuntimeError> {
    match o {
        Object::Complex(c) => Ok(c),
        Object::Real(r) => Ok(Complex::Rectangular {
            real: complex::Component::Real(r),
            imag: complex::Component::Real(Real::Integer(crate::number::integer::Integer::small(0))),
        }),
        _ => Err(err(ErrorKind::BadArgumentType)),
    }
}

fn push_complex_or_real(evaluator: &mut Evaluator, r: ComplexOrReal) {
    match r {
        ComplexOrReal::Real(v) => evaluator.stack.push(Object::Real(v)),
        ComplexOrReal::Complex(c) => evaluator.stack.push(Object::Complex(c)),
    }
}

/// `a OP b` across the numeric kinds that support it: real, complex, unit,
/// array. Mixed real/complex operands widen the real side to a zero-
/// imaginary complex; other kind combinations are `BadArgumentType`.
fn numeric_binary(
    evaluator: &mut Evaluator,
    real_op: impl Fn(&Real, &Real, &Settings) -> Real,
    complex_op: impl Fn(&Complex, &Complex, &Settings) -> ComplexOrReal,
    unit_op: impl Fn(&Unit, &Unit, &Settings) -> Result<Unit, ErrorKind>,
    array_op: impl Fn(&Array, &Array, &Settings) -> Result<Array, ErrorKind>,
) -> Result<(), RuntimeError> {
    let b = evaluator.stack.pop()?;
    let a = evaluator.stack.pop()?;
    match (&a, &b) {
        (Object::Real(x), Object::Real(y)) => {
            evaluator.stack.push(Object::Real(real_op(x, y, &evaluator.settings)));
        }
        (Object::Complex(_), _) | (_, Object::Complex(_)) => {
            let result = complex_op(&as_complex(a)?, &as_complex(b)?, &evaluator.settings);
            push_complex_or_real(evaluator, result);
        }
        (Object::Unit(x), Object::Unit(y)) => {
            let r = unit_op(x, y, &evaluator.settings).map_err(err)?;
            evaluator.stack.push(Object::Unit(r));
        }
        (Object::Array(x), Object::Array(y)) => {
            let r = array_op(x, y, &evaluator.settings).map_err(err)?;
            evaluator.stack.push(Object::Array(r));
        }
        _ => return Err(err(ErrorKind::BadArgumentType)),
    }
    Ok(())
}

fn numeric_binary_fallible(
    evaluator: &mut Evaluator,
    real_op: impl Fn(&Real, &Real, &Settings) -> Result<Real, ErrorKind>,
    complex_op: impl Fn(&Complex, &Complex, &Settings) -> Result<ComplexOrReal, ErrorKind>,
    unit_op: impl Fn(&Unit, &Unit, &Settings) -> Result<Unit, ErrorKind>,
    array_op: impl Fn(&Array, &Array, &Settings) -> Result<Array, ErrorKind>,
) -> Result<(), RuntimeError> {
    let b = evaluator.stack.pop()?;
    let a = evaluator.stack.pop()?;
    match (&a, &b) {
        (Object::Real(x), Object::Real(y)) => {
            let r = real_op(x, y, &evaluator.settings).map_err(err)?;
            evaluator.stack.push(Object::Real(r));
        }
        (Object::Complex(_), _) | (_, Object::Complex(_)) => {
            let result = complex_op(&as_complex(a)?, &as_complex(b)?, &evaluator.settings).map_err(err)?;
            push_complex_or_real(evaluator, result);
        }
        (Object::Unit(x), Object::Unit(y)) => {
            let r = unit_op(x, y, &evaluator.settings).map_err(err)?;
            evaluator.stack.push(Object::Unit(r));
        }
        (Object::Array(x), Object::Array(y)) => {
            let r = array_op(x, y, &evaluator.settings).map_err(err)?;
            evaluator.stack.push(Object::Array(r));
        }
        _ => return Err(err(ErrorKind::BadArgumentType)),
    }
    Ok(())
}

fn float_round_trip(evaluator: &mut Evaluator, f: impl Fn(f64) -> f64) -> Result<(), RuntimeError> {
    let a = evaluator.stack.pop()?;
    let r = as_real(&a)?;
    let p = evaluator.settings.precision();
    let v = f(r.to_decimal(p).to_f64_lossy());
    evaluator
        .stack
        .push(Object::Real(Real::Decimal(crate::number::decimal::Decimal::from_f64(v, p))));
    Ok(())
}

/// `ASIN`/`ACOS`/`ATAN`: the raw `f64` inverse trig functions return
/// radians, which this converts into the current `AngleMode` before
/// pushing (§4.4.3). When `SetAngleUnits` is on, the result carries the
/// angle unit as a tag.
fn inverse_trig(evaluator: &mut Evaluator, f: impl Fn(f64) -> f64) -> Result<(), RuntimeError> {
    let a = evaluator.stack.pop()?;
    let r = as_real(&a)?;
    let p = evaluator.settings.precision();
    let radians = f(r.to_decimal(p).to_f64_lossy());
    let mode = evaluator.settings.angle_mode();
    let v = crate::number::trig::from_radians(radians, mode);
    let result = Object::Real(Real::Decimal(crate::number::decimal::Decimal::from_f64(v, p)));
    if evaluator.settings.set_angle_units() {
        let name = crate::number::trig::angle_unit_name(mode).to_string();
        evaluator.stack.push(Object::Tag(name, Box::new(result)));
    } else {
        evaluator.stack.push(result);
    }
    Ok(())
}

fn pop_symbol(evaluator: &mut Evaluator) -> Result<Symbol, RuntimeError> {
    match evaluator.stack.pop()? {
        Object::Symbol(s) => Ok(s),
        _ => Err(err(ErrorKind::BadArgumentType)),
    }
}

fn pop_flag_index(evaluator: &mut Evaluator) -> Result<usize, RuntimeError> {
    let o = evaluator.stack.pop()?;
    match as_real(&o)? {
        Real::Integer(crate::number::integer::Integer::Small(v)) if *v >= 0 => Ok(*v as usize),
        _ => Err(err(ErrorKind::BadArgumentValue)),
    }
}

fn bool_object(v: bool) -> Object {
    Object::Real(Real::Integer(crate::number::integer::Integer::small(if v { 1 } else { 0 })))
}

fn as_bool(o: &Object) -> Result<bool, RuntimeError> {
    Ok(!as_real(o)?.is_zero())
}

/// Runs `kind` against `evaluator`'s stack and directory, per §4.7.2 step 3.
pub fn execute(
    kind: Kind,
    evaluator: &mut Evaluator,
    vars: &mut dyn VariableStore,
) -> Result<(), RuntimeError> {
    match kind {
        Kind::CmdAdd => numeric_binary(evaluator, promote::add, complex::add, unit::add, array::add),
        Kind::CmdSub => numeric_binary(evaluator, promote::sub, complex::sub, unit::sub, array::sub),
        Kind::CmdMul => numeric_binary(evaluator, promote::mul, complex::mul, |a, b, s| Ok(unit::mul(a, b, s)), array::mul_elementwise),
        Kind::CmdDiv => numeric_binary_fallible(evaluator, promote::div, complex::div, unit::div, array::div_elementwise),
        Kind::CmdMod => numeric_binary_fallible(
            evaluator,
            promote::modulo,
            |_, _, _| Err(ErrorKind::UndefinedOperation),
            |_, _, _| Err(ErrorKind::UndefinedOperation),
            |_, _, _| Err(ErrorKind::UndefinedOperation),
        ),
        Kind::CmdRem => numeric_binary_fallible(
            evaluator,
            promote::remainder,
            |_, _, _| Err(ErrorKind::UndefinedOperation),
            |_, _, _| Err(ErrorKind::UndefinedOperation),
            |_, _, _| Err(ErrorKind::UndefinedOperation),
        ),
        Kind::CmdPow => {
            let b = evaluator.stack.pop()?;
            let a = evaluator.stack.pop()?;
            let r = promote::pow(as_real(&a)?, as_real(&b)?, &evaluator.settings).map_err(err)?;
            evaluator.stack.push(Object::Real(r));
            Ok(())
        }
        Kind::CmdNeg => {
            let a = evaluator.stack.pop()?;
            match a {
                Object::Real(r) => {
                    let zero = Real::Integer(crate::number::integer::Integer::small(0));
                    evaluator.stack.push(Object::Real(promote::sub(&zero, &r, &evaluator.settings)));
                }
                Object::Complex(c) => {
                    let zero = Complex::Rectangular {
                        real: complex::Component::Real(Real::Integer(crate::number::integer::Integer::small(0))),
                        imag: complex::Component::Real(Real::Integer(crate::number::integer::Integer::small(0))),
                    };
                    push_complex_or_real(evaluator, complex::sub(&zero, &c, &evaluator.settings));
                }
                _ => return Err(err(ErrorKind::BadArgumentType)),
            }
            Ok(())
        }
        Kind::CmdInv => {
            let a = evaluator.stack.pop()?;
            let one = Real::Integer(crate::number::integer::Integer::small(1));
            match a {
                Object::Real(r) => {
                    let result = promote::div(&one, &r, &evaluator.settings).map_err(err)?;
                    evaluator.stack.push(Object::Real(result));
                }
                _ => return Err(err(ErrorKind::BadArgumentType)),
            }
            Ok(())
        }
        Kind::CmdSin => trig(evaluator, crate::number::trig::Function::Sin),
        Kind::CmdCos => trig(evaluator, crate::number::trig::Function::Cos),
        Kind::CmdTan => trig(evaluator, crate::number::trig::Function::Tan),
        Kind::CmdAsin => inverse_trig(evaluator, f64::asin),
        Kind::CmdAcos => inverse_trig(evaluator, f64::acos),
        Kind::CmdAtan => inverse_trig(evaluator, f64::atan),
        Kind::CmdExp => float_round_trip(evaluator, f64::exp),
        Kind::CmdLn => float_round_trip(evaluator, f64::ln),
        Kind::CmdSqrt => float_round_trip(evaluator, f64::sqrt),
        Kind::CmdToNum => {
            let a = evaluator.stack.pop()?;
            let r = as_real(&a)?;
            let p = evaluator.settings.precision();
            evaluator.stack.push(Object::Real(Real::Decimal(r.to_decimal(p))));
            Ok(())
        }
        Kind::CmdToQ | Kind::CmdToFraction => {
            let a = evaluator.stack.pop()?;
            let r = as_real(&a)?;
            match r {
                Real::Decimal(d) => {
                    let f = crate::number::fraction::from_decimal(d, evaluator.settings.max_denominator())
                        .ok_or_else(|| err(ErrorKind::BadArgumentValue))?;
                    evaluator.stack.push(Object::Real(Real::Fraction(f)));
                }
                other => evaluator.stack.push(Object::Real(other.clone())),
            }
            Ok(())
        }
        Kind::CmdDup => {
            let a = evaluator.stack.top()?.clone();
            evaluator.stack.push(a);
            Ok(())
        }
        Kind::CmdDrop => {
            evaluator.stack.pop()?;
            Ok(())
        }
        Kind::CmdSwap => {
            let a = evaluator.stack.pop()?;
            let b = evaluator.stack.pop()?;
            evaluator.stack.push(a);
            evaluator.stack.push(b);
            Ok(())
        }
        Kind::CmdOver => {
            let v = evaluator.stack.stack(2)?.clone();
            evaluator.stack.push(v);
            Ok(())
        }
        Kind::CmdRot => {
            let c = evaluator.stack.pop()?;
            let b = evaluator.stack.pop()?;
            let a = evaluator.stack.pop()?;
            evaluator.stack.push(b);
            evaluator.stack.push(c);
            evaluator.stack.push(a);
            Ok(())
        }
        Kind::CmdEval => {
            let a = evaluator.stack.pop()?;
            match a {
                // EVAL forces numeric reduction of an expression (§4.7.2
                // case 5); plain evaluation just pushes it back unchanged.
                Object::Expression(e) => {
                    let reduced = evaluator.reduce_expression(&e.to_tree(), &*vars);
                    evaluator.stack.push(Object::Expression(Expression::from_tree(&reduced)));
                    Ok(())
                }
                other => evaluator.evaluate(other, vars),
            }
        }
        Kind::CmdSto => {
            let name = pop_symbol(evaluator)?;
            let value = evaluator.stack.pop()?;
            let path = evaluator.context.path();
            vars.store(&path, name, value).map_err(err)
        }
        Kind::CmdRcl => {
            let name = pop_symbol(evaluator)?;
            let path = evaluator.context.path();
            let value = vars.lookup(&path, &name).ok_or_else(|| err(ErrorKind::UndefinedName))?;
            evaluator.stack.push(value);
            Ok(())
        }
        Kind::CmdPurge => {
            let name = pop_symbol(evaluator)?;
            let path = evaluator.context.path();
            vars.purge(&path, &name).map_err(err)?;
            Ok(())
        }
        Kind::CmdHome => {
            evaluator.context.home();
            Ok(())
        }
        Kind::CmdUpDir => {
            evaluator.context.up_dir();
            Ok(())
        }
        Kind::CmdPath => {
            let items = evaluator
                .context
                .path()
                .into_iter()
                .map(|n| Symbol::new(n).map(Object::Symbol))
                .collect::<Result<Vec<_>, _>>()
                .map_err(err)?;
            evaluator.stack.push(Object::List(List::new(items)));
            Ok(())
        }
        Kind::CmdSf => {
            let n = pop_flag_index(evaluator)?;
            evaluator.flags.set(n);
            Ok(())
        }
        Kind::CmdCf => {
            let n = pop_flag_index(evaluator)?;
            evaluator.flags.clear(n);
            Ok(())
        }
        Kind::CmdFsq => {
            let n = pop_flag_index(evaluator)?;
            let v = evaluator.flags.is_set(n);
            evaluator.stack.push(bool_object(v));
            Ok(())
        }
        Kind::CmdFcq => {
            let n = pop_flag_index(evaluator)?;
            let v = !evaluator.flags.is_set(n);
            evaluator.stack.push(bool_object(v));
            Ok(())
        }
        Kind::CmdFsqc => {
            let n = pop_flag_index(evaluator)?;
            let v = evaluator.flags.test_and_clear(n);
            evaluator.stack.push(bool_object(v));
            Ok(())
        }
        Kind::CmdFcqc => {
            let n = pop_flag_index(evaluator)?;
            let v = evaluator.flags.test_clear_and_clear(n);
            evaluator.stack.push(bool_object(v));
            Ok(())
        }
        Kind::CmdStof => {
            let lo = pop_flag_index(evaluator)?;
            let values = evaluator.stack.pop()?;
            let bits = match values {
                Object::List(list) => list.as_slice().iter().map(as_bool).collect::<Result<Vec<_>, _>>()?,
                other => vec![as_bool(&other)?],
            };
            evaluator.flags.store(lo, &bits);
            Ok(())
        }
        Kind::CmdRclf => {
            let count = pop_flag_index(evaluator)?;
            let lo = pop_flag_index(evaluator)?;
            let bits = evaluator.flags.recall(lo, count);
            evaluator.stack.push(Object::List(List::new(bits.into_iter().map(bool_object).collect())));
            Ok(())
        }
        Kind::CmdErrm => {
            let text = evaluator.last_error.as_ref().map(|e| e.message()).unwrap_or_default();
            evaluator.stack.push(Object::Text(text));
            Ok(())
        }
        Kind::CmdErrn => {
            let code = evaluator
                .last_error
                .as_ref()
                .map(error_code)
                .unwrap_or(0);
            evaluator.stack.push(Object::Real(Real::Integer(crate::number::integer::Integer::small(code))));
            Ok(())
        }
        Kind::CmdErr0 => {
            evaluator.last_error = None;
            Ok(())
        }
        Kind::CmdDoerr => {
            let a = evaluator.stack.pop()?;
            let message = match a {
                Object::Text(s) => s,
                other => format!("{other:?}"),
            };
            Err(err(ErrorKind::UserDefined(message)))
        }
        Kind::CmdExpand | Kind::CmdCollect | Kind::CmdSimplify => {
            let a = evaluator.stack.pop()?;
            let expr = match a {
                Object::Expression(e) => e,
                _ => return Err(err(ErrorKind::BadArgumentType)),
            };
            let tree = expr.to_tree();
            let rewritten = match kind {
                Kind::CmdExpand => rewrite::expand(&tree),
                Kind::CmdCollect => rewrite::collect(&tree),
                _ => rewrite::simplify(&tree, 8),
            };
            evaluator.stack.push(Object::Expression(Expression::from_tree(&rewritten)));
            Ok(())
        }
        Kind::CmdMap => {
            let mapper = evaluator.stack.pop()?;
            let target = evaluator.stack.pop()?;
            let list = match target {
                Object::List(l) => l,
                _ => return Err(err(ErrorKind::BadArgumentType)),
            };
            let mut mapped = Vec::with_capacity(list.len());
            for item in list.as_slice() {
                evaluator.stack.push(item.clone());
                evaluator.evaluate(mapper.clone(), vars)?;
                mapped.push(evaluator.stack.pop()?);
            }
            evaluator.stack.push(Object::List(List::new(mapped)));
            Ok(())
        }
        Kind::CmdIfErr => {
            let catch = evaluator.stack.pop()?;
            let try_body = evaluator.stack.pop()?;
            match evaluator.evaluate(try_body, vars) {
                Ok(()) => Ok(()),
                Err(e) if e.is_catchable_by_plain_iferr() => {
                    evaluator.last_error = e.as_error().cloned();
                    evaluator.evaluate(catch, vars)
                }
                Err(e) => Err(e),
            }
        }
        _ => Err(err(ErrorKind::UndefinedOperation)),
    }
}

fn trig(evaluator: &mut Evaluator, f: crate::number::trig::Function) -> Result<(), RuntimeError> {
    let a = evaluator.stack.pop()?;
    let r = as_real(&a)?;
    let result = crate::number::trig::evaluate(f, r, &evaluator.settings);
    evaluator.stack.push(Object::Real(result));
    Ok(())
}

/// An error kind's position in its own enumeration, used for `errn`'s
/// numeric code. Stable only within a build, like the reference `errn`.
fn error_code(e: &Error) -> i64 {
    use strum::IntoEnumIterator;
    ErrorKind::iter().position(|k| &k == e.kind()).unwrap_or(0) as i64
}
