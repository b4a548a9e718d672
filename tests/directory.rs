//! Nested directories and variable resolution (C8, §4.8), and the
//! evaluator's use of them for `STO`/`RCL`-style symbol lookup (C7).

use db48x::eval::VariableStore;
use db48x::number::integer::Integer;
use db48x::object::{Kind, Object};
use db48x::symbolic::symbol::Symbol;
use db48x::{Directory, Evaluator};

fn sym(s: &str) -> Symbol {
    Symbol::new(s).unwrap()
}

fn int(v: i64) -> Object {
    Object::Real(db48x::number::Real::Integer(Integer::small(v)))
}

#[test]
fn store_creates_missing_subdirectories_along_the_path() {
    let mut dir = Directory::new();
    let path = vec!["HOME".to_string(), "SUB".to_string()];
    dir.store(&path, sym("Y"), int(7)).unwrap();
    assert_eq!(dir.lookup(&path, &sym("Y")), Some(int(7)));
    assert_eq!(dir.lookup(&[], &sym("Y")), None, "a nested binding is invisible from the root");
}

#[test]
fn reserved_aliases_resolve_to_the_same_canonical_entry() {
    let mut dir = Directory::new();
    dir.store(&[], sym("Equation"), int(1)).unwrap();
    dir.store(&[], sym("EQ"), int(2)).unwrap();
    assert_eq!(dir.lookup(&[], &sym("Equation")), Some(int(2)), "EQ and Equation alias the same slot");
    assert_eq!(dir.len(), 1);
}

#[test]
fn purging_an_undefined_name_is_an_error() {
    let mut dir = Directory::new();
    assert!(dir.purge(&[], &sym("NOPE")).is_err());
}

#[test]
fn evaluator_resolves_a_bound_symbol_from_the_directory() {
    let mut eval = Evaluator::new();
    let mut vars = Directory::new();
    vars.store(&[], sym("X"), int(42)).unwrap();

    eval.evaluate(Object::Symbol(sym("X")), &mut vars).unwrap();

    assert_eq!(eval.stack().depth(), 1);
    assert_eq!(*eval.stack().top().unwrap(), int(42));
}

#[test]
fn evaluator_pushes_an_unbound_symbol_verbatim() {
    let mut eval = Evaluator::new();
    let mut vars = Directory::new();

    eval.evaluate(Object::Symbol(sym("UNBOUND")), &mut vars).unwrap();

    assert_eq!(*eval.stack().top().unwrap(), Object::Symbol(sym("UNBOUND")));
}

#[test]
fn sto_and_rcl_round_trip_through_the_evaluator_stack() {
    let mut eval = Evaluator::new();
    let mut vars = Directory::new();

    // `STO` pops the name off the top, then the value beneath it; pushing
    // the name object directly (rather than through `evaluate`) is how a
    // quoted name reaches the stack without being resolved in place.
    eval.evaluate(int(99), &mut vars).unwrap();
    eval.stack_mut().push(Object::Symbol(sym("Z")));
    eval.evaluate(Object::Command(Kind::CmdSto), &mut vars).unwrap();
    assert_eq!(eval.stack().depth(), 0, "STO consumes both the value and the name");

    eval.stack_mut().push(Object::Symbol(sym("Z")));
    eval.evaluate(Object::Command(Kind::CmdRcl), &mut vars).unwrap();
    assert_eq!(*eval.stack().top().unwrap(), int(99));
}
