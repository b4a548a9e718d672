//! The evaluator: the §4.7.2 five-case step contract, program execution
//! with cooperative interruption (§4.7.3), and error propagation with
//! `LastArguments`/`Undo` snapshots (§4.7.4).

use crate::error::{Error, ErrorKind, RuntimeError};
use crate::object::Object;
use crate::settings::{Flags, Settings};
use crate::symbolic::expression::ExprNode;
use crate::symbolic::program::Program;

use super::context::{Frame, ReturnStack, VariableStore};
use super::stack::Stack;
use super::commands;

/// Evaluates a single item against `stack`, consulting `vars` for symbol
/// lookup and `STO`/`RCL`/`PURGE` (§4.7.2, §4.8).
pub struct Evaluator {
    pub(crate) stack: Stack,
    pub(crate) context: ReturnStack,
    pub(crate) settings: Settings,
    pub(crate) flags: Flags,
    /// Set by a raised error, queried by `errm`/`errn`, cleared by `err0`.
    pub(crate) last_error: Option<Error>,
    /// The most recent step's input arguments, for numeric handlers that
    /// opt into `LastArguments` (§4.7.4).
    last_arguments: Option<Vec<Object>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            stack: Stack::new(),
            context: ReturnStack::new(),
            settings: Settings::default(),
            flags: Flags::default(),
            last_error: None,
            last_arguments: None,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// The §4.7.2 step contract. Cases 1, 2 and 5 push directly; case 3
    /// delegates to [`commands::execute`]; case 4 drives a program to
    /// completion via [`Self::run_program`].
    pub fn evaluate(&mut self, object: Object, vars: &mut dyn VariableStore) -> Result<(), RuntimeError> {
        match object {
            Object::Command(kind) => {
                if binary_or_unary_numeric(kind) {
                    self.last_arguments = Some(self.stack.snapshot());
                }
                commands::execute(kind, self, vars).map_err(|e| {
                    if let RuntimeError::Recoverable(err) = &e {
                        self.last_error = Some(err.clone());
                    }
                    e
                })
            }
            Object::Symbol(ref s) => {
                let path = self.context.path();
                if let Some(bound) = vars.lookup(&path, s).or_else(|| self.context.lookup_local(s).cloned()) {
                    self.stack.push(bound);
                } else {
                    self.stack.push(object);
                }
                Ok(())
            }
            Object::Program(program) => self.run_program(&program, vars, &mut || false),
            Object::Expression(_) => {
                self.stack.push(object);
                Ok(())
            }
            // Numbers, text, lists, arrays, units, complex: push verbatim.
            other => {
                self.stack.push(other);
                Ok(())
            }
        }
    }

    /// Runs `program`'s items in order, pushing a resume frame so the
    /// driver can observe progress and polling `should_interrupt` between
    /// items (§4.7.1, §4.7.3). Returns `RuntimeError::Interrupted` without
    /// unwinding items already executed.
    pub fn run_program(
        &mut self,
        program: &Program<Object>,
        vars: &mut dyn VariableStore,
        should_interrupt: &mut dyn FnMut() -> bool,
    ) -> Result<(), RuntimeError> {
        self.context.push(Frame::Resume { body: program.items().to_vec(), pointer: 0 });
        let result = (|| {
            loop {
                if should_interrupt() {
                    return Err(RuntimeError::Interrupted);
                }
                let next = match self.context.top_mut() {
                    Some(Frame::Resume { body, pointer }) => {
                        if *pointer >= body.len() {
                            None
                        } else {
                            let item = body[*pointer].clone();
                            *pointer += 1;
                            Some(item)
                        }
                    }
                    _ => None,
                };
                match next {
                    Some(item) => self.evaluate(item, vars)?,
                    None => return Ok(()),
                }
            }
        })();
        self.context.pop();
        result
    }

    /// `IFERR`-style protected execution (§4.7.4): runs `body`, and on a
    /// catchable error restores the stack to its pre-call snapshot before
    /// invoking `on_error`, discarding any partial pushes the failed body
    /// made but preserving everything pushed before entry.
    pub fn run_protected(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<(), RuntimeError>,
        on_error: impl FnOnce(&mut Self, &Error) -> Result<(), RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let snapshot = self.stack.snapshot();
        match body(self) {
            Ok(()) => Ok(()),
            Err(RuntimeError::Recoverable(e)) => {
                self.stack.restore(snapshot);
                on_error(self, &e)
            }
            Err(interrupted) => Err(interrupted),
        }
    }

    /// `UNDO`: restores the operand stack from the snapshot taken at the
    /// start of the most recent user-level step.
    pub fn undo(&mut self) {
        if let Some(snapshot) = self.last_arguments.take() {
            self.stack.restore(snapshot);
        }
    }

    /// Forces numeric reduction of an expression tree: substitutes any
    /// symbol bound in `vars` and folds fully-numeric `Apply` nodes via the
    /// promotion-aware arithmetic of [`crate::number::promote`], leaving
    /// anything that still contains a free symbol as a symbolic remainder
    /// (`EVAL` on an expression, §4.7.2 case 5).
    pub fn reduce_expression(&self, node: &ExprNode, vars: &dyn VariableStore) -> ExprNode {
        match node {
            ExprNode::Number(_) => node.clone(),
            ExprNode::Symbol(s) => match vars.lookup(&self.context.path(), s) {
                Some(Object::Real(r)) => ExprNode::Number(r),
                _ => node.clone(),
            },
            ExprNode::Apply(op, args) => {
                let reduced: Vec<ExprNode> = args.iter().map(|a| self.reduce_expression(a, vars)).collect();
                if let Some(values) = reduced.iter().map(as_number).collect::<Option<Vec<_>>>() {
                    if let Some(folded) = fold(op.as_str(), &values, &self.settings) {
                        return ExprNode::Number(folded);
                    }
                }
                ExprNode::Apply(op.clone(), reduced)
            }
        }
    }
}

fn as_number(n: &ExprNode) -> Option<crate::number::Real> {
    match n {
        ExprNode::Number(r) => Some(r.clone()),
        _ => None,
    }
}

fn fold(op: &str, values: &[crate::number::Real], settings: &Settings) -> Option<crate::number::Real> {
    use crate::number::promote;
    match (op, values) {
        ("+", [a, b]) => Some(promote::add(a, b, settings)),
        ("-", [a, b]) => Some(promote::sub(a, b, settings)),
        ("*", [a, b]) => Some(promote::mul(a, b, settings)),
        ("/", [a, b]) => promote::div(a, b, settings).ok(),
        ("^", [a, b]) => promote::pow(a, b, settings).ok(),
        ("neg", [a]) => {
            let zero = crate::number::Real::Integer(crate::number::integer::Integer::small(0));
            Some(promote::sub(&zero, a, settings))
        }
        _ => None,
    }
}

fn binary_or_unary_numeric(kind: crate::object::Kind) -> bool {
    use crate::object::Kind::*;
    matches!(
        kind,
        CmdAdd | CmdSub | CmdMul | CmdDiv | CmdPow | CmdMod | CmdRem | CmdNeg | CmdInv
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;
    use crate::number::Real;
    use crate::object::Kind;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, Object>);
    impl VariableStore for MapStore {
        fn lookup(&self, _path: &[String], name: &crate::symbolic::symbol::Symbol) -> Option<Object> {
            self.0.get(name.as_str()).cloned()
        }
        fn store(&mut self, _path: &[String], name: crate::symbolic::symbol::Symbol, value: Object) -> Result<(), ErrorKind> {
            self.0.insert(name.as_str().to_string(), value);
            Ok(())
        }
        fn purge(&mut self, _path: &[String], name: &crate::symbolic::symbol::Symbol) -> Result<Object, ErrorKind> {
            self.0.remove(name.as_str()).ok_or(ErrorKind::UndefinedName)
        }
    }

    fn int(v: i64) -> Object {
        Object::Real(Real::Integer(Integer::small(v)))
    }

    #[test]
    fn numbers_push_themselves() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        e.evaluate(int(5), &mut vars).unwrap();
        assert_eq!(e.stack.depth(), 1);
        assert_eq!(e.stack.top().unwrap(), &int(5));
    }

    #[test]
    fn add_command_pops_two_and_pushes_sum() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        e.evaluate(int(2), &mut vars).unwrap();
        e.evaluate(int(3), &mut vars).unwrap();
        e.evaluate(Object::Command(Kind::CmdAdd), &mut vars).unwrap();
        assert_eq!(e.stack.pop().unwrap(), int(5));
    }

    #[test]
    fn undefined_symbol_pushes_itself() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        let sym = Object::Symbol(crate::symbolic::symbol::Symbol::new("x").unwrap());
        e.evaluate(sym.clone(), &mut vars).unwrap();
        assert_eq!(e.stack.pop().unwrap(), sym);
    }

    #[test]
    fn bound_symbol_pushes_its_value() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        vars.0.insert("x".into(), int(42));
        let sym = Object::Symbol(crate::symbolic::symbol::Symbol::new("x").unwrap());
        e.evaluate(sym, &mut vars).unwrap();
        assert_eq!(e.stack.pop().unwrap(), int(42));
    }

    #[test]
    fn program_runs_its_items_in_order() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        let program = Program::new(vec![int(2), int(3), Object::Command(Kind::CmdAdd)]);
        e.evaluate(Object::Program(program), &mut vars).unwrap();
        assert_eq!(e.stack.pop().unwrap(), int(5));
    }

    #[test]
    fn divide_by_zero_is_recoverable_and_catchable() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        e.evaluate(int(1), &mut vars).unwrap();
        e.evaluate(int(0), &mut vars).unwrap();
        let result = e.evaluate(Object::Command(Kind::CmdDiv), &mut vars);
        assert!(matches!(result, Err(RuntimeError::Recoverable(_))));
        assert_eq!(e.last_error().unwrap().kind(), &ErrorKind::DivideByZero);
    }

    #[test]
    fn run_protected_restores_stack_on_catchable_error() {
        let mut e = Evaluator::new();
        let mut vars = MapStore(HashMap::new());
        e.evaluate(int(9), &mut vars).unwrap();
        e.run_protected(
            |e| {
                e.evaluate(int(1), &mut MapStore(HashMap::new()))?;
                e.evaluate(int(0), &mut MapStore(HashMap::new()))?;
                e.evaluate(Object::Command(Kind::CmdDiv), &mut MapStore(HashMap::new()))
            },
            |e, _err| {
                e.stack.push(int(-1));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(e.stack.snapshot(), vec![int(9), int(-1)]);
    }
}
