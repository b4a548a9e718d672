//! The rewrite engine (§4.6): bottom-up pattern matching with captured
//! pattern variables, and the `expand`/`collect`/`simplify` rule-sets built
//! on it.

use super::expression::ExprNode;
use super::symbol::Symbol;
use std::collections::HashMap;

/// Binds pattern variables (`X`, `Y`, …) to the subtrees they matched.
/// A plain `HashMap` keyed by [`Symbol`] — no external unification crate
/// is in the dependency stack.
pub type Bindings = HashMap<Symbol, ExprNode>;

/// Attempts to match `pattern` against `expr`, extending `bindings` with
/// any newly captured pattern variables. A repeated capture must match a
/// structurally-equal subtree to the one already bound (§4.6).
fn matches(pattern: &ExprNode, expr: &ExprNode, bindings: &mut Bindings) -> bool {
    match pattern {
        ExprNode::Symbol(s) if s.is_pattern_variable() => match bindings.get(s) {
            Some(bound) => bound == expr,
            None => {
                bindings.insert(s.clone(), expr.clone());
                true
            }
        },
        ExprNode::Symbol(s) => matches!(expr, ExprNode::Symbol(e) if e == s),
        ExprNode::Number(n) => matches!(expr, ExprNode::Number(e) if e == n),
        ExprNode::Apply(op, args) => match expr {
            ExprNode::Apply(eop, eargs) if eop == op && eargs.len() == args.len() => {
                args.iter().zip(eargs).all(|(p, e)| matches(p, e, bindings))
            }
            _ => false,
        },
    }
}

/// Substitutes every pattern-variable symbol in `template` with its
/// binding.
fn substitute(template: &ExprNode, bindings: &Bindings) -> ExprNode {
    match template {
        ExprNode::Symbol(s) if s.is_pattern_variable() => {
            bindings.get(s).cloned().unwrap_or_else(|| template.clone())
        }
        ExprNode::Symbol(_) | ExprNode::Number(_) => template.clone(),
        ExprNode::Apply(op, args) => {
            ExprNode::Apply(op.clone(), args.iter().map(|a| substitute(a, bindings)).collect())
        }
    }
}

/// One rewrite pass: if `pattern` matches `expr` (or any of its subtrees,
/// walked bottom-up), returns the substituted `replacement` at that
/// position; otherwise returns `expr` unchanged (§4.6).
pub fn rewrite(expr: &ExprNode, pattern: &ExprNode, replacement: &ExprNode) -> ExprNode {
    let rebuilt = match expr {
        ExprNode::Apply(op, args) => {
            ExprNode::Apply(op.clone(), args.iter().map(|a| rewrite(a, pattern, replacement)).collect())
        }
        leaf => leaf.clone(),
    };
    let mut bindings = Bindings::new();
    if matches(pattern, &rebuilt, &mut bindings) {
        substitute(replacement, &bindings)
    } else {
        rebuilt
    }
}

fn rule(pattern_src: (&str, Vec<&str>), replacement_src: (&str, Vec<&str>)) -> (ExprNode, ExprNode) {
    let make = |name: &str, vars: Vec<&str>| -> ExprNode {
        if vars.is_empty() {
            ExprNode::Symbol(Symbol::new(name).expect("rule names are valid identifiers"))
        } else {
            ExprNode::Apply(
                Symbol::new(name).expect("rule names are valid identifiers"),
                vars.into_iter()
                    .map(|v| ExprNode::Symbol(Symbol::new(v).expect("pattern variables are valid identifiers")))
                    .collect(),
            )
        }
    };
    (make(pattern_src.0, pattern_src.1), make(replacement_src.0, replacement_src.1))
}

/// The fixed rule-set backing `expand` (§4.6): distributes multiplication
/// over addition. `X * (Y + Z) -> X*Y + X*Z`.
fn expand_rules() -> Vec<(ExprNode, ExprNode)> {
    vec![{
        let x = || ExprNode::Symbol(Symbol::new("X").unwrap());
        let y = || ExprNode::Symbol(Symbol::new("Y").unwrap());
        let z = || ExprNode::Symbol(Symbol::new("Z").unwrap());
        let plus = Symbol::new("+").unwrap();
        let star = Symbol::new("*").unwrap();
        let pattern = ExprNode::Apply(star.clone(), vec![x(), ExprNode::Apply(plus.clone(), vec![y(), z()])]);
        let replacement = ExprNode::Apply(
            plus,
            vec![
                ExprNode::Apply(star.clone(), vec![x(), y()]),
                ExprNode::Apply(star, vec![x(), z()]),
            ],
        );
        (pattern, replacement)
    }]
}

/// The fixed rule-set backing `collect` (§4.6): folds `X*Y + X*Z` back
/// into `X*(Y+Z)`, the inverse of the expand rule.
fn collect_rules() -> Vec<(ExprNode, ExprNode)> {
    let (expand_pattern, expand_replacement) = expand_rules().remove(0);
    vec![(expand_replacement, expand_pattern)]
}

fn apply_rules(expr: &ExprNode, rules: &[(ExprNode, ExprNode)]) -> ExprNode {
    let mut current = expr.clone();
    for (pattern, replacement) in rules {
        current = rewrite(&current, pattern, replacement);
    }
    current
}

pub fn expand(expr: &ExprNode) -> ExprNode {
    apply_rules(expr, &expand_rules())
}

pub fn collect(expr: &ExprNode) -> ExprNode {
    apply_rules(expr, &collect_rules())
}

/// Runs `expand` and `collect` alternately until a fixed point or
/// `max_passes` is reached, whichever comes first (§4.6).
pub fn simplify(expr: &ExprNode, max_passes: usize) -> ExprNode {
    let mut current = expr.clone();
    for _ in 0..max_passes {
        let next = collect(&expand(&current));
        if next == current {
            return next;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;

    fn num(v: i64) -> ExprNode {
        ExprNode::Number(Real::Integer(Integer::small(v)))
    }

    #[test]
    fn matches_binds_pattern_variables() {
        let pattern = ExprNode::Symbol(Symbol::new("X").unwrap());
        let mut bindings = Bindings::new();
        assert!(matches(&pattern, &num(5), &mut bindings));
        assert_eq!(bindings.get(&Symbol::new("X").unwrap()), Some(&num(5)));
    }

    #[test]
    fn repeated_capture_requires_structural_equality() {
        let x = || ExprNode::Symbol(Symbol::new("X").unwrap());
        let plus = Symbol::new("+").unwrap();
        let pattern = ExprNode::Apply(plus.clone(), vec![x(), x()]);
        let mut bindings = Bindings::new();
        assert!(matches(&pattern, &ExprNode::Apply(plus.clone(), vec![num(3), num(3)]), &mut bindings));
        bindings.clear();
        assert!(!matches(&pattern, &ExprNode::Apply(plus, vec![num(3), num(4)]), &mut bindings));
    }

    #[test]
    fn expand_distributes_multiplication() {
        let x = num(2);
        let y = num(3);
        let z = num(4);
        let plus = Symbol::new("+").unwrap();
        let star = Symbol::new("*").unwrap();
        let expr = ExprNode::Apply(star, vec![x, ExprNode::Apply(plus, vec![y, z])]);
        let expanded = expand(&expr);
        match expanded {
            ExprNode::Apply(op, args) if op.as_str() == "+" => assert_eq!(args.len(), 2),
            other => panic!("expected a top-level +, got {other:?}"),
        }
    }

    #[test]
    fn simplify_reaches_a_fixed_point() {
        let expr = num(7);
        assert_eq!(simplify(&expr, 10), expr);
    }
}
