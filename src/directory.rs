//! Directory & variables (C8, §4.8): a mutable name→value table, nested
//! into subdirectories addressed by the path the return stack tracks
//! (`HOME`/`UpDir`/`PATH`, [`crate::eval::context::ReturnStack`]).
//!
//! A directory node only stores values; the nested-directory *tree* lives
//! here as plain `HashMap` children rather than as heap-resident `Object`
//! values, the same simplification the evaluator makes for the operand
//! stack (decoded values, not heap offsets) — see DESIGN.md.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::trace;

use crate::error::ErrorKind;
use crate::eval::VariableStore;
use crate::object::Object;
use crate::symbolic::symbol::Symbol;

/// Aliases accepted at lookup/store/purge time for the four reserved names
/// (§4.8). Matching is case-sensitive, same as every other identifier.
const RESERVED_ALIASES: &[(&str, &str)] = &[
    ("EQ", "Equation"),
    ("Eqn", "Equation"),
    ("PlotParameters", "PPAR"),
    ("SigmaData", "ΣData"),
    ("ΣDAT", "ΣData"),
    ("SigmaParameters", "ΣParameters"),
    ("ΣPAR", "ΣParameters"),
];

fn canonical(raw: &str) -> &str {
    RESERVED_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, canon)| *canon)
        .unwrap_or(raw)
}

/// One directory node: an insertion-ordered `(name, value)` table plus its
/// named subdirectories (§4.8: "length-prefixed sequence of (name, value)
/// pairs... the only mutable kind").
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Vec<(Symbol, Object)>,
    children: HashMap<String, Directory>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, path: &[String]) -> Option<&Directory> {
        let mut dir = self;
        for name in path {
            dir = dir.children.get(canonical(name))?;
        }
        Some(dir)
    }

    fn resolve_mut(&mut self, path: &[String]) -> Option<&mut Directory> {
        let mut dir = self;
        for name in path {
            dir = dir.children.get_mut(canonical(name))?;
        }
        Some(dir)
    }

    /// Creates every missing subdirectory along `path`, then returns it —
    /// `store` at a not-yet-entered path creates the directory the way
    /// `STO` at the REPL would after an explicit `CRDIR`.
    fn enter_or_create(&mut self, path: &[String]) -> &mut Directory {
        let mut dir = self;
        for name in path {
            dir = dir.children.entry(canonical(name).to_string()).or_insert_with(Directory::new);
        }
        dir
    }

    fn find(&self, name: &Symbol) -> Option<usize> {
        let key = canonical(name.as_str());
        self.entries.iter().position(|(n, _)| canonical(n.as_str()) == key)
    }

    /// `store(name, value)` on this node directly, overwriting an existing
    /// binding in place so directory order is stable across updates.
    fn store_local(&mut self, name: Symbol, value: Object) {
        match self.find(&name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    fn lookup_local(&self, name: &Symbol) -> Option<Object> {
        self.find(name).map(|i| self.entries[i].1.clone())
    }

    /// Returns the purged value's approximate size in objects (here, 1 —
    /// every binding is a single `Object`), or `UndefinedName` if absent.
    fn purge_local(&mut self, name: &Symbol) -> Result<Object, ErrorKind> {
        match self.find(name) {
            Some(i) => Ok(self.entries.remove(i).1),
            None => Err(ErrorKind::UndefinedName),
        }
    }

    /// `enumerate(callback)`: visits `(name, value)` pairs in insertion
    /// order (§4.8).
    pub fn enumerate(&self, mut callback: impl FnMut(&Symbol, &Object)) {
        for (name, value) in &self.entries {
            callback(name, value);
        }
    }

    /// Every name bound in this node, for diagnostics/tests.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of bindings directly in this node (not its subdirectories).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VariableStore for Directory {
    fn lookup(&self, path: &[String], name: &Symbol) -> Option<Object> {
        self.resolve(path)?.lookup_local(name)
    }

    fn store(&mut self, path: &[String], name: Symbol, value: Object) -> Result<(), ErrorKind> {
        let dir = self.enter_or_create(path);
        trace!(path = %path.iter().join("/"), name = %name, "store");
        dir.store_local(name, value);
        Ok(())
    }

    fn purge(&mut self, path: &[String], name: &Symbol) -> Result<Object, ErrorKind> {
        let dir = self.resolve_mut(path).ok_or(ErrorKind::UndefinedName)?;
        let purged = dir.purge_local(name)?;
        trace!(path = %path.iter().join("/"), name = %name, "purge");
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;
    use crate::number::Real;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn int(v: i64) -> Object {
        Object::Real(Real::Integer(Integer::small(v)))
    }

    #[test]
    fn store_then_recall_round_trips() {
        let mut dir = Directory::new();
        dir.store(&[], sym("X"), int(42)).unwrap();
        assert_eq!(dir.lookup(&[], &sym("X")), Some(int(42)));
    }

    #[test]
    fn purge_removes_the_binding() {
        let mut dir = Directory::new();
        dir.store(&[], sym("X"), int(1)).unwrap();
        assert_eq!(dir.purge(&[], &sym("X")), Ok(int(1)));
        assert_eq!(dir.lookup(&[], &sym("X")), None);
    }

    #[test]
    fn purge_of_absent_name_is_undefined_name() {
        let mut dir = Directory::new();
        assert_eq!(dir.purge(&[], &sym("X")), Err(ErrorKind::UndefinedName));
    }

    #[test]
    fn subdirectory_bindings_are_independent_of_root() {
        let mut dir = Directory::new();
        dir.store(&[], sym("X"), int(1)).unwrap();
        dir.store(&["SUB".to_string()], sym("X"), int(2)).unwrap();
        assert_eq!(dir.lookup(&[], &sym("X")), Some(int(1)));
        assert_eq!(dir.lookup(&["SUB".to_string()], &sym("X")), Some(int(2)));
    }

    #[test]
    fn reserved_name_alias_resolves_to_the_same_entry() {
        let mut dir = Directory::new();
        dir.store(&[], sym("Equation"), int(1)).unwrap();
        assert_eq!(dir.lookup(&[], &sym("EQ")), Some(int(1)));
    }

    #[test]
    fn enumerate_visits_entries_in_insertion_order() {
        let mut dir = Directory::new();
        dir.store(&[], sym("A"), int(1)).unwrap();
        dir.store(&[], sym("B"), int(2)).unwrap();
        let mut seen = vec![];
        dir.enumerate(|name, _| seen.push(name.as_str().to_string()));
        assert_eq!(seen, vec!["A".to_string(), "B".to_string()]);
    }
}
