//! The return stack (§4.7.1): directory path entries, resume pointers for
//! executing programs, and local-variable frames.

use crate::error::ErrorKind;
use crate::object::Object;
use crate::symbolic::symbol::Symbol;

/// One return-stack entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A directory entered on the path; `UpDir`/`Home` pop these.
    Directory(String),
    /// A program currently executing, with a resume pointer into its body.
    Resume { body: Vec<Object>, pointer: usize },
    /// Local variables bound by a program's own binding form.
    Locals(Vec<(Symbol, Object)>),
}

/// The return stack proper: directory path plus execution frames, growing
/// downward the way §4.7.1 describes (modeled here as a plain `Vec`, top at
/// the end).
#[derive(Debug, Default, Clone)]
pub struct ReturnStack {
    frames: Vec<Frame>,
}

impl ReturnStack {
    pub fn new() -> Self {
        ReturnStack::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The current directory path, root first, as a list of names (`PATH`).
    pub fn path(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Directory(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// `UPDIR`: pops the innermost directory frame.
    pub fn up_dir(&mut self) {
        if let Some(pos) = self.frames.iter().rposition(|f| matches!(f, Frame::Directory(_))) {
            self.frames.remove(pos);
        }
    }

    /// `HOME`: clears every directory frame from the path.
    pub fn home(&mut self) {
        self.frames.retain(|f| !matches!(f, Frame::Directory(_)));
    }

    /// Looks up a name in the innermost local-variable frame only (§4.7.1
    /// local frames shadow the directory path but don't nest further).
    pub fn lookup_local(&self, name: &Symbol) -> Option<&Object> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Locals(bindings) => bindings.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        })
    }
}

/// Decouples the evaluator from a concrete directory implementation, the
/// same way [`super::super::object::dispatch`] decouples dispatch rows from
/// the evaluator itself. [`crate::directory::Directory`] implements this.
///
/// `path`, root first, is the directory path currently tracked on the
/// return stack (`PATH`, §4.8); the implementor resolves `name` inside the
/// subdirectory that path addresses, not necessarily its own root table.
pub trait VariableStore {
    fn lookup(&self, path: &[String], name: &Symbol) -> Option<Object>;
    fn store(&mut self, path: &[String], name: Symbol, value: Object) -> Result<(), ErrorKind>;
    fn purge(&mut self, path: &[String], name: &Symbol) -> Result<Object, ErrorKind>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_tracks_only_directory_frames() {
        let mut rs = ReturnStack::new();
        rs.push(Frame::Directory("HOME".into()));
        rs.push(Frame::Locals(vec![]));
        rs.push(Frame::Directory("SUB".into()));
        assert_eq!(rs.path(), vec!["HOME".to_string(), "SUB".to_string()]);
    }

    #[test]
    fn up_dir_pops_innermost_directory_only() {
        let mut rs = ReturnStack::new();
        rs.push(Frame::Directory("HOME".into()));
        rs.push(Frame::Directory("SUB".into()));
        rs.up_dir();
        assert_eq!(rs.path(), vec!["HOME".to_string()]);
    }

    #[test]
    fn home_clears_the_whole_path() {
        let mut rs = ReturnStack::new();
        rs.push(Frame::Directory("HOME".into()));
        rs.push(Frame::Directory("SUB".into()));
        rs.home();
        assert!(rs.path().is_empty());
    }
}
