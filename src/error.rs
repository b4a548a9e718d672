//! Runtime error representation (§7).
//!
//! Errors are values: every fallible operation in this crate returns
//! `Result<_, Error>`, never panics on a user-reachable path. `ErrorKind` is
//! the closed taxonomy from §7; `Error` adds the optional source span and
//! command name that make an error queryable from `errm`/`errn` (C7).
//!
//! `RuntimeError` splits `Recoverable` from `Interrupted`: the latter is a
//! distinct variant because, per §4.7.4 and §7, `IFERR` never catches it,
//! unlike every other error kind.

use std::fmt;
use thiserror::Error as ThisError;

/// The closed error taxonomy of §7.
#[derive(Debug, Clone, PartialEq, Eq, ThisError, strum::EnumIter)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Allocation failed even after a GC pass.
    #[error("Out of memory")]
    OutOfMemory,
    /// Division, or an operation reducible to it, by an exact zero.
    #[error("Divide by zero")]
    DivideByZero,
    /// An argument's value lies outside the domain of the operation.
    #[error("Argument outside domain")]
    ArgumentOutsideDomain,
    /// An argument has the wrong kind entirely.
    #[error("Bad argument type")]
    BadArgumentType,
    /// An argument has the right kind but an invalid value.
    #[error("Bad argument value")]
    BadArgumentValue,
    /// A name does not lex as a valid identifier.
    #[error("Invalid name")]
    InvalidName,
    /// A name has no binding in the active directory path.
    #[error("Undefined name")]
    UndefinedName,
    /// A list/array/stack index is outside the valid range.
    #[error("Index out of range")]
    IndexOutOfRange,
    /// An array/matrix operation received incompatible shapes.
    #[error("Invalid dimension")]
    InvalidDimension,
    /// Unit arithmetic attempted across incompatible dimensions.
    #[error("Inconsistent units")]
    InconsistentUnits,
    /// The parser could not make sense of the input.
    #[error("Syntax error")]
    SyntaxError,
    /// The input ended inside an unclosed construct.
    #[error("Unterminated")]
    Unterminated,
    /// A based-integer literal used an invalid base or digit.
    #[error("Invalid base")]
    InvalidBase,
    /// The host requested cancellation between evaluator steps.
    #[error("Interrupted")]
    Interrupted,
    /// A heap or traversal invariant was violated; not a user mistake.
    #[error("Internal error")]
    InternalError,
    /// A symbolic solver found no solution.
    #[error("No solution")]
    NoSolution,
    /// The operation is not defined for the given kind combination.
    #[error("Undefined operation")]
    UndefinedOperation,
    /// A program raised its own error via `doerr`.
    #[error("{0}")]
    UserDefined(String),
}

/// A byte-offset span within the command line being parsed or evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    /// Builds a span, asserting `start <= end` the way a handler should
    /// always be able to.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The current error: a kind plus the context needed to query and render it
/// (`errm`, `errn`, command-name display in the UI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    span: Option<Span>,
    command: Option<&'static str>,
}

impl Error {
    /// Builds an error with no span or command context.
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: None,
            command: None,
        }
    }

    /// Attaches a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attaches the name of the command that raised the error.
    #[must_use]
    pub const fn with_command(mut self, command: &'static str) -> Self {
        self.command = Some(command);
        self
    }

    /// The error kind (`errn`-style numeric/kind query).
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The source span, if known.
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// The command name that raised this error, if known.
    pub const fn command(&self) -> Option<&'static str> {
        self.command
    }

    /// Rendered message text, as returned by `errm`.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command {
            Some(cmd) => write!(f, "{cmd}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Top-level result of a single evaluator step (§4.7.4, §5).
///
/// `Recoverable` carries a queryable [`Error`] an `iferr` frame can catch;
/// `Interrupted` behaves like an error but `IFERR` never catches it, since
/// the host asked to cancel, not the program to handle a fault.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RuntimeError {
    /// A catchable error produced by a handler.
    #[error(transparent)]
    Recoverable(#[from] Error),
    /// The host requested cancellation; `IFERR` always propagates it.
    #[error("Interrupted")]
    Interrupted,
}

impl RuntimeError {
    /// True if an `iferr` frame may catch this error (everything except
    /// `Interrupted`).
    pub const fn is_catchable_by_plain_iferr(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    /// The underlying queryable error, if this is the recoverable variant.
    pub const fn as_error(&self) -> Option<&Error> {
        match self {
            Self::Recoverable(e) => Some(e),
            Self::Interrupted => None,
        }
    }
}

impl From<ErrorKind> for RuntimeError {
    fn from(kind: ErrorKind) -> Self {
        Self::Recoverable(Error::new(kind))
    }
}

/// Shorthand used pervasively across the crate's handler signatures.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_is_not_plain_catchable() {
        assert!(!RuntimeError::Interrupted.is_catchable_by_plain_iferr());
        assert!(RuntimeError::from(ErrorKind::DivideByZero).is_catchable_by_plain_iferr());
    }

    #[test]
    fn message_includes_command_when_present() {
        let e = Error::new(ErrorKind::DivideByZero).with_command("/");
        assert_eq!(e.to_string(), "/: Divide by zero");
        assert_eq!(e.message(), "Divide by zero");
    }
}
