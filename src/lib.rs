//! An RPL calculator object runtime: a tagged/self-describing object
//! encoding, a compacting heap, the number tower through complex/units/
//! arrays, a symbolic rewrite engine, a stack-machine evaluator, nested
//! directories, and a recursive-descent parser/renderer pair (§1–§9).
//!
//! Layout mirrors the component table of §2: one top-level module per
//! lettered component (C1 `varint`, C2 `object`, C3 `heap`, C4 `number`,
//! C5/C6 under `algebra`/`symbolic`, C7 `eval`, C8 `directory`, C9
//! `parser`, C10 `settings`), plus the shared `error` taxonomy.

pub mod algebra;
pub mod directory;
pub mod error;
pub mod eval;
pub mod heap;
pub mod number;
pub mod object;
pub mod parser;
pub mod settings;
pub mod symbolic;
pub mod varint;

pub use directory::Directory;
pub use error::{Error, ErrorKind, RuntimeError};
pub use eval::Evaluator;
pub use object::Object;
pub use settings::Settings;
