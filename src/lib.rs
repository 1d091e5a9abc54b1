//! Clasp compiler front end
//!
//! Turns source bytes into a dense postfix AST and keeps a hash-consed
//! table of classes with inference and implicit conversion rules.
//!
//! # Example
//!
//! ```
//! use clasp::{ArraySize, Class, Session};
//!
//! let mut session = Session::default();
//! let unit = session.compile_unit(b"total := count * 2").unwrap();
//! assert!(unit.ast.is_terminated());
//!
//! let array = session.classes_mut().intern_array(Class::U8, ArraySize::Fixed(16)).unwrap();
//! assert_eq!(session.classes().bytesize(array), Some(16));
//! ```
//!
//! # Crate Features
//!
//! - `debug`: per-token trace output from the tokenizer

#![warn(rust_2018_idioms)]

pub mod frontend;
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};

pub use frontend::core::type_system::{ArraySize, Field, ProcedureSignature};
pub use frontend::core::{
    AstFlags, AstNode, AstType, Bindings, Class, ClassKind, ClassTable, Data, LexError, NameId, NameTable,
    NodeArray, ParseError, TypeError, ValueInfo,
};
pub use frontend::{FrontendError, Session, SessionStats, SharedSession, Unit};
pub use util::config::SessionConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "clasp";
