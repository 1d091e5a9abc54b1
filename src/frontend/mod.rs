//! Frontend compilation pipeline
//!
//! Source bytes go through the tokenizer and the parser into a postfix AST
//! array. The class table checks values against classes on top of that.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

pub mod core;
pub mod listing;
pub mod session;

pub use session::{Session, SessionStats, SharedSession, Unit};

use self::core::lexer::LexError;
use self::core::parser::ParseError;
use self::core::type_system::TypeError;

/// First error of a frontend stage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrontendError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl FrontendError {
    /// Byte offset in the source unit; type errors carry none
    pub fn position(&self) -> Option<u32> {
        match self {
            FrontendError::Lex(err) => Some(err.position),
            FrontendError::Parse(err) => Some(err.position),
            FrontendError::Type(_) => None,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            FrontendError::Lex(_) => "lex",
            FrontendError::Parse(_) => "parse",
            FrontendError::Type(_) => "type",
        }
    }

    /// Message without the position suffix
    pub fn message(&self) -> String {
        match self {
            FrontendError::Lex(err) => err.kind.to_string(),
            FrontendError::Parse(err) => err.kind.to_string(),
            FrontendError::Type(err) => err.to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.stage(), self.message(), self.position())
    }
}
