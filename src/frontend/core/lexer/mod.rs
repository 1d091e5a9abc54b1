//! Lexer module
//! Turns raw source bytes into a flat token array (see [`NodeArray`]).

pub mod keywords;
pub mod literals;
pub mod tokenizer;
pub mod tokens;
pub mod utf8;

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::frontend::core::arena::{ArenaError, Region};
use crate::frontend::core::names::NameTable;
use crate::frontend::core::node_array::NodeArray;

pub use tokenizer::Tokenizer;
pub use tokens::{AstFlags, AstNode, AstType, Data, ProcHeader, StaticBuf};

/// Lexical error kinds
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unrecognized token")]
    UnrecognizedToken,
    #[error("too many nested scopes")]
    TooManyScopes,
    #[error("too many closing {}", closer_name(.0))]
    TooManyClosing(char),
    #[error("mismatched {}", closer_name(.0))]
    Mismatched(char),
    #[error("expected closing parenthesis before {0} symbol")]
    ExpectedParenthesis(&'static str),
    #[error("unfinished comment")]
    UnfinishedComment,
    #[error("invalid variable syntax")]
    InvalidVariableSyntax,
    #[error("invalid floating point literal")]
    InvalidFloat,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("invalid token starting with dot")]
    InvalidDotToken,
    #[error("end of file inside of string literal")]
    UnterminatedString,
    #[error("invalid character code")]
    InvalidCharacterCode,
    #[error("name is longer than 255 bytes")]
    NameTooLong,
    #[error("scope is never closed")]
    UnclosedScope,
    #[error("source unit is larger than 4 GiB")]
    SourceTooLarge,
    #[error("{0}")]
    ResourceLimit(ArenaError),
}

fn closer_name(closer: &char) -> &'static str {
    match *closer {
        ')' => "parenthesis",
        '}' => "braces",
        _ => "brackets",
    }
}

/// Lexical error with the byte position it was detected at
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: u32,
}

/// Tokenize one source unit.
///
/// Stops at the end of `source` or at the first NUL byte. Names are
/// interned into `names`; string literal bytes are appended to `statics`.
pub fn tokenize(
    source: &[u8],
    names: &mut NameTable,
    statics: &mut Region<u8>,
    scope_limit: usize,
    capacity: usize,
) -> Result<NodeArray, LexError> {
    if source.len() > u32::MAX as usize {
        return Err(LexError {
            kind: LexErrorKind::SourceTooLarge,
            position: 0,
        });
    }
    tracing::debug!(bytes = source.len(), "tokenize start");
    let tokens = Tokenizer::new(source, names, statics, scope_limit, capacity).run()?;
    tracing::debug!(slots = tokens.len(), "tokenize complete");
    Ok(tokens)
}
