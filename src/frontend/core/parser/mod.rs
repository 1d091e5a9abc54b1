//! Parser module
//!
//! Turns a token array into a postfix AST array. Operands precede their
//! operators; scopes and procedures carry the relative offset of their end.

pub mod builder;
pub mod engine;
pub mod operators;
pub mod parser_state;
#[cfg(test)]
pub mod tests;

pub use engine::Parser;
pub use parser_state::{ParseError, ParseErrorKind, ParserState};

use tracing::debug;

use crate::frontend::core::node_array::NodeArray;

/// Parse a token array produced by the tokenizer
///
/// `operator_limit` bounds the depth of pending operators and open scopes.
pub fn parse(
    tokens: &NodeArray,
    operator_limit: usize,
) -> Result<NodeArray, ParseError> {
    debug!("parsing {} token slots", tokens.len());
    let ast = Parser::new(tokens, operator_limit).run()?;
    debug!("parsed into {} ast slots", ast.len());
    Ok(ast)
}
