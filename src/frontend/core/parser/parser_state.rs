//! Parser state and error handling

use thiserror::Error;

use crate::frontend::core::lexer::tokens::{AstNode, AstType, Data};
use crate::frontend::core::node_array::NodeArray;

/// Syntax error kinds
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected value")]
    ExpectedValue,
    #[error("expected operator")]
    ExpectedOperator,
    #[error("named infered value was used in inappropriate context")]
    InferedOutOfContext,
    #[error("too many infered values")]
    TooManyInfered,
    #[error("too many default values")]
    TooManyDefaults,
    #[error("variable cannot be defined in this context")]
    VariableContext,
    #[error("missing expression inside of parenthesis")]
    MissingExpression,
    #[error("parenthesis contain too many expressions")]
    TooManyExpressions,
    #[error("opening brace has nothing to open")]
    NothingToOpen,
    #[error("missing argument for field subscript")]
    MissingFieldArgument,
    #[error("field subscript takes a single argument")]
    FieldSubscriptArity,
    #[error("array class takes a single size expression")]
    ArrayClassArity,
    #[error("procedure has too many parameters")]
    TooManyParameters,
    #[error("expected => after procedure parameters")]
    ExpectedArrow,
    #[error("comma outside of a list")]
    UnexpectedComma,
    #[error("too many elements in list")]
    TooManyElements,
    #[error("unexpected closing symbol")]
    UnexpectedClosing,
    #[error("unexpected end of file")]
    UnexpectedEndOfFile,
    #[error("operator stack overflow")]
    OperatorStackOverflow,
    #[error("unsupported keyword `{0}`")]
    UnsupportedKeyword(AstType),
    #[error("unhandled token `{0}`")]
    UnhandledToken(AstType),
    #[error("unhandled scope `{0}`")]
    UnhandledScope(AstType),
    #[error("malformed token stream")]
    MalformedTokens,
}

/// Syntax error with the byte position of the offending token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: u32,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        position: u32,
    ) -> Self {
        Self { kind, position }
    }
}

/// Cursor over a token array
pub struct ParserState<'a> {
    tokens: &'a NodeArray,
    pos: usize,
    /// Start of the most recently consumed token, for `rewind`
    last: usize,
    last_kind: AstType,
    before_last_kind: AstType,
}

impl<'a> ParserState<'a> {
    pub fn new(tokens: &'a NodeArray) -> Self {
        Self {
            tokens,
            pos: 1,
            last: 1,
            last_kind: AstType::Terminator,
            before_last_kind: AstType::Terminator,
        }
    }

    /// Consume the next token and its payload
    pub fn bump(&mut self) -> Result<(AstNode, Data), ParseError> {
        let node = self.tokens.node(self.pos).ok_or_else(|| self.malformed())?;
        let data = self.tokens.data(self.pos).unwrap_or_default();
        self.last = self.pos;
        self.pos += self.tokens.size_of(node.kind);
        self.before_last_kind = self.last_kind;
        self.last_kind = node.kind;
        Ok((node, data))
    }

    /// Step back over the token returned by the last `bump`
    pub fn rewind(&mut self) {
        self.pos = self.last;
        self.last_kind = self.before_last_kind;
    }

    pub fn peek(&self) -> Option<AstNode> {
        self.tokens.node(self.pos)
    }

    pub fn peek_kind(&self) -> Option<AstType> {
        self.peek().map(|node| node.kind)
    }

    pub fn at(
        &self,
        kind: AstType,
    ) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Consume the next token if it has `kind`
    pub fn skip(
        &mut self,
        kind: AstType,
    ) -> Result<bool, ParseError> {
        if self.at(kind) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Kind of the token consumed before the last one
    pub fn before_last(&self) -> AstType {
        self.before_last_kind
    }

    /// True once every token has been consumed
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Position of the last consumed token
    pub fn last_position(&self) -> u32 {
        self.tokens.node(self.last).map_or(0, |node| node.pos)
    }

    fn malformed(&self) -> ParseError {
        ParseError::new(ParseErrorKind::MalformedTokens, self.last_position())
    }
}
