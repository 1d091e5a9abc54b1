//! Lexer tests module
//!
//! - operators: 运算符与复合赋值
//! - literals: 数字、字符、字符串字面量
//! - scopes: 括号作用域、`=>` / `->` 重分类、换行
//! - errors: 错误位置与信息

mod literals;
mod operators;
mod scopes;

use crate::frontend::core::arena::Region;
use crate::frontend::core::lexer::{tokenize, AstFlags, AstType, Data, LexError};
use crate::frontend::core::names::NameTable;
use crate::frontend::core::node_array::NodeArray;

/// Names, statics and the token array of one run
pub(crate) struct Lexed {
    pub names: NameTable,
    pub statics: Region<u8>,
    pub tokens: Result<NodeArray, LexError>,
}

pub(crate) fn lex_full(source: &str) -> Lexed {
    let mut names = NameTable::default();
    let mut statics = Region::new("statics", 256, 1 << 20);
    let tokens = tokenize(source.as_bytes(), &mut names, &mut statics, 64, 64);
    Lexed { names, statics, tokens }
}

/// Token kinds without the trailing terminator
pub(crate) fn kinds(source: &str) -> Vec<AstType> {
    let tokens = lex_full(source).tokens.unwrap();
    let mut kinds: Vec<_> = tokens.iter().map(|(_, node, _)| node.kind).collect();
    assert_eq!(kinds.pop(), Some(AstType::Terminator));
    kinds
}

pub(crate) fn kinds_and_flags(source: &str) -> Vec<(AstType, AstFlags)> {
    let tokens = lex_full(source).tokens.unwrap();
    tokens
        .iter()
        .map(|(_, node, _)| (node.kind, node.flags))
        .filter(|(kind, _)| *kind != AstType::Terminator)
        .collect()
}

/// First token's payload
pub(crate) fn first_data(source: &str) -> (AstType, Data) {
    let tokens = lex_full(source).tokens.unwrap();
    let (_, node, data) = tokens.iter().next().unwrap();
    (node.kind, data.unwrap())
}

pub(crate) fn lex_error(source: &str) -> LexError {
    lex_full(source).tokens.unwrap_err()
}
