//! Parser tests module
//!
//! - precedence: 优先级与结合性
//! - procedures: 过程、参数头与结束偏移
//! - variables: 变量声明与作用域
//! - errors: 语法错误与位置

mod precedence;

use crate::frontend::core::arena::Region;
use crate::frontend::core::lexer::{tokenize, AstType};
use crate::frontend::core::names::NameTable;
use crate::frontend::core::node_array::NodeArray;
use crate::frontend::core::parser::{parse, ParseError};

pub(crate) const OPERATOR_LIMIT: usize = 64;

fn tokens(source: &str) -> NodeArray {
    let mut names = NameTable::default();
    let mut statics = Region::new("statics", 256, 1 << 20);
    tokenize(source.as_bytes(), &mut names, &mut statics, 64, 64).unwrap()
}

pub(crate) fn try_ast(
    source: &str,
    operator_limit: usize,
) -> Result<NodeArray, ParseError> {
    parse(&tokens(source), operator_limit)
}

pub(crate) fn ast(source: &str) -> NodeArray {
    try_ast(source, OPERATOR_LIMIT).unwrap()
}

/// AST kinds in output order, without the trailing terminator
pub(crate) fn ast_kinds(source: &str) -> Vec<AstType> {
    let nodes = ast(source);
    let mut kinds: Vec<_> = nodes.iter().map(|(_, node, _)| node.kind).collect();
    assert_eq!(kinds.pop(), Some(AstType::Terminator));
    kinds
}

pub(crate) fn parse_error(source: &str) -> ParseError {
    try_ast(source, OPERATOR_LIMIT).unwrap_err()
}
