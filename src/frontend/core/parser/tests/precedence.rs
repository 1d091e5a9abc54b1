//! 优先级测试

use super::{ast, ast_kinds};
use crate::frontend::core::lexer::AstType;

#[cfg(test)]
mod precedence_tests {
    use super::*;
    use AstType::*;

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(ast_kinds("1 + 2 * 3"), vec![Unsigned, Unsigned, Unsigned, Multiply, Add]);
        assert_eq!(ast_kinds("1 * 2 + 3"), vec![Unsigned, Unsigned, Multiply, Unsigned, Add]);
    }

    #[test]
    fn test_same_level_is_left_associative() {
        assert_eq!(ast_kinds("a - b - c"), vec![Identifier, Identifier, Subtract, Identifier, Subtract]);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(ast_kinds("a ** b ** c"), vec![Identifier, Identifier, Identifier, Power, Power]);
    }

    #[test]
    fn test_assignment_is_lowest() {
        assert_eq!(ast_kinds("a = b || c"), vec![Identifier, Identifier, Identifier, LogicOr, Assign]);
        assert_eq!(ast_kinds("a += 1"), vec![Identifier, Unsigned, AddAssign]);
    }

    #[test]
    fn test_parenthesis_group() {
        assert_eq!(ast_kinds("(1 + 2) * 3"), vec![Unsigned, Unsigned, Add, Unsigned, Multiply]);
    }

    #[test]
    fn test_prefix_operators() {
        assert_eq!(ast_kinds("-a * b"), vec![Identifier, Minus, Identifier, Multiply]);
        assert_eq!(ast_kinds("*u8"), vec![Identifier, Pointer]);
        assert_eq!(ast_kinds("!a && b"), vec![Identifier, LogicNot, Identifier, LogicAnd]);
        assert_eq!(ast_kinds("^x"), vec![Identifier, BitNot]);
    }

    #[test]
    fn test_postfix_binds_before_prefix() {
        assert_eq!(ast_kinds("-a.b"), vec![Identifier, GetField, Minus]);
        assert_eq!(ast_kinds("*p'"), vec![Identifier, Dereference, Pointer]);
    }

    #[test]
    fn test_calls_and_subscripts() {
        assert_eq!(ast_kinds("f(x, y)"), vec![Identifier, Identifier, Identifier, Call]);
        assert_eq!(ast_kinds("f()"), vec![Identifier, Call]);
        assert_eq!(ast_kinds("a[1]"), vec![Identifier, Unsigned, Subscript]);
        assert_eq!(ast_kinds("a[]"), vec![Identifier, Span]);

        let nodes = ast("f(x, y, z)");
        let call = nodes.iter().find(|(_, node, _)| node.kind == Call).unwrap().1;
        assert_eq!(call.count, 3);
    }

    #[test]
    fn test_trailing_comma_is_not_counted() {
        let nodes = ast("f(x, y,)");
        let call = nodes.iter().find(|(_, node, _)| node.kind == Call).unwrap().1;
        assert_eq!(call.count, 2);
    }

    #[test]
    fn test_statements_split_on_newlines() {
        assert_eq!(
            ast_kinds("a = 1\nb = 2"),
            vec![Identifier, Unsigned, Assign, Identifier, Unsigned, Assign]
        );
        assert_eq!(ast_kinds("a = 1; b"), vec![Identifier, Unsigned, Assign, Identifier]);
    }

    #[test]
    fn test_class_prefixes() {
        assert_eq!(ast_kinds("[4]u8"), vec![Unsigned, Identifier, ArrayClass]);
        assert_eq!(ast_kinds("[]u8"), vec![Identifier, SpanClass]);
        assert_eq!(ast_kinds("(u32, u8) -> u32"), vec![Identifier, Identifier, Identifier, ProcedureClass]);

        let nodes = ast("(u32, u8) -> u32");
        let class = nodes.iter().find(|(_, node, _)| node.kind == ProcedureClass).unwrap().1;
        assert_eq!(class.count, 2);
    }

    #[test]
    fn test_empty_initializer_and_enum_literal() {
        assert_eq!(ast_kinds("x = {}"), vec![Identifier, Initializer, Assign]);
        assert_eq!(ast_kinds("x = .red"), vec![Identifier, EnumLiteral, Assign]);
        assert_eq!(ast_kinds("T.{1, 2}"), vec![Identifier, Unsigned, Unsigned, Initialize]);
    }
}
