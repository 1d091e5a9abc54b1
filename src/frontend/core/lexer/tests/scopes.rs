//! 作用域与换行测试

use super::{kinds, kinds_and_flags, lex_error};
use crate::frontend::core::lexer::{AstFlags, AstType, LexErrorKind};

#[cfg(test)]
mod lexer_scopes_tests {
    use super::*;

    #[test]
    fn test_arrow_reclassifies_parenthesis() {
        assert_eq!(
            kinds("(x) => x"),
            [
                AstType::OpenProcedure,
                AstType::Identifier,
                AstType::EndScope,
                AstType::DoubleArrow,
                AstType::Identifier,
            ]
        );
    }

    #[test]
    fn test_thin_arrow_makes_procedure_class() {
        assert_eq!(
            kinds("(u32) -> u32"),
            [
                AstType::OpenProcedureClass,
                AstType::Identifier,
                AstType::EndScope,
                AstType::Identifier,
            ]
        );
    }

    #[test]
    fn test_only_the_last_closed_parenthesis_is_reclassified() {
        assert_eq!(
            kinds("(a)(b) => b"),
            [
                AstType::OpenPar,
                AstType::Identifier,
                AstType::EndScope,
                AstType::OpenProcedure,
                AstType::Identifier,
                AstType::EndScope,
                AstType::DoubleArrow,
                AstType::Identifier,
            ]
        );
    }

    #[test]
    fn test_arrow_without_parenthesis_is_an_error() {
        let err = lex_error("x => x");
        assert_eq!(err.kind, LexErrorKind::ExpectedParenthesis("=>"));
        assert_eq!(err.position, 2);
        let err = lex_error("[x] -> x");
        assert_eq!(err.kind, LexErrorKind::ExpectedParenthesis("->"));
    }

    #[test]
    fn test_dot_scopes() {
        assert_eq!(
            kinds("a.(b) a.[c] T.{d}"),
            [
                AstType::Identifier,
                AstType::GetProcedure,
                AstType::Identifier,
                AstType::EndScope,
                AstType::Identifier,
                AstType::FieldSubscript,
                AstType::Identifier,
                AstType::EndScope,
                AstType::Identifier,
                AstType::Initialize,
                AstType::Identifier,
                AstType::EndScope,
            ]
        );
    }

    #[test]
    fn test_direct_name_call() {
        let tokens = kinds_and_flags("f(x) f (x)");
        assert_eq!(tokens[1], (AstType::OpenPar, AstFlags::DIRECT_NAME));
        assert_eq!(tokens[5], (AstType::OpenPar, AstFlags::DIRECT_NAME));
        let tokens = kinds_and_flags("1 (x)");
        assert_eq!(tokens[1], (AstType::OpenPar, AstFlags::NONE));
    }

    #[test]
    fn test_newlines_end_statements_outside_scopes() {
        assert_eq!(
            kinds("a\nb\n"),
            [AstType::Identifier, AstType::Terminator, AstType::Identifier, AstType::Terminator]
        );
        assert_eq!(
            kinds("f(a,\n b)"),
            [
                AstType::Identifier,
                AstType::OpenPar,
                AstType::Identifier,
                AstType::Comma,
                AstType::Identifier,
                AstType::EndScope,
            ]
        );
        assert_eq!(kinds("a +\n b"), [AstType::Identifier, AstType::Add, AstType::Identifier]);
        assert_eq!(kinds("\n\na"), [AstType::Identifier]);
    }

    #[test]
    fn test_semicolons_collapse() {
        assert_eq!(kinds("a;;; b"), [AstType::Identifier, AstType::Semicolon, AstType::Identifier]);
        assert_eq!(kinds("a\n; b"), [AstType::Identifier, AstType::Terminator, AstType::Identifier]);
    }

    #[test]
    fn test_nul_ends_the_unit() {
        assert_eq!(kinds("a\0 garbage $$$"), [AstType::Identifier]);
    }

    #[test]
    fn test_scope_depth_limit() {
        let deep = "(".repeat(65);
        let err = lex_error(&deep);
        assert_eq!(err.kind, LexErrorKind::TooManyScopes);
        assert_eq!(err.position, 64);
    }
}
