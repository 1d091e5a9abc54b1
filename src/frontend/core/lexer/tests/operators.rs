//! 运算符测试

use super::{kinds, kinds_and_flags};
use crate::frontend::core::lexer::{AstFlags, AstType};

#[cfg(test)]
mod lexer_operators_tests {
    use super::*;

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds("a == b ** c << d >> e"),
            [
                AstType::Identifier,
                AstType::Equal,
                AstType::Identifier,
                AstType::Power,
                AstType::Identifier,
                AstType::ShiftLeft,
                AstType::Identifier,
                AstType::ShiftRight,
                AstType::Identifier,
            ]
        );
        assert_eq!(kinds("a <> b"), [AstType::Identifier, AstType::Concat, AstType::Identifier]);
        assert_eq!(kinds("a >< b"), [AstType::Identifier, AstType::CrossProduct, AstType::Identifier]);
        assert_eq!(kinds("a |> f"), [AstType::Identifier, AstType::Pipe, AstType::Identifier]);
        assert_eq!(kinds("a ~%~ b"), [AstType::Identifier, AstType::Reinterpret, AstType::Identifier]);
        assert_eq!(kinds("a ~ b"), [AstType::Identifier, AstType::Cast, AstType::Identifier]);
    }

    #[test]
    fn test_negated_comparisons() {
        let negate = AstFlags::NEGATE;
        assert_eq!(kinds_and_flags("!=")[0], (AstType::Equal, negate));
        assert_eq!(kinds_and_flags("<=")[0], (AstType::Greater, negate));
        assert_eq!(kinds_and_flags(">=")[0], (AstType::Less, negate));
        assert_eq!(kinds_and_flags("!|")[0], (AstType::LogicOr, negate));
        assert_eq!(kinds_and_flags("!&")[0], (AstType::LogicAnd, negate));
        assert_eq!(kinds_and_flags("!@=")[0], (AstType::Contains, negate));
        assert_eq!(kinds_and_flags("^|")[0], (AstType::BitOr, negate));
        assert_eq!(kinds_and_flags("^&")[0], (AstType::BitAnd, negate));
        assert_eq!(kinds_and_flags("@=")[0], (AstType::Contains, AstFlags::NONE));
        assert_eq!(kinds_and_flags("<")[0], (AstType::Less, AstFlags::NONE));
    }

    #[test]
    fn test_compound_assignment_needs_adjacency() {
        assert_eq!(kinds("a += 1"), [AstType::Identifier, AstType::AddAssign, AstType::Unsigned]);
        assert_eq!(kinds("a **= 2"), [AstType::Identifier, AstType::PowerAssign, AstType::Unsigned]);
        assert_eq!(kinds("a <<= 2"), [AstType::Identifier, AstType::ShiftLeftAssign, AstType::Unsigned]);
        assert_eq!(kinds("a <>= s"), [AstType::Identifier, AstType::ConcatAssign, AstType::Identifier]);
        assert_eq!(
            kinds("a + = 1"),
            [AstType::Identifier, AstType::Add, AstType::Assign, AstType::Unsigned]
        );
    }

    #[test]
    fn test_variable_declarations_rewrite_identifier() {
        assert_eq!(
            kinds_and_flags("x: u32"),
            [
                (AstType::Variable, AstFlags::CLASS_SPEC),
                (AstType::Identifier, AstFlags::NONE),
            ]
        );
        assert_eq!(kinds_and_flags("x := 1")[0], (AstType::Variable, AstFlags::INITIALIZED));
        assert_eq!(
            kinds_and_flags("x :: 1")[0],
            (AstType::Variable, AstFlags::CONSTANT | AstFlags::INITIALIZED)
        );
    }

    #[test]
    fn test_prefix_like_symbols() {
        assert_eq!(
            kinds("@ # $ _ $T"),
            [
                AstType::SelfValue,
                AstType::Pound,
                AstType::Infered,
                AstType::Ignored,
                AstType::NamedInfered,
            ]
        );
        assert_eq!(kinds("a .. b"), [AstType::Identifier, AstType::Range, AstType::Identifier]);
        assert_eq!(kinds("...a"), [AstType::Splat, AstType::Identifier]);
        assert_eq!(kinds("a.b"), [AstType::Identifier, AstType::GetField]);
        assert_eq!(kinds("!a"), [AstType::LogicNot, AstType::Identifier]);
    }

    #[test]
    fn test_dereference_quote() {
        assert_eq!(kinds("p'"), [AstType::Identifier, AstType::Dereference]);
        assert_eq!(kinds("p' + 1"), [AstType::Identifier, AstType::Dereference, AstType::Add, AstType::Unsigned]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("return x; defer y"),
            [
                AstType::Return,
                AstType::Identifier,
                AstType::Semicolon,
                AstType::Defer,
                AstType::Identifier,
            ]
        );
        assert_eq!(kinds("returned"), [AstType::Identifier]);
        assert_eq!(kinds("_x"), [AstType::Identifier]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(kinds("a // trailing\n"), [AstType::Identifier, AstType::Terminator]);
        assert_eq!(kinds("a /* outer /* inner */ still */ + b"), [AstType::Identifier, AstType::Add, AstType::Identifier]);
    }
}
