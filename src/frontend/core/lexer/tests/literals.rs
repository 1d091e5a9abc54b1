//! 字面量测试

use super::{first_data, kinds, lex_full};
use crate::frontend::core::arena::Offset;
use crate::frontend::core::lexer::{AstType, Data};

#[cfg(test)]
mod lexer_literals_tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(first_data("42"), (AstType::Unsigned, Data(42)));
        assert_eq!(first_data("0x2A"), (AstType::Unsigned, Data(42)));
        assert_eq!(first_data("0b10_1010"), (AstType::Unsigned, Data(42)));
        assert_eq!(first_data("0rXLII"), (AstType::Unsigned, Data(42)));
        assert_eq!(first_data("0.25"), (AstType::Float64, Data::from_f64(0.25)));
        assert_eq!(first_data("0.5f"), (AstType::Float32, Data::from_f32(0.5)));
        assert_eq!(first_data(".75"), (AstType::Float64, Data::from_f64(0.75)));
    }

    #[test]
    fn test_range_between_integers() {
        assert_eq!(kinds("1..5"), [AstType::Unsigned, AstType::Range, AstType::Unsigned]);
    }

    #[test]
    fn test_character_literals() {
        assert_eq!(first_data("'a'"), (AstType::Character, Data::from_code('a' as u32)));
        assert_eq!(first_data("'\\n'"), (AstType::Character, Data::from_code('\n' as u32)));
        assert_eq!(first_data("'λ'"), (AstType::Character, Data::from_code('λ' as u32)));
        assert_eq!(first_data("'\\x7f'"), (AstType::Character, Data::from_code(0x7f)));
    }

    #[test]
    fn test_string_goes_to_statics() {
        let lexed = lex_full("s := \"hi\\tthere\"");
        let tokens = lexed.tokens.unwrap();
        let (_, node, data) = tokens.iter().nth(1).unwrap();
        assert_eq!(node.kind, AstType::String);
        let buf = data.unwrap().as_static();
        assert_eq!(buf.offset % 8, 0);
        assert_eq!(buf.size, 8);
        assert_eq!(lexed.statics.bytes(Offset(buf.offset), 9), b"hi\tthere\0");
    }

    #[test]
    fn test_line_continuation_before_closing_quote() {
        let lexed = lex_full("s := \"ab\\\n\"\nt := 1");
        let tokens = lexed.tokens.unwrap();
        let (_, node, data) = tokens.iter().nth(1).unwrap();
        assert_eq!(node.kind, AstType::String);
        let buf = data.unwrap().as_static();
        assert_eq!(buf.size, 2);
        assert_eq!(lexed.statics.bytes(Offset(buf.offset), 3), b"ab\0");
        // the next line still lexes
        assert!(tokens.iter().any(|(_, node, _)| node.kind == AstType::Unsigned));
    }

    #[test]
    fn test_line_continuation_inside_string() {
        let lexed = lex_full("\"a\\\nb\"");
        let tokens = lexed.tokens.unwrap();
        let buf = tokens.iter().next().unwrap().2.unwrap().as_static();
        assert_eq!(lexed.statics.bytes(Offset(buf.offset), 3), b"ab\0");
    }

    #[test]
    fn test_strings_are_aligned() {
        let lexed = lex_full("\"abc\" \"de\"");
        let tokens = lexed.tokens.unwrap();
        let offsets: Vec<u32> = tokens
            .iter()
            .filter_map(|(_, _, data)| data.map(|d| d.as_static().offset))
            .collect();
        assert_eq!(offsets, [0, 8]);
    }

    #[test]
    fn test_identifiers_are_interned() {
        let lexed = lex_full("foo bar foo");
        let tokens = lexed.tokens.unwrap();
        let ids: Vec<_> = tokens
            .iter()
            .filter_map(|(_, _, data)| data.map(Data::as_name))
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], ids[2]);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(lexed.names.resolve(ids[1]), Some(&b"bar"[..]));
    }

    #[test]
    fn test_identifier_count_is_length() {
        let lexed = lex_full("counter");
        let tokens = lexed.tokens.unwrap();
        let (_, node, _) = tokens.iter().next().unwrap();
        assert_eq!(node.count, 7);
    }
}
