//! Keyword recognition
//!
//! Keywords are 2 to 8 bytes long, so a candidate word is packed into a
//! little-endian `u64` and compared against a precomputed table.

use super::tokens::AstType;

pub const MIN_KEYWORD_LEN: usize = 2;
pub const MAX_KEYWORD_LEN: usize = 8;

const fn pack(word: &[u8]) -> u64 {
    let mut packed = 0u64;
    let mut i = 0;
    while i < word.len() {
        packed |= (word[i] as u64) << (8 * i);
        i += 1;
    }
    packed
}

static KEYWORDS: [(u64, AstType); 11] = [
    (pack(b"return"), AstType::Return),
    (pack(b"defer"), AstType::Defer),
    (pack(b"try"), AstType::Try),
    (pack(b"assert"), AstType::Assert),
    (pack(b"with"), AstType::With),
    (pack(b"if"), AstType::If),
    (pack(b"else"), AstType::Else),
    (pack(b"while"), AstType::While),
    (pack(b"for"), AstType::For),
    (pack(b"goto"), AstType::Goto),
    (pack(b"import"), AstType::Import),
];

/// Keyword kind for `word`, if it is one
pub fn lookup(word: &[u8]) -> Option<AstType> {
    if !(MIN_KEYWORD_LEN..=MAX_KEYWORD_LEN).contains(&word.len()) {
        return None;
    }
    let packed = pack(word);
    KEYWORDS
        .iter()
        .find(|(text, _)| *text == packed)
        .map(|&(_, kind)| kind)
}
