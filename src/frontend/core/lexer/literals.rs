//! Literal scanning
//! Numbers (decimal, binary, octal, hex, roman, floats) and characters with
//! escape sequences. Strings reuse the character scanner.

use super::tokens::{AstType, Data};
use super::utf8;

/// Byte cursor over a source unit. Reading past the end yields `0`, the
/// same as reading the terminating NUL of the buffer.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'s> {
    src: &'s [u8],
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(src: &'s [u8]) -> Self {
        Self { src, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_pos(
        &mut self,
        pos: usize,
    ) {
        self.pos = pos;
    }

    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek_at(
        &self,
        offset: usize,
    ) -> u8 {
        self.src.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline]
    pub fn bump(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub fn advance(
        &mut self,
        count: usize,
    ) {
        self.pos += count;
    }

    /// Consume `byte` if it is next
    #[inline]
    pub fn eat(
        &mut self,
        byte: u8,
    ) -> bool {
        if self.peek() == byte {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn slice(
        &self,
        start: usize,
    ) -> &'s [u8] {
        &self.src[start..self.pos]
    }

    /// Length of the name run starting at the cursor
    pub fn name_len(&self) -> usize {
        let mut len = 0;
        while is_name_char(self.peek_at(len)) {
            len += 1;
        }
        len
    }

    fn skip_separators(&mut self) {
        while self.peek() == b'_' {
            self.pos += 1;
        }
    }

    fn decode_utf8(&mut self) -> Option<u32> {
        utf8::decode(self.src, &mut self.pos)
    }
}

#[inline]
pub fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[inline]
pub fn is_first_name_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[inline]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Why a number failed to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    Invalid,
    InvalidFloat,
}

/// Scan a number literal at the cursor. A leading `.` scans a fraction
/// with an implied zero integer part.
pub fn scan_number(cur: &mut Cursor<'_>) -> Result<(AstType, Data), NumberError> {
    if cur.peek() == b'.' {
        let value = scan_float_tail(cur, 0).ok_or(NumberError::InvalidFloat)?;
        reject_trailing_name(cur, NumberError::InvalidFloat)?;
        return Ok(value);
    }

    if cur.peek() == b'0' && matches!(cur.peek_at(1), b'b' | b'o' | b'x' | b'r') {
        let prefix = cur.peek_at(1);
        cur.advance(2);
        let value = match prefix {
            b'b' => scan_radix(cur, 1),
            b'o' => scan_radix(cur, 3),
            b'x' => scan_radix(cur, 4),
            _ => scan_roman(cur),
        }
        .ok_or(NumberError::Invalid)?;
        reject_trailing_name(cur, NumberError::Invalid)?;
        return Ok((AstType::Unsigned, Data(value)));
    }

    let integer = scan_decimal(cur).ok_or(NumberError::Invalid)?;
    let value = if cur.peek() == b'.' && is_digit(cur.peek_at(1)) {
        scan_float_tail(cur, integer).ok_or(NumberError::InvalidFloat)?
    } else if cur.eat(b'f') {
        (AstType::Float32, Data::from_f32(integer as f32))
    } else {
        (AstType::Unsigned, Data(integer))
    };
    let error = match value.0 {
        AstType::Unsigned => NumberError::Invalid,
        _ => NumberError::InvalidFloat,
    };
    reject_trailing_name(cur, error)?;
    Ok(value)
}

fn reject_trailing_name(
    cur: &Cursor<'_>,
    error: NumberError,
) -> Result<(), NumberError> {
    if is_name_char(cur.peek()) {
        Err(error)
    } else {
        Ok(())
    }
}

fn scan_decimal(cur: &mut Cursor<'_>) -> Option<u64> {
    let mut value = 0u64;
    while is_digit(cur.peek()) {
        value = value.checked_mul(10)?.checked_add((cur.peek() - b'0') as u64)?;
        cur.bump();
        cur.skip_separators();
    }
    Some(value)
}

/// Binary, octal and hex digits; `bits` is the width of one digit
fn scan_radix(
    cur: &mut Cursor<'_>,
    bits: u32,
) -> Option<u64> {
    let radix = 1u32 << bits;
    let mut value = 0u64;
    let mut digits = 0;
    while let Some(digit) = (cur.peek() as char).to_digit(radix) {
        if value.leading_zeros() < bits {
            return None;
        }
        value = (value << bits) | digit as u64;
        digits += 1;
        cur.bump();
        cur.skip_separators();
    }
    (digits > 0).then_some(value)
}

/// Roman numerals, greedy from the largest symbol
fn scan_roman(cur: &mut Cursor<'_>) -> Option<u64> {
    const SYMBOLS: [(&[u8], u64); 13] = [
        (b"M", 1000),
        (b"CM", 900),
        (b"D", 500),
        (b"CD", 400),
        (b"C", 100),
        (b"XC", 90),
        (b"L", 50),
        (b"XL", 40),
        (b"X", 10),
        (b"IX", 9),
        (b"V", 5),
        (b"IV", 4),
        (b"I", 1),
    ];
    let mut value = 0u64;
    let mut matched = false;
    for (symbol, amount) in SYMBOLS {
        loop {
            let mut probe = *cur;
            let hit = symbol.iter().all(|&c| {
                let ok = probe.peek() == c;
                if ok {
                    probe.bump();
                    probe.skip_separators();
                }
                ok
            });
            if !hit {
                break;
            }
            *cur = probe;
            value = value.checked_add(amount)?;
            matched = true;
        }
    }
    matched.then_some(value)
}

/// `.digits` with an optional `f` suffix
fn scan_float_tail(
    cur: &mut Cursor<'_>,
    integer: u64,
) -> Option<(AstType, Data)> {
    if !cur.eat(b'.') || !is_digit(cur.peek()) {
        return None;
    }
    let mut fraction = 0u64;
    let mut width = 0i32;
    while is_digit(cur.peek()) {
        fraction = fraction.checked_mul(10)?.checked_add((cur.peek() - b'0') as u64)?;
        width += 1;
        cur.bump();
        cur.skip_separators();
    }
    let value = integer as f64 + fraction as f64 / 10f64.powi(width);
    if cur.eat(b'f') {
        Some((AstType::Float32, Data::from_f32(value as f32)))
    } else {
        Some((AstType::Float64, Data::from_f64(value)))
    }
}

/// One unit of literal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanned {
    Code(u32),
    /// Backslash line continuation, produces nothing
    Continuation,
}

/// Scan one possibly escaped character.
/// Returns `None` for an invalid escape or malformed UTF-8, leaving the
/// cursor wherever scanning stopped.
pub fn scan_character(cur: &mut Cursor<'_>) -> Option<Scanned> {
    if cur.peek() != b'\\' {
        if cur.peek() == 0 {
            return None;
        }
        return cur.decode_utf8().map(Scanned::Code);
    }
    let escaped = cur.peek_at(1);
    let code = match escaped {
        b'\'' | b'"' | b'\\' => escaped as u32,
        // a backslash before punctuation stands for itself
        b'@' | b'#' | b'$' | b'%' | b'^' | b'&' | b'*' | b'(' | b')' | b'[' | b']' | b'{' | b'}' => {
            cur.bump();
            return Some(Scanned::Code(b'\\' as u32));
        }
        b'x' | b'o' => {
            cur.advance(2);
            return scan_code(cur, if escaped == b'x' { 16 } else { 8 }).map(Scanned::Code);
        }
        b'0'..=b'9' => {
            cur.bump();
            return scan_code(cur, 10).map(Scanned::Code);
        }
        b'a' => 0x07,
        b'b' => 0x08,
        b'e' => 0x1B,
        b'f' => 0x0C,
        b'r' => b'\r' as u32,
        b'n' => b'\n' as u32,
        b't' => b'\t' as u32,
        b'v' => 0x0B,
        b'\n' | 0x0B | b'_' => {
            cur.advance(2);
            return Some(Scanned::Continuation);
        }
        _ => return None,
    };
    cur.advance(2);
    Some(Scanned::Code(code))
}

fn scan_code(
    cur: &mut Cursor<'_>,
    radix: u32,
) -> Option<u32> {
    let mut code = 0u32;
    let mut digits = 0;
    while let Some(digit) = (cur.peek() as char).to_digit(radix) {
        code = code.checked_mul(radix)?.checked_add(digit)?;
        digits += 1;
        cur.bump();
    }
    (digits > 0 && char::from_u32(code).is_some()).then_some(code)
}
