//! One-code-point UTF-8 decode and encode

/// Largest Unicode scalar value
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Decode one code point starting at `*pos`, advancing past it.
/// Returns `None` on a malformed, overlong or truncated sequence.
pub fn decode(
    bytes: &[u8],
    pos: &mut usize,
) -> Option<u32> {
    let first = *bytes.get(*pos)?;
    let (len, init) = match first {
        0x00..=0x7F => (1, first as u32),
        0xC2..=0xDF => (2, (first & 0x1F) as u32),
        0xE0..=0xEF => (3, (first & 0x0F) as u32),
        0xF0..=0xF4 => (4, (first & 0x07) as u32),
        _ => return None,
    };
    let mut code = init;
    for offset in 1..len {
        let byte = *bytes.get(*pos + offset)?;
        if byte & 0xC0 != 0x80 {
            return None;
        }
        code = (code << 6) | (byte & 0x3F) as u32;
    }
    let overlong = match len {
        3 => code < 0x800,
        4 => code < 0x10000,
        _ => false,
    };
    if overlong || code > MAX_CODE_POINT || (0xD800..=0xDFFF).contains(&code) {
        return None;
    }
    *pos += len;
    Some(code)
}

/// Append the UTF-8 encoding of `code`; returns the number of bytes written,
/// or `None` if `code` is not a scalar value.
pub fn encode(
    code: u32,
    out: &mut Vec<u8>,
) -> Option<usize> {
    let c = char::from_u32(code)?;
    let mut buf = [0u8; 4];
    let encoded = c.encode_utf8(&mut buf);
    out.extend_from_slice(encoded.as_bytes());
    Some(encoded.len())
}
