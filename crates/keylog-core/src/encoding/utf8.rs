//! UTF-8 encoding restricted to the Basic Multilingual Plane.
//!
//! Layout translation yields UTF-16 code units, and only the first unit of
//! its output is ever used, so supplementary-plane characters cannot reach
//! the encoder.  Anything outside `0x0000..0x10000`, and lone surrogates, is
//! rejected instead of being written as malformed UTF-8.

use thiserror::Error;

/// First code point that needs a 4-byte sequence.
pub const MAX_SUPPORTED_CODEPOINT: u32 = 0xFFFF;

/// Errors from [`encode_codepoint`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The value needs a 4-byte sequence, which the encoder does not produce.
    #[error("code point U+{0:X} is outside the basic multilingual plane")]
    OutOfRange(u32),

    /// The value is a UTF-16 surrogate and has no UTF-8 encoding.
    #[error("code point U+{0:X} is a surrogate")]
    Surrogate(u32),
}

/// Appends the UTF-8 encoding of `ch` to `dest` and returns the bytes written.
///
/// # Errors
///
/// Returns [`EncodeError`] without touching `dest` when `ch` is a surrogate or
/// lies outside the basic multilingual plane.
///
/// # Examples
///
/// ```rust
/// use keylog_core::encoding::encode_codepoint;
///
/// let mut buf = Vec::new();
/// assert_eq!(encode_codepoint('é' as u32, &mut buf), Ok(2));
/// assert_eq!(buf, "é".as_bytes());
/// ```
pub fn encode_codepoint(ch: u32, dest: &mut Vec<u8>) -> Result<usize, EncodeError> {
    if ch > MAX_SUPPORTED_CODEPOINT {
        return Err(EncodeError::OutOfRange(ch));
    }
    if (0xD800..=0xDFFF).contains(&ch) {
        return Err(EncodeError::Surrogate(ch));
    }

    if ch < 0x80 {
        dest.push(ch as u8);
        Ok(1)
    } else if ch < 0x800 {
        dest.push(0xC0 | (ch >> 6) as u8);
        dest.push(0x80 | (ch & 0x3F) as u8);
        Ok(2)
    } else {
        dest.push(0xE0 | (ch >> 12) as u8);
        dest.push(0x80 | ((ch >> 6) & 0x3F) as u8);
        dest.push(0x80 | (ch & 0x3F) as u8);
        Ok(3)
    }
}

/// Appends an already-encoded glyph to `dest` and returns the bytes written.
///
/// Copying stops at the first NUL byte, so NUL-terminated glyph tables can be
/// passed as-is without the terminator leaking into the output.
pub fn append_pre_encoded_glyph(glyph: &[u8], dest: &mut Vec<u8>) -> usize {
    let len = glyph.iter().position(|&b| b == 0).unwrap_or(glyph.len());
    dest.extend_from_slice(&glyph[..len]);
    len
}
