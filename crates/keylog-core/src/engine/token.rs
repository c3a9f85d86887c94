//! The human-readable rendering of one key event.

use std::fmt;

/// Upper bound on a token's length: a line break, four 3-byte modifier
/// glyphs and one 3-byte base glyph come to 16 bytes.
pub const MAX_TOKEN_LEN: usize = 32;

/// UTF-8 bytes for one key event, optionally preceded by a line break that
/// marks the start of a new typing burst.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayToken {
    bytes: Vec<u8>,
    session_boundary: bool,
}

impl DisplayToken {
    pub(crate) fn new(session_boundary: bool) -> Self {
        let mut bytes = Vec::with_capacity(MAX_TOKEN_LEN);
        if session_boundary {
            bytes.push(b'\n');
        }
        Self {
            bytes,
            session_boundary,
        }
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }

    /// The full token, line break included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The token without the session-boundary line break.  This is what the
    /// binary record stores.
    pub fn body(&self) -> &[u8] {
        if self.session_boundary {
            &self.bytes[1..]
        } else {
            &self.bytes
        }
    }

    /// Returns `true` if the token starts a new line after an idle gap.
    pub fn is_session_boundary(&self) -> bool {
        self.session_boundary
    }

    /// Length in bytes, line break included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the token has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for DisplayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}
