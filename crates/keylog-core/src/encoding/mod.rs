//! Byte-level encoding of display tokens.

pub mod modifiers;
pub mod utf8;

pub use modifiers::format_modifiers;
pub use utf8::{append_pre_encoded_glyph, encode_codepoint, EncodeError};
