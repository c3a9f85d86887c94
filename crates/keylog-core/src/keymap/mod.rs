//! Key code tables.
//!
//! Maps macOS virtual key codes of non-printing keys to their keycap glyphs,
//! and holds the modifier glyphs used by the modifier formatter.

pub mod glyphs;
pub mod keycodes;

pub use glyphs::lookup_special_glyph;
