//! Special-key and modifier glyphs.
//!
//! Non-printing keys (Return, Tab, arrows, ...) are rendered with the keyboard
//! symbol Apple prints on the keycap.  All glyphs are 3-byte UTF-8 sequences
//! from the Miscellaneous Technical, Arrows and Control Pictures blocks, none of
//! which contain the byte `0x0A`.
//!
//! Binary logs store these bytes verbatim, so changing an entry changes how
//! older logs compare against newer ones.

use super::keycodes;

/// ⌃
pub const CONTROL_GLYPH: &[u8] = &[0xE2, 0x8C, 0x83];
/// ⌥
pub const OPTION_GLYPH: &[u8] = &[0xE2, 0x8C, 0xA5];
/// ⇧
pub const SHIFT_GLYPH: &[u8] = &[0xE2, 0x87, 0xA7];
/// ⌘
pub const COMMAND_GLYPH: &[u8] = &[0xE2, 0x8C, 0x98];

/// Glyphs for keys whose layout translation is not worth showing.
///
/// Down and Up carry ↑ and ↓ respectively; existing logs were written with
/// this mapping.
pub const SPECIAL_GLYPHS: &[(u16, &[u8])] = &[
    (keycodes::RETURN, &[0xE2, 0x86, 0xA9]),         // ↩
    (keycodes::TAB, &[0xE2, 0x87, 0xA5]),            // ⇥
    (keycodes::SPACE, &[0xE2, 0x90, 0xA3]),          // ␣
    (keycodes::DELETE, &[0xE2, 0x8C, 0xAB]),         // ⌫
    (keycodes::ESCAPE, &[0xE2, 0x8E, 0x8B]),         // ⎋
    (keycodes::HOME, &[0xE2, 0x86, 0x96]),           // ↖
    (keycodes::PAGE_UP, &[0xE2, 0x87, 0x9E]),        // ⇞
    (keycodes::FORWARD_DELETE, &[0xE2, 0x8C, 0xA6]), // ⌦
    (keycodes::END, &[0xE2, 0x86, 0x98]),            // ↘
    (keycodes::PAGE_DOWN, &[0xE2, 0x87, 0x9F]),      // ⇟
    (keycodes::LEFT_ARROW, &[0xE2, 0x86, 0x90]),     // ←
    (keycodes::RIGHT_ARROW, &[0xE2, 0x86, 0x92]),    // →
    (keycodes::DOWN_ARROW, &[0xE2, 0x86, 0x91]),     // ↑
    (keycodes::UP_ARROW, &[0xE2, 0x86, 0x93]),       // ↓
];

/// Returns the keycap glyph for `key_code`, or `None` when the key should be
/// rendered from its translated character instead.
///
/// # Panics
///
/// This function never panics.
pub fn lookup_special_glyph(key_code: u16) -> Option<&'static [u8]> {
    SPECIAL_GLYPHS
        .iter()
        .find(|(code, _)| *code == key_code)
        .map(|(_, glyph)| *glyph)
}
