//! Modifier glyph prefix.
//!
//! Glyphs are written in the order macOS menus use: ⌃ ⌥ ⇧ ⌘.  Shift is left
//! out when the base character is printable, because the translated character
//! already reflects it (`A` rather than `⇧a`).

use crate::domain::ModifierFlags;
use crate::encoding::utf8::append_pre_encoded_glyph;
use crate::keymap::glyphs::{COMMAND_GLYPH, CONTROL_GLYPH, OPTION_GLYPH, SHIFT_GLYPH};

/// Appends the glyphs for the modifiers held in `flags` and returns the bytes
/// written.
pub fn format_modifiers(flags: ModifierFlags, base_is_printable: bool, dest: &mut Vec<u8>) -> usize {
    let mut written = 0;
    if flags.control() {
        written += append_pre_encoded_glyph(CONTROL_GLYPH, dest);
    }
    if flags.option() {
        written += append_pre_encoded_glyph(OPTION_GLYPH, dest);
    }
    if flags.shift() && !base_is_printable {
        written += append_pre_encoded_glyph(SHIFT_GLYPH, dest);
    }
    if flags.command() {
        written += append_pre_encoded_glyph(COMMAND_GLYPH, dest);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(bits: u64, printable: bool) -> String {
        let mut buf = Vec::new();
        let n = format_modifiers(ModifierFlags(bits), printable, &mut buf);
        assert_eq!(n, buf.len());
        String::from_utf8(buf).expect("modifier glyphs are UTF-8")
    }

    #[test]
    fn test_no_modifiers_writes_nothing() {
        assert_eq!(format(0, true), "");
        assert_eq!(format(0, false), "");
    }

    #[test]
    fn test_control_command_is_ctrl_then_cmd() {
        let out = format(ModifierFlags::CONTROL | ModifierFlags::COMMAND, true);
        assert_eq!(out.as_bytes(), [CONTROL_GLYPH, COMMAND_GLYPH].concat());
        assert!(!out.contains('⇧'));
        assert!(!out.contains('⌥'));
    }

    #[test]
    fn test_all_modifiers_in_fixed_order() {
        let all = ModifierFlags::CONTROL
            | ModifierFlags::OPTION
            | ModifierFlags::SHIFT
            | ModifierFlags::COMMAND;
        assert_eq!(format(all, false), "⌃⌥⇧⌘");
        assert_eq!(format(all, true), "⌃⌥⌘");
    }

    #[test]
    fn test_shift_suppressed_for_printable_base() {
        assert_eq!(format(ModifierFlags::SHIFT, true), "");
    }

    #[test]
    fn test_shift_emitted_for_non_printable_base() {
        assert_eq!(format(ModifierFlags::SHIFT, false), "⇧");
    }

    #[test]
    fn test_option_shift_on_printable_base() {
        assert_eq!(format(ModifierFlags::OPTION | ModifierFlags::SHIFT, true), "⌥");
    }

    #[test]
    fn test_appends_after_existing_bytes() {
        let mut buf = vec![b'\n'];
        let n = format_modifiers(ModifierFlags(ModifierFlags::COMMAND), true, &mut buf);
        assert_eq!(n, 3);
        assert_eq!(buf, "\n⌘".as_bytes());
    }
}
