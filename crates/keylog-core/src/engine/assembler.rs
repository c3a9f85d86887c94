//! Assembly of display tokens and binary records.

use tracing::warn;

use crate::domain::{EncoderState, KeyEvent, KeyEventKind};
use crate::encoding::{append_pre_encoded_glyph, encode_codepoint, format_modifiers};
use crate::keymap::lookup_special_glyph;
use crate::protocol::BinaryRecord;
use crate::session::{check_idle, DEFAULT_IDLE_GAP_MS};

use super::token::{DisplayToken, MAX_TOKEN_LEN};

/// First code point of the Control Pictures block (␀).
const CONTROL_PICTURES_BASE: u32 = 0x2400;
/// ␡
const DELETE_PICTURE: u32 = 0x2421;
/// Replacement character for code points the encoder cannot represent.
const REPLACEMENT_CHARACTER: u32 = 0xFFFD;
/// Private-use range where macOS places function-key characters (arrows,
/// F-keys, Home/End).
const FUNCTION_KEY_RANGE: std::ops::RangeInclusive<u32> = 0xF700..=0xF8FF;

/// Tunables for the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Pause after which the next token starts a new line.
    pub idle_gap_ms: i64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            idle_gap_ms: DEFAULT_IDLE_GAP_MS,
        }
    }
}

/// Both renderings of one key event plus the state for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    /// Press or release, copied from the input event.
    pub kind: KeyEventKind,
    /// Token for the display stream.
    pub display: DisplayToken,
    /// Record for the binary log.
    pub record: BinaryRecord,
    /// State to pass to the next call.
    pub state: EncoderState,
}

impl EncodedEvent {
    /// The bytes to print on screen, or `None` for key releases.
    pub fn screen_output(&self) -> Option<&[u8]> {
        match self.kind {
            KeyEventKind::KeyDown => Some(self.display.as_bytes()),
            KeyEventKind::KeyUp => None,
        }
    }
}

/// Returns `true` if `ch` renders as a visible character.
///
/// Control characters, NUL, and the function-key private-use range are not
/// printable; for those keys a held Shift is shown explicitly.
pub fn is_printable(ch: u32) -> bool {
    if FUNCTION_KEY_RANGE.contains(&ch) {
        return false;
    }
    char::from_u32(ch).map_or(false, |c| !c.is_control())
}

/// Encodes `event` timestamped at `now_millis`.
///
/// `now_millis == None` means the clock could not be read: no session boundary
/// is inserted, the state is carried over unchanged and the record timestamp
/// is `0`.
pub fn encode_event(
    event: &KeyEvent,
    state: EncoderState,
    now_millis: Option<i64>,
    config: &EncoderConfig,
) -> EncodedEvent {
    let (idle, state) = check_idle(state, now_millis, config.idle_gap_ms);

    let mut display = DisplayToken::new(idle);
    let buf = display.buffer_mut();
    format_modifiers(event.flags, is_printable(event.translated_char), buf);
    append_base_glyph(event.key_code, event.translated_char, buf);
    debug_assert!(display.len() <= MAX_TOKEN_LEN);

    let record = BinaryRecord {
        timestamp_millis: now_millis.unwrap_or(0),
        flags: event.flags,
        key_code: event.key_code,
        display: display.body().to_vec(),
    };

    EncodedEvent {
        kind: event.kind,
        display,
        record,
        state,
    }
}

/// Appends the keycap glyph for `key_code`, or the translated character when
/// the key has none.  Returns the bytes written.
///
/// - NUL (no character) writes nothing.
/// - Other C0 controls and DEL are drawn with their Control Pictures glyph, so
///   the output never contains a raw line feed.
/// - Code points the encoder rejects become U+FFFD.
fn append_base_glyph(key_code: u16, ch: u32, dest: &mut Vec<u8>) -> usize {
    if let Some(glyph) = lookup_special_glyph(key_code) {
        return append_pre_encoded_glyph(glyph, dest);
    }

    let visible = match ch {
        0 => return 0,
        0x01..=0x1F => CONTROL_PICTURES_BASE + ch,
        0x7F => DELETE_PICTURE,
        _ => ch,
    };

    match encode_codepoint(visible, dest) {
        Ok(n) => n,
        Err(e) => {
            warn!(key_code, error = %e, "unencodable character; writing U+FFFD");
            encode_codepoint(REPLACEMENT_CHARACTER, dest).unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModifierFlags;
    use crate::keymap::keycodes;

    fn down(key_code: u16, flags: u64, ch: char) -> KeyEvent {
        KeyEvent::key_down(key_code, ModifierFlags(flags), ch as u32)
    }

    fn encode_at(event: &KeyEvent, last: i64, now: i64) -> EncodedEvent {
        let state = EncoderState {
            last_event_millis: last,
        };
        encode_event(event, state, Some(now), &EncoderConfig::default())
    }

    fn display(encoded: &EncodedEvent) -> &str {
        std::str::from_utf8(encoded.display.as_bytes()).expect("display is UTF-8")
    }

    #[test]
    fn test_plain_letter() {
        let out = encode_at(&down(keycodes::ANSI_A, 0, 'a'), 0, 1_000);
        assert_eq!(display(&out), "a");
        assert_eq!(out.record.display, b"a");
        assert_eq!(out.state.last_event_millis, 1_000);
    }

    #[test]
    fn test_shifted_letter_has_no_shift_glyph() {
        let out = encode_at(&down(keycodes::ANSI_A, ModifierFlags::SHIFT, 'A'), 0, 1_000);
        assert_eq!(display(&out), "A");
    }

    #[test]
    fn test_command_c() {
        let out = encode_at(&down(keycodes::ANSI_C, ModifierFlags::COMMAND, 'c'), 0, 1_000);
        assert_eq!(display(&out), "⌘c");
    }

    #[test]
    fn test_shift_arrow_shows_shift_before_arrow() {
        // macOS reports arrow keys with a function-key private-use character.
        let event = KeyEvent::key_down(keycodes::LEFT_ARROW, ModifierFlags(ModifierFlags::SHIFT), 0xF702);
        let out = encode_at(&event, 0, 1_000);
        assert_eq!(display(&out), "⇧←");
    }

    #[test]
    fn test_shift_return_shows_shift() {
        let out = encode_at(&down(keycodes::RETURN, ModifierFlags::SHIFT, '\r'), 0, 1_000);
        assert_eq!(display(&out), "⇧↩");
    }

    #[test]
    fn test_special_glyph_wins_over_translated_char() {
        let out = encode_at(&down(keycodes::SPACE, 0, ' '), 0, 1_000);
        assert_eq!(display(&out), "␣");
    }

    #[test]
    fn test_idle_gap_prefixes_line_break_in_display_only() {
        let out = encode_at(&down(keycodes::RETURN, 0, '\r'), 1_000, 2_000);
        assert!(out.display.is_session_boundary());
        assert_eq!(display(&out), "\n↩");
        assert_eq!(out.record.display, "↩".as_bytes());
        assert_eq!(out.record.timestamp_millis, 2_000);
    }

    #[test]
    fn test_short_gap_has_no_line_break() {
        let out = encode_at(&down(keycodes::ANSI_A, 0, 'a'), 1_000, 1_100);
        assert!(!out.display.is_session_boundary());
    }

    #[test]
    fn test_unavailable_clock_is_soft() {
        let state = EncoderState {
            last_event_millis: 1_000,
        };
        let out = encode_event(&down(keycodes::ANSI_A, 0, 'a'), state, None, &EncoderConfig::default());
        assert!(!out.display.is_session_boundary());
        assert_eq!(out.state, state);
        assert_eq!(out.record.timestamp_millis, 0);
        assert_eq!(out.record.display, b"a");
    }

    #[test]
    fn test_nul_character_produces_empty_base_glyph() {
        let event = KeyEvent::key_down(keycodes::F1, ModifierFlags::NONE, 0);
        let out = encode_at(&event, 0, 1_000);
        assert!(out.display.is_empty());
        assert!(out.record.display.is_empty());
    }

    #[test]
    fn test_nul_character_with_modifiers_keeps_modifiers() {
        let event = KeyEvent::key_down(keycodes::F1, ModifierFlags(ModifierFlags::SHIFT), 0);
        let out = encode_at(&event, 0, 1_000);
        assert_eq!(display(&out), "⇧");
    }

    #[test]
    fn test_control_characters_use_control_pictures() {
        let out = encode_at(
            &KeyEvent::key_down(keycodes::KEYPAD_ENTER, ModifierFlags::NONE, 0x03),
            0,
            1_000,
        );
        assert_eq!(display(&out), "␃");

        let out = encode_at(&KeyEvent::key_down(38, ModifierFlags::NONE, 0x0A), 0, 1_000);
        assert_eq!(display(&out), "␊");
        assert!(!out.record.display.contains(&b'\n'));

        let out = encode_at(&KeyEvent::key_down(200, ModifierFlags::NONE, 0x7F), 0, 1_000);
        assert_eq!(display(&out), "␡");
    }

    #[test]
    fn test_chords_show_layout_character_not_modified_one() {
        // Capture translates with the Shift state only, so ⌃⇧C arrives as 'C'.
        let ctrl_shift = ModifierFlags(ModifierFlags::CONTROL | ModifierFlags::SHIFT);
        let out = encode_at(&down(keycodes::ANSI_C, ctrl_shift.0, 'C'), 0, 1_000);
        assert_eq!(display(&out), "⌃C");

        let out = encode_at(&down(keycodes::ANSI_C, ModifierFlags::CONTROL, 'c'), 0, 1_000);
        assert_eq!(display(&out), "⌃c");

        let out = encode_at(&down(keycodes::ANSI_A, ModifierFlags::OPTION, 'a'), 0, 1_000);
        assert_eq!(display(&out), "⌥a");
    }

    #[test]
    fn test_out_of_range_character_becomes_replacement() {
        let out = encode_at(&KeyEvent::key_down(0, ModifierFlags::NONE, 0x1F600), 0, 1_000);
        assert_eq!(display(&out), "\u{FFFD}");
    }

    #[test]
    fn test_key_up_has_record_but_no_screen_output() {
        let event = KeyEvent::key_up(keycodes::ANSI_A, ModifierFlags::NONE, 'a' as u32);
        let out = encode_at(&event, 0, 1_000);
        assert_eq!(out.screen_output(), None);
        assert_eq!(out.record.display, b"a");
    }

    #[test]
    fn test_key_down_screen_output_includes_line_break() {
        let out = encode_at(&down(keycodes::ANSI_A, 0, 'a'), 1_000, 5_000);
        assert_eq!(out.screen_output(), Some(&b"\na"[..]));
    }

    #[test]
    fn test_printability() {
        assert!(is_printable('a' as u32));
        assert!(is_printable(' ' as u32));
        assert!(is_printable('é' as u32));
        assert!(!is_printable(0));
        assert!(!is_printable('\r' as u32));
        assert!(!is_printable(0x7F));
        assert!(!is_printable(0x9B));
        assert!(!is_printable(0xF700));
        assert!(!is_printable(0xD800));
    }

    #[test]
    fn test_worst_case_token_fits() {
        let all = ModifierFlags::CONTROL
            | ModifierFlags::OPTION
            | ModifierFlags::SHIFT
            | ModifierFlags::COMMAND;
        let out = encode_at(&KeyEvent::key_down(keycodes::UP_ARROW, ModifierFlags(all), 0xF700), 1, 10_000);
        assert_eq!(display(&out), "\n⌃⌥⇧⌘↓");
        assert!(out.display.len() <= MAX_TOKEN_LEN);
    }
}
