//! Integration tests for the keystroke encoding pipeline.
//!
//! These tests drive the public API end to end: key events go through the
//! encoder, records are written into one log buffer, and the log is read back
//! with the record reader.

use keylog_core::{
    domain::{EncoderState, KeyEvent, ModifierFlags},
    engine::{encode_event, EncoderConfig, KeystrokeEncoder},
    keymap::keycodes,
    protocol::{encode_record, validate_log, RecordReader, RECORD_TERMINATOR},
    session::ManualClock,
};

fn typing_session() -> Vec<(i64, KeyEvent)> {
    let none = ModifierFlags::NONE;
    let shift = ModifierFlags(ModifierFlags::SHIFT);
    let cmd = ModifierFlags(ModifierFlags::COMMAND);
    let ctrl_cmd = ModifierFlags(ModifierFlags::CONTROL | ModifierFlags::COMMAND);
    let ctrl_shift = ModifierFlags(ModifierFlags::CONTROL | ModifierFlags::SHIFT);
    vec![
        (1_000, KeyEvent::key_down(4, shift, 'H' as u32)),
        (1_060, KeyEvent::key_up(4, shift, 'H' as u32)),
        (1_120, KeyEvent::key_down(34, none, 'i' as u32)),
        (1_180, KeyEvent::key_up(34, none, 'i' as u32)),
        (2_500, KeyEvent::key_down(keycodes::RETURN, none, '\r' as u32)),
        (2_560, KeyEvent::key_up(keycodes::RETURN, none, '\r' as u32)),
        (2_600, KeyEvent::key_down(keycodes::LEFT_ARROW, shift, 0xF702)),
        (2_650, KeyEvent::key_down(keycodes::ANSI_C, cmd, 'c' as u32)),
        (2_700, KeyEvent::key_down(keycodes::SPACE, ctrl_cmd, ' ' as u32)),
        (2_750, KeyEvent::key_down(keycodes::F1, none, 0)),
        (2_800, KeyEvent::key_down(38, ModifierFlags(ModifierFlags::CONTROL), 'j' as u32)),
        (2_850, KeyEvent::key_down(keycodes::ANSI_A, ModifierFlags(ModifierFlags::OPTION), 'a' as u32)),
        (2_900, KeyEvent::key_down(keycodes::ANSI_C, ctrl_shift, 'C' as u32)),
    ]
}

#[test]
fn test_return_record_is_22_bytes_without_line_break() {
    // The previous event was 600 ms earlier, so the display token is idle-prefixed.
    let state = EncoderState {
        last_event_millis: 400,
    };
    let event = KeyEvent::key_down(keycodes::RETURN, ModifierFlags::NONE, '\r' as u32);

    let encoded = encode_event(&event, state, Some(1_000), &EncoderConfig { idle_gap_ms: 500 });
    let bytes = encode_record(&encoded.record);

    assert!(encoded.display.is_session_boundary());
    let mut expected = Vec::new();
    expected.extend_from_slice(&1000i64.to_ne_bytes());
    expected.extend_from_slice(&0u64.to_ne_bytes());
    expected.extend_from_slice(&36u16.to_ne_bytes());
    expected.extend_from_slice(&[0xE2, 0x86, 0xA9]);
    expected.push(0x0A);
    assert_eq!(bytes, expected);
    assert_eq!(bytes.len(), 22);
}

#[test]
fn test_record_display_equals_token_without_line_break() {
    let config = EncoderConfig::default();
    let mut state = EncoderState::new();
    for (now, event) in typing_session() {
        let encoded = encode_event(&event, state, Some(now), &config);
        state = encoded.state;

        let token = encoded.display.as_bytes();
        let stripped = token.strip_prefix(b"\n").unwrap_or(token);
        assert_eq!(encoded.record.display, stripped, "event {event:?}");
        assert!(!encoded.record.display.contains(&RECORD_TERMINATOR));
    }
}

#[test]
fn test_session_renders_expected_screen_text() {
    let clock = ManualClock::new(0);
    let mut encoder = KeystrokeEncoder::new(clock, EncoderConfig::default());
    let mut screen = Vec::new();
    let mut log = Vec::new();

    for (now, event) in typing_session() {
        encoder.clock().set(now);
        let encoded = encoder.encode(&event);
        if let Some(bytes) = encoded.screen_output() {
            screen.extend_from_slice(bytes);
        }
        log.extend(encode_record(&encoded.record));
    }

    assert_eq!(String::from_utf8(screen).unwrap(), "Hi\n↩⇧←⌘c⌃⌘␣⌃j⌥a⌃C");
    assert_eq!(validate_log(&log), Ok(typing_session().len()));
}

#[test]
fn test_log_reads_back_every_event_in_order() {
    let config = EncoderConfig::default();
    let mut state = EncoderState::new();
    let mut log = Vec::new();
    let mut expected = Vec::new();
    for (now, event) in typing_session() {
        let encoded = encode_event(&event, state, Some(now), &config);
        state = encoded.state;
        log.extend(encode_record(&encoded.record));
        expected.push(encoded.record);
    }

    let records: Vec<_> = RecordReader::new(&log)
        .collect::<Result<_, _>>()
        .expect("log must decode");

    assert_eq!(records, expected);
    assert_eq!(records[0].timestamp_millis, 1_000);
    assert_eq!(records[0].key_code, 4);
    assert!(records[0].flags.shift());
}
