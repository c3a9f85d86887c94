//! Key events and encoder session state.

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
}

/// Modifier state reported with a key event.
///
/// The bit positions are the platform event-flag mask bits, stored verbatim so
/// the binary log carries exactly what the event source reported.  Only the four
/// bits below are interpreted; everything else (caps lock, numeric pad, device
/// dependent bits) passes through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierFlags(pub u64);

impl ModifierFlags {
    pub const SHIFT: u64 = 0x0002_0000;
    pub const CONTROL: u64 = 0x0004_0000;
    pub const OPTION: u64 = 0x0008_0000;
    pub const COMMAND: u64 = 0x0010_0000;

    /// No modifiers held.
    pub const NONE: ModifierFlags = ModifierFlags(0);

    /// Returns the raw bitmask.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if Control is held.
    pub fn control(self) -> bool {
        self.0 & Self::CONTROL != 0
    }

    /// Returns `true` if Option (Alt) is held.
    pub fn option(self) -> bool {
        self.0 & Self::OPTION != 0
    }

    /// Returns `true` if Shift is held.
    pub fn shift(self) -> bool {
        self.0 & Self::SHIFT != 0
    }

    /// Returns `true` if Command is held.
    pub fn command(self) -> bool {
        self.0 & Self::COMMAND != 0
    }
}

/// One decoded key transition, as delivered by the capture layer.
///
/// Produced once per physical key transition and consumed exactly once by the
/// encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Press or release.
    pub kind: KeyEventKind,
    /// Platform virtual key code (position-based, layout independent).
    pub key_code: u16,
    /// Modifier flags at the time of the event.
    pub flags: ModifierFlags,
    /// The character the active keyboard layout produces for this key, or `0`
    /// when the layout produces nothing.
    pub translated_char: u32,
}

impl KeyEvent {
    /// Convenience constructor for a key press.
    pub fn key_down(key_code: u16, flags: ModifierFlags, translated_char: u32) -> Self {
        Self {
            kind: KeyEventKind::KeyDown,
            key_code,
            flags,
            translated_char,
        }
    }

    /// Convenience constructor for a key release.
    pub fn key_up(key_code: u16, flags: ModifierFlags, translated_char: u32) -> Self {
        Self {
            kind: KeyEventKind::KeyUp,
            key_code,
            flags,
            translated_char,
        }
    }

    /// Returns `true` for key presses.
    pub fn is_key_down(&self) -> bool {
        self.kind == KeyEventKind::KeyDown
    }
}

/// State carried from one encoded event to the next within a session.
///
/// `last_event_millis == 0` means no event has been timestamped yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderState {
    pub last_event_millis: i64,
}

impl EncoderState {
    /// State for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if at least one event has been timestamped.
    pub fn has_prior_event(&self) -> bool {
        self.last_event_millis != 0
    }
}
