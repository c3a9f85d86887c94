//! Stateful encoder for one capture session.

use tracing::{debug, warn};

use crate::domain::{EncoderState, KeyEvent};
use crate::session::{Clock, SystemClock};

use super::assembler::{encode_event, EncodedEvent, EncoderConfig};

/// Encodes the events of one session, timestamping them with a [`Clock`].
///
/// # Examples
///
/// ```rust
/// use keylog_core::domain::{KeyEvent, ModifierFlags};
/// use keylog_core::engine::{EncoderConfig, KeystrokeEncoder};
/// use keylog_core::session::ManualClock;
///
/// let mut encoder = KeystrokeEncoder::new(ManualClock::new(1_000), EncoderConfig::default());
/// let out = encoder.encode(&KeyEvent::key_down(0, ModifierFlags::NONE, 'a' as u32));
/// assert_eq!(out.display.as_bytes(), b"a");
/// assert_eq!(encoder.state().last_event_millis, 1_000);
/// ```
pub struct KeystrokeEncoder<C: Clock = SystemClock> {
    clock: C,
    config: EncoderConfig,
    state: EncoderState,
}

impl<C: Clock> KeystrokeEncoder<C> {
    /// Creates an encoder for a fresh session.
    pub fn new(clock: C, config: EncoderConfig) -> Self {
        Self {
            clock,
            config,
            state: EncoderState::new(),
        }
    }

    /// Current session state.
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// The clock used for timestamps.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Encodes `event` and advances the session state.
    ///
    /// A clock failure is logged and the event is still encoded, without idle
    /// detection.
    pub fn encode(&mut self, event: &KeyEvent) -> EncodedEvent {
        let now = match self.clock.now_millis() {
            Ok(now) => Some(now),
            Err(e) => {
                warn!(error = %e, "unable to read clock; idle detection skipped for this event");
                None
            }
        };

        let encoded = encode_event(event, self.state, now, &self.config);
        if encoded.display.is_session_boundary() {
            debug!(
                gap_ms = encoded.state.last_event_millis.saturating_sub(self.state.last_event_millis),
                "idle gap; starting a new line"
            );
        }
        self.state = encoded.state;
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModifierFlags;
    use crate::session::ManualClock;

    fn key(ch: char) -> KeyEvent {
        KeyEvent::key_down(0, ModifierFlags::NONE, ch as u32)
    }

    #[test]
    fn test_events_100ms_apart_stay_on_one_line() {
        let mut encoder = KeystrokeEncoder::new(ManualClock::new(10_000), EncoderConfig::default());
        let first = encoder.encode(&key('a'));
        encoder.clock().advance(100);
        let second = encoder.encode(&key('b'));
        assert!(!first.display.is_session_boundary());
        assert!(!second.display.is_session_boundary());
    }

    #[test]
    fn test_events_600ms_apart_break_line_on_second() {
        let mut encoder = KeystrokeEncoder::new(ManualClock::new(10_000), EncoderConfig::default());
        let first = encoder.encode(&key('a'));
        encoder.clock().advance(600);
        let second = encoder.encode(&key('b'));
        assert!(!first.display.is_session_boundary());
        assert!(second.display.is_session_boundary());
        assert_eq!(second.display.as_bytes(), b"\nb");
    }

    #[test]
    fn test_clock_failure_keeps_previous_state() {
        let mut encoder = KeystrokeEncoder::new(ManualClock::new(10_000), EncoderConfig::default());
        encoder.encode(&key('a'));
        encoder.clock().fail();
        let out = encoder.encode(&key('b'));
        assert_eq!(out.record.timestamp_millis, 0);
        assert_eq!(encoder.state().last_event_millis, 10_000);

        // Recovery: the gap is measured from the last good timestamp.
        encoder.clock().set(10_900);
        let out = encoder.encode(&key('c'));
        assert!(out.display.is_session_boundary());
    }

    #[test]
    fn test_independent_encoders_do_not_share_state() {
        let mut a = KeystrokeEncoder::new(ManualClock::new(1_000), EncoderConfig::default());
        let mut b = KeystrokeEncoder::new(ManualClock::new(50_000), EncoderConfig::default());
        a.encode(&key('a'));
        b.encode(&key('b'));
        assert_eq!(a.state().last_event_millis, 1_000);
        assert_eq!(b.state().last_event_millis, 50_000);
    }

    #[test]
    fn test_custom_idle_gap() {
        let config = EncoderConfig { idle_gap_ms: 50 };
        let mut encoder = KeystrokeEncoder::new(ManualClock::new(1_000), config);
        encoder.encode(&key('a'));
        encoder.clock().advance(100);
        assert!(encoder.encode(&key('b')).display.is_session_boundary());
    }
}
