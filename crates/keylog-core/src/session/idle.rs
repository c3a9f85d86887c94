//! Idle-gap detection.
//!
//! When the user pauses for longer than the idle gap, the display stream gets
//! a line break before the next token so bursts of typing end up on separate
//! lines.

use crate::domain::EncoderState;

/// Pause, in milliseconds, after which the next event starts a new line.
pub const DEFAULT_IDLE_GAP_MS: i64 = 500;

/// Decides whether an event at `now_millis` follows an idle gap.
///
/// Returns the verdict and the state to carry to the next event.
///
/// - The first event of a session (`last_event_millis == 0`) is never idle.
/// - `None` means the clock could not be read: the event is not idle and the
///   state is returned unchanged.
/// - A clock that jumped backwards yields a negative gap, which is not idle.
pub fn check_idle(
    state: EncoderState,
    now_millis: Option<i64>,
    threshold_ms: i64,
) -> (bool, EncoderState) {
    let Some(now) = now_millis else {
        return (false, state);
    };

    let idle = state.has_prior_event() && now.saturating_sub(state.last_event_millis) > threshold_ms;
    (
        idle,
        EncoderState {
            last_event_millis: now,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> EncoderState {
        EncoderState {
            last_event_millis: ms,
        }
    }

    #[test]
    fn test_first_event_is_never_idle() {
        let (idle, state) = check_idle(EncoderState::new(), Some(1_700_000_000_000), DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
        assert_eq!(state.last_event_millis, 1_700_000_000_000);
    }

    #[test]
    fn test_short_gap_is_not_idle() {
        let (idle, state) = check_idle(at(10_000), Some(10_100), DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
        assert_eq!(state.last_event_millis, 10_100);
    }

    #[test]
    fn test_same_timestamp_is_not_idle() {
        let (idle, _) = check_idle(at(10_000), Some(10_000), DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
    }

    #[test]
    fn test_long_gap_is_idle() {
        let (idle, _) = check_idle(at(10_000), Some(10_600), DEFAULT_IDLE_GAP_MS);
        assert!(idle);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_not_idle() {
        let (idle, _) = check_idle(at(10_000), Some(10_500), DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
        let (idle, _) = check_idle(at(10_000), Some(10_501), DEFAULT_IDLE_GAP_MS);
        assert!(idle);
    }

    #[test]
    fn test_backward_clock_jump_is_not_idle() {
        let (idle, state) = check_idle(at(10_000), Some(2_000), DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
        assert_eq!(state.last_event_millis, 2_000);
    }

    #[test]
    fn test_extreme_values_do_not_panic() {
        let (idle, _) = check_idle(at(i64::MAX), Some(i64::MIN), DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
        let (idle, _) = check_idle(at(i64::MIN), Some(i64::MAX), DEFAULT_IDLE_GAP_MS);
        assert!(idle);
    }

    #[test]
    fn test_unavailable_clock_keeps_state() {
        let (idle, state) = check_idle(at(10_000), None, DEFAULT_IDLE_GAP_MS);
        assert!(!idle);
        assert_eq!(state, at(10_000));
    }

    #[test]
    fn test_custom_threshold() {
        let (idle, _) = check_idle(at(10_000), Some(10_200), 100);
        assert!(idle);
    }
}
