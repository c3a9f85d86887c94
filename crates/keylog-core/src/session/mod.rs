//! Per-session timing: the clock seam and the idle-gap detector.

pub mod clock;
pub mod idle;

pub use clock::{Clock, ClockError, ManualClock, SystemClock};
pub use idle::{check_idle, DEFAULT_IDLE_GAP_MS};
