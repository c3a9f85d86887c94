//! Millisecond wall clock used to timestamp events.
//!
//! The encoder only needs "milliseconds since the Unix epoch", but reading the
//! system clock can fail (for example when it is set before 1970).  The
//! [`Clock`] trait lets tests and log replays supply time explicitly.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Errors returned by a [`Clock`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    /// The system clock reads earlier than the Unix epoch.
    #[error("system clock is before the Unix epoch")]
    BeforeEpoch,

    /// The clock has no time to report.
    #[error("clock unavailable: {0}")]
    Unavailable(String),
}

/// Source of event timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> Result<i64, ClockError>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> Result<i64, ClockError> {
        (**self).now_millis()
    }
}

/// Reads [`SystemTime::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Result<i64, ClockError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ClockError::BeforeEpoch)?;
        i64::try_from(since_epoch.as_millis())
            .map_err(|_| ClockError::Unavailable("timestamp overflows i64".to_string()))
    }
}

/// A clock that only moves when told to.
///
/// A negative reading is treated as "clock unavailable", which lets tests
/// exercise the fail-soft path.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `now_millis`.
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    /// Sets the current reading.
    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::Relaxed);
    }

    /// Moves the clock forward (or backward, for negative `delta_millis`).
    pub fn advance(&self, delta_millis: i64) {
        self.now.fetch_add(delta_millis, Ordering::Relaxed);
    }

    /// Makes subsequent reads fail.
    pub fn fail(&self) {
        self.set(-1);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Result<i64, ClockError> {
        match self.now.load(Ordering::Relaxed) {
            n if n < 0 => Err(ClockError::Unavailable("manual clock disabled".to_string())),
            n => Ok(n),
        }
    }
}
