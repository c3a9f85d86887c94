//! RecordKeystrokesUseCase: turns captured key events into the display stream
//! and the binary log.
//!
//! The use case owns the session's [`KeystrokeEncoder`] and both sinks.  It
//! depends only on the [`RecordSink`] and [`DisplaySink`] traits, so tests can
//! inject in-memory or mocked sinks together with a manual clock.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use keylog_core::domain::KeyEvent;
use keylog_core::engine::{EncodedEvent, EncoderConfig, KeystrokeEncoder};
use keylog_core::protocol::encode_record;
use keylog_core::session::{Clock, SystemClock};
use tracing::{debug, info, warn};

use crate::infrastructure::sinks::{DisplaySink, RecordSink};

/// How often `run` re-checks the shutdown flag while the channel is idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Behaviour switches for a recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingOptions {
    /// Hex-dump every record at `debug` level.
    pub debug_records: bool,
}

/// Counters for one recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingStats {
    /// Key events received.
    pub events: u64,
    /// Records appended to the log.
    pub records_written: u64,
    /// Tokens shown on the display sink.
    pub tokens_shown: u64,
    /// Sink writes that failed.
    pub write_errors: u64,
}

/// Encodes key events and fans them out to the configured sinks.
pub struct RecordKeystrokesUseCase<C: Clock = SystemClock> {
    encoder: KeystrokeEncoder<C>,
    record_sink: Option<Box<dyn RecordSink>>,
    display_sink: Option<Box<dyn DisplaySink>>,
    options: RecordingOptions,
    stats: RecordingStats,
}

impl<C: Clock> RecordKeystrokesUseCase<C> {
    /// Creates a use case with no sinks attached.
    pub fn new(clock: C, config: EncoderConfig, options: RecordingOptions) -> Self {
        Self {
            encoder: KeystrokeEncoder::new(clock, config),
            record_sink: None,
            display_sink: None,
            options,
            stats: RecordingStats::default(),
        }
    }

    /// Attaches the binary log sink.
    pub fn with_record_sink(mut self, sink: Box<dyn RecordSink>) -> Self {
        self.record_sink = Some(sink);
        self
    }

    /// Attaches the display sink.
    pub fn with_display_sink(mut self, sink: Box<dyn DisplaySink>) -> Self {
        self.display_sink = Some(sink);
        self
    }

    /// Counters so far.
    pub fn stats(&self) -> RecordingStats {
        self.stats
    }

    /// Encodes one event and writes it to the sinks.
    ///
    /// Sink failures are logged and counted; the session keeps going so one
    /// bad write does not end the recording.
    pub fn handle_event(&mut self, event: &KeyEvent) -> EncodedEvent {
        self.stats.events += 1;
        let encoded = self.encoder.encode(event);

        if let Some(sink) = self.record_sink.as_mut() {
            let bytes = encode_record(&encoded.record);
            if self.options.debug_records {
                debug!(len = bytes.len(), record = %hex_dump(&bytes), "record");
            }
            match sink.append(&bytes) {
                Ok(()) => self.stats.records_written += 1,
                Err(e) => {
                    self.stats.write_errors += 1;
                    warn!(error = %e, "failed to append record");
                }
            }
        }

        if let (Some(sink), Some(screen)) = (self.display_sink.as_mut(), encoded.screen_output()) {
            match sink.show(screen) {
                Ok(()) => self.stats.tokens_shown += 1,
                Err(e) => {
                    self.stats.write_errors += 1;
                    warn!(error = %e, "failed to show token");
                }
            }
        }

        encoded
    }

    /// Drains `rx` until the channel closes or `running` is cleared, then
    /// flushes the log.
    pub fn run(&mut self, rx: &Receiver<KeyEvent>, running: &AtomicBool) -> RecordingStats {
        while running.load(Ordering::Relaxed) {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    self.handle_event(&event);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!("capture channel closed");
                    break;
                }
            }
        }

        self.flush();
        info!(
            events = self.stats.events,
            records = self.stats.records_written,
            errors = self.stats.write_errors,
            "recording stopped"
        );
        self.stats
    }

    /// Flushes the record sink, if any.
    pub fn flush(&mut self) {
        if let Some(sink) = self.record_sink.as_mut() {
            if let Err(e) = sink.flush() {
                self.stats.write_errors += 1;
                warn!(error = %e, "failed to flush log");
            }
        }
    }
}

/// Space-separated lowercase hex, e.g. `"e8 03 00"`.
fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
