//! Output sinks for the two renderings of each key event.
//!
//! - [`RecordSink`] receives encoded binary records and appends them to a
//!   persistent log ([`file::FileRecordSink`]).
//! - [`DisplaySink`] receives display tokens and shows them verbatim
//!   ([`stdout::StdoutDisplaySink`]).
//!
//! [`memory::MemorySink`] implements both traits in memory for tests.

use std::path::PathBuf;

use thiserror::Error;

pub mod file;
pub mod memory;
pub mod stdout;

pub use file::FileRecordSink;
pub use memory::MemorySink;
pub use stdout::StdoutDisplaySink;

/// Error type for sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The log file could not be opened.
    #[error("unable to open {path} for appending: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to or flushing the sink failed.
    #[error("write to {target} failed: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for binary log records.
#[cfg_attr(test, mockall::automock)]
pub trait RecordSink: Send {
    /// Appends one encoded record.
    fn append(&mut self, record: &[u8]) -> Result<(), SinkError>;
    /// Pushes buffered records to durable storage.
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Destination for display tokens.
#[cfg_attr(test, mockall::automock)]
pub trait DisplaySink: Send {
    /// Shows one token, byte for byte.
    fn show(&mut self, token: &[u8]) -> Result<(), SinkError>;
}
