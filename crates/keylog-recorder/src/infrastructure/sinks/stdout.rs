//! Display tokens on standard output.

use std::io::{self, Write};

use super::{DisplaySink, SinkError};

/// Writes tokens to stdout and flushes after each one, so keys appear as
/// they are typed.
#[derive(Debug, Default)]
pub struct StdoutDisplaySink;

impl StdoutDisplaySink {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySink for StdoutDisplaySink {
    fn show(&mut self, token: &[u8]) -> Result<(), SinkError> {
        let mut out = io::stdout().lock();
        out.write_all(token)
            .and_then(|()| out.flush())
            .map_err(|source| SinkError::Write {
                target: "stdout".to_string(),
                source,
            })
    }
}
