//! In-memory sink for tests.

use std::sync::{Arc, Mutex};

use super::{DisplaySink, RecordSink, SinkError};

/// Collects everything written to it.
///
/// Clones share the same buffer, so a test can keep one handle and move the
/// other into the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    bytes: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().expect("lock poisoned").clone()
    }

    /// Number of [`RecordSink::flush`] calls.
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().expect("lock poisoned")
    }

    fn push(&self, data: &[u8]) {
        self.bytes
            .lock()
            .expect("lock poisoned")
            .extend_from_slice(data);
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &[u8]) -> Result<(), SinkError> {
        self.push(record);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        *self.flushes.lock().expect("lock poisoned") += 1;
        Ok(())
    }
}

impl DisplaySink for MemorySink {
    fn show(&mut self, token: &[u8]) -> Result<(), SinkError> {
        self.push(token);
        Ok(())
    }
}
