//! Append-only binary log file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{RecordSink, SinkError};

/// Appends records to a log file.
///
/// Records are buffered unless `flush_every_record` is set, in which case
/// each record reaches the file before [`RecordSink::append`] returns.  The
/// buffer is flushed on drop.
pub struct FileRecordSink {
    path: PathBuf,
    writer: BufWriter<File>,
    flush_every_record: bool,
}

impl FileRecordSink {
    /// Opens (creating if needed) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, flush_every_record: bool) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), flush_every_record, "appending to binary log");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            flush_every_record,
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Write {
            target: self.path.display().to_string(),
            source,
        }
    }
}

impl RecordSink for FileRecordSink {
    fn append(&mut self, record: &[u8]) -> Result<(), SinkError> {
        if let Err(e) = self.writer.write_all(record) {
            return Err(self.write_error(e));
        }
        if self.flush_every_record {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        match self.writer.flush() {
            Ok(()) => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }
}

impl Drop for FileRecordSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(path = %self.path.display(), error = %e, "failed to flush binary log on close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "keylog_sink_{}_{}_{name}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn test_flush_every_record_writes_immediately() {
        // Arrange
        let path = temp_path("immediate.bin");
        let mut sink = FileRecordSink::open(&path, true).expect("open");

        // Act
        sink.append(b"abc\n").expect("append");

        // Assert – visible on disk while the sink is still open
        assert_eq!(std::fs::read(&path).unwrap(), b"abc\n");

        drop(sink);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_buffered_records_are_flushed_on_drop() {
        let path = temp_path("buffered.bin");
        {
            let mut sink = FileRecordSink::open(&path, false).expect("open");
            sink.append(b"one\n").expect("append");
            sink.append(b"two\n").expect("append");
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"one\ntwo\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_appends_to_existing_log() {
        let path = temp_path("append.bin");
        std::fs::write(&path, b"old\n").unwrap();
        {
            let mut sink = FileRecordSink::open(&path, false).expect("open");
            sink.append(b"new\n").expect("append");
            sink.flush().expect("flush");
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"old\nnew\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/keys.bin");
        let err = FileRecordSink::open(&path, false).err().expect("must fail");
        assert!(matches!(err, SinkError::Open { .. }));
        assert!(err.to_string().contains("keys.bin"));
    }
}
