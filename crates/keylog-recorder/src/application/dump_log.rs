//! Renders a binary keystroke log as text, one line per record.
//!
//! Line format: `timestamp<TAB>flags<TAB>key_code<TAB>display`, with the
//! flags as `0x`-prefixed hex.  Complete records are written before a
//! malformed tail is reported.

use std::io::Write;
use std::path::{Path, PathBuf};

use keylog_core::protocol::{RecordError, RecordReader};
use thiserror::Error;

/// Error type for log dumps.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The log could not be read or the output could not be written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log ends in a malformed or partial record.
    #[error("malformed log after {records} record(s): {source}")]
    Record {
        records: usize,
        #[source]
        source: RecordError,
    },
}

/// Writes one line per record in `bytes` to `out`.  Returns the record count.
///
/// # Errors
///
/// Returns [`DumpError::Record`] when the log has a malformed tail, after the
/// complete records have been written, or [`DumpError::Io`] if `out` fails.
pub fn dump_log<W: Write>(bytes: &[u8], out: &mut W) -> Result<usize, DumpError> {
    let io_err = |source| DumpError::Io {
        path: PathBuf::from("<output>"),
        source,
    };

    let mut count = 0;
    for record in RecordReader::new(bytes) {
        let record = record.map_err(|source| DumpError::Record {
            records: count,
            source,
        })?;
        writeln!(
            out,
            "{}\t{:#x}\t{}\t{}",
            record.timestamp_millis,
            record.flags.bits(),
            record.key_code,
            String::from_utf8_lossy(&record.display)
        )
        .map_err(io_err)?;
        count += 1;
    }
    out.flush().map_err(io_err)?;
    Ok(count)
}

/// Reads the log at `path` and dumps it to `out`.
///
/// # Errors
///
/// See [`dump_log`]; a read failure is reported as [`DumpError::Io`].
pub fn dump_log_file<W: Write>(path: &Path, out: &mut W) -> Result<usize, DumpError> {
    let bytes = std::fs::read(path).map_err(|source| DumpError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    dump_log(&bytes, out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
