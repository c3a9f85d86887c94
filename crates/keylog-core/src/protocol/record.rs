//! Binary codec for keystroke log records.
//!
//! Record layout:
//! ```text
//! [timestamp_ms:8][flags:8][key_code:2][display:N][0x0A]
//! ```
//! Header size: 18 bytes.  Integers use the host's native byte order, so a log
//! is only readable on a machine with the same endianness as the writer.
//!
//! Records have no length prefix.  A reader finds the end of a record by
//! scanning for the `0x0A` terminator after the header, which only works
//! because no display glyph contains that byte.  Any new glyph must keep it
//! that way.

use thiserror::Error;

use crate::domain::ModifierFlags;

/// Size of the fixed record prefix: timestamp + flags + key code.
pub const RECORD_HEADER_SIZE: usize = 8 + 8 + 2;

/// Byte that ends every record.
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Errors that can occur while reading records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Fewer bytes remain than the fixed header needs.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The header is present but no terminator follows it.
    #[error("record at offset {offset} has no terminator")]
    MissingTerminator { offset: usize },

    /// The display segment is not valid UTF-8.
    #[error("record at offset {offset} has invalid UTF-8 display bytes")]
    InvalidUtf8 { offset: usize },
}

/// One persisted key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryRecord {
    /// Milliseconds since the Unix epoch, or `0` if the clock was unavailable.
    pub timestamp_millis: i64,
    /// Raw modifier flags of the event.
    pub flags: ModifierFlags,
    /// Platform virtual key code.
    pub key_code: u16,
    /// Display token bytes without any session-boundary line break.
    pub display: Vec<u8>,
}

impl BinaryRecord {
    /// Encoded size of this record, terminator included.
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_SIZE + self.display.len() + 1
    }

    /// The display segment as text.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error if the display bytes are not valid UTF-8.
    pub fn display_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.display)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `record` into its on-disk byte form.
///
/// # Examples
///
/// ```rust
/// use keylog_core::domain::ModifierFlags;
/// use keylog_core::protocol::{decode_record, encode_record, BinaryRecord};
///
/// let record = BinaryRecord {
///     timestamp_millis: 1000,
///     flags: ModifierFlags::NONE,
///     key_code: 0,
///     display: b"a".to_vec(),
/// };
/// let bytes = encode_record(&record);
/// assert_eq!(bytes.len(), 20);
/// let (decoded, consumed) = decode_record(&bytes).unwrap();
/// assert_eq!(decoded, record);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_record(record: &BinaryRecord) -> Vec<u8> {
    debug_assert!(
        !record.display.contains(&RECORD_TERMINATOR),
        "display bytes must not contain the record terminator"
    );

    let mut buf = Vec::with_capacity(record.encoded_len());
    buf.extend_from_slice(&record.timestamp_millis.to_ne_bytes());
    buf.extend_from_slice(&record.flags.bits().to_ne_bytes());
    buf.extend_from_slice(&record.key_code.to_ne_bytes());
    buf.extend_from_slice(&record.display);
    buf.push(RECORD_TERMINATOR);
    buf
}

/// Decodes one record from the beginning of `bytes`.
///
/// Returns the record and the number of bytes consumed, terminator included.
///
/// # Errors
///
/// Returns [`RecordError`] if the header is truncated or no terminator follows.
pub fn decode_record(bytes: &[u8]) -> Result<(BinaryRecord, usize), RecordError> {
    decode_record_at(bytes, 0)
}

/// Iterates over the records stored back to back in a byte slice.
///
/// Iteration stops after the first error; the error is yielded once.
pub struct RecordReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    /// Creates a reader over a whole log.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<BinaryRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        match decode_record_at(&self.bytes[self.offset..], self.offset) {
            Ok((record, consumed)) => {
                self.offset += consumed;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn decode_record_at(bytes: &[u8], base_offset: usize) -> Result<(BinaryRecord, usize), RecordError> {
    if bytes.len() < RECORD_HEADER_SIZE {
        return Err(RecordError::InsufficientData {
            needed: RECORD_HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let timestamp_millis = i64::from_ne_bytes(read_array(bytes, 0));
    let flags = ModifierFlags(u64::from_ne_bytes(read_array(bytes, 8)));
    let key_code = u16::from_ne_bytes(read_array(bytes, 16));

    let body = &bytes[RECORD_HEADER_SIZE..];
    let display_len = body
        .iter()
        .position(|&b| b == RECORD_TERMINATOR)
        .ok_or(RecordError::MissingTerminator {
            offset: base_offset,
        })?;
    let display = body[..display_len].to_vec();

    let record = BinaryRecord {
        timestamp_millis,
        flags,
        key_code,
        display,
    };
    Ok((record, RECORD_HEADER_SIZE + display_len + 1))
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

/// Validates that every record in `bytes` has UTF-8 display bytes.
///
/// # Errors
///
/// Returns the first framing or UTF-8 error encountered.
pub fn validate_log(bytes: &[u8]) -> Result<usize, RecordError> {
    let mut reader = RecordReader::new(bytes);
    let mut count = 0;
    while let Some(result) = reader.next() {
        let start = reader.offset();
        let record = result?;
        if record.display_str().is_err() {
            return Err(RecordError::InvalidUtf8 {
                offset: start - record.encoded_len(),
            });
        }
        count += 1;
    }
    Ok(count)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
