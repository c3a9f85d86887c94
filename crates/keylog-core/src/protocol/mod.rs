//! Binary log record layout, encoder and reader.

pub mod record;

pub use record::{
    decode_record, encode_record, validate_log, BinaryRecord, RecordError, RecordReader,
    RECORD_HEADER_SIZE, RECORD_TERMINATOR,
};
