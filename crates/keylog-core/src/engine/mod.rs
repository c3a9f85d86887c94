//! The dual-sink assembler: turns one [`KeyEvent`](crate::domain::KeyEvent)
//! into a display token and a binary record.
//!
//! # Data flow
//!
//! ```text
//! KeyEvent ──┬─> idle-gap detector ──> optional leading '\n' (display only)
//!            ├─> modifier formatter ─> ⌃⌥⇧⌘ prefix
//!            └─> glyph table / UTF-8 encoder ─> base glyph
//!                                    │
//!                 DisplayToken <─────┴─────> BinaryRecord (no leading '\n')
//! ```
//!
//! [`encode_event`] is the pure form: the caller supplies the timestamp and the
//! previous [`EncoderState`](crate::domain::EncoderState) and gets the next
//! state back.  [`KeystrokeEncoder`] wraps it for a live session, reading a
//! [`Clock`](crate::session::Clock) and carrying the state between calls.
//!
//! # Concurrency
//!
//! An encoder holds one session's state and takes `&mut self`, so calls are
//! serialised by the borrow checker.  Use one encoder per capture thread, or
//! put it behind a mutex.

pub mod assembler;
pub mod encoder;
pub mod token;

pub use assembler::{encode_event, is_printable, EncodedEvent, EncoderConfig};
pub use encoder::KeystrokeEncoder;
pub use token::{DisplayToken, MAX_TOKEN_LEN};
