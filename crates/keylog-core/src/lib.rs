//! # keylog-core
//!
//! The keystroke encoding engine.  Each decoded key event is rendered twice:
//!
//! - as a **display token**: UTF-8 text such as `⌘c` or `⇧←`, with modifier
//!   glyphs in ⌃⌥⇧⌘ order and keycap glyphs for non-printing keys, preceded by
//!   a line break when the user paused for longer than the idle gap;
//! - as a **binary record**: `timestamp | flags | key code | display | 0x0A`,
//!   appended to a persistent log.
//!
//! This crate has no dependencies on OS APIs, files or event taps.  Capturing
//! events and writing the outputs is the job of `keylog-recorder`.
//!
//! # Modules
//!
//! - **`domain`** – key events, modifier flags, per-session encoder state.
//! - **`keymap`** – key codes and the keycap glyph table.
//! - **`encoding`** – UTF-8 encoding and the modifier prefix.
//! - **`session`** – the clock seam and idle-gap detection.
//! - **`engine`** – assembles display tokens and binary records.
//! - **`protocol`** – the binary record layout and a reader for logs.

pub mod domain;
pub mod encoding;
pub mod engine;
pub mod keymap;
pub mod protocol;
pub mod session;

pub use domain::{EncoderState, KeyEvent, KeyEventKind, ModifierFlags};
pub use engine::{encode_event, DisplayToken, EncodedEvent, EncoderConfig, KeystrokeEncoder};
pub use keymap::lookup_special_glyph;
pub use protocol::{decode_record, encode_record, BinaryRecord, RecordError, RecordReader};
