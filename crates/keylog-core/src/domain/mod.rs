//! Domain entities for the keystroke encoder.
//!
//! This module contains plain data with no infrastructure dependencies: the
//! decoded key event handed over by the capture layer, the modifier bitmask,
//! and the per-session encoder state.
//!
//! Code in outer layers (the recorder's capture and sink adapters) depends on
//! these types, but the domain never depends on them.

pub mod event;

pub use event::{EncoderState, KeyEvent, KeyEventKind, ModifierFlags};
