//! Infrastructure layer for the recorder.
//!
//! Contains OS-facing adapters: the keyboard event tap, the output sinks
//! (log file, stdout) and file-system configuration storage.
//!
//! **Dependency rule**: this layer may depend on `keylog_core`, but MUST NOT
//! depend on the `application` layer.

pub mod input_capture;
pub mod sinks;
pub mod storage;
