//! Application layer use cases for the recorder.
//!
//! Use cases orchestrate the core encoder and depend on the sink traits rather
//! than concrete outputs, so they carry no OS or file-system calls of their
//! own beyond what is injected.
//!
//! - **`record_keystrokes`** – encodes every captured key event and writes the
//!   display token and binary record to their sinks.
//! - **`dump_log`** – renders an existing binary log as text.

pub mod dump_log;
pub mod record_keystrokes;
