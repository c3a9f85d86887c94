//! Input capture infrastructure for the recorder.
//!
//! On macOS this installs a listen-only session event tap for key-down and
//! key-up events on a dedicated run-loop thread.  Decoded [`KeyEvent`]s are
//! placed into an `mpsc` channel and consumed by the recording loop.
//!
//! # Event tap callbacks
//!
//! The OS disables a tap whose callback is too slow, so the callback only
//! decodes the event and sends it; encoding and file I/O happen on the
//! consumer side of the channel.
//!
//! # Testability
//!
//! The [`InputSource`] trait allows tests to inject synthetic events without
//! an event tap.

use std::sync::mpsc;

use keylog_core::{KeyEvent, ModifierFlags};

pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to create event tap: {0}")]
    TapCreateFailed(String),
    #[error("capture service has already been started")]
    AlreadyStarted,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting key event production.
///
/// The production implementation uses the platform event tap; tests use
/// [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Starts the source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<KeyEvent>, CaptureError>;
    /// Stops delivering events.  The receiver disconnects once the source has
    /// dropped its sender.
    fn stop(&self);
}

/// Modifier state handed to the keyboard layout when translating a key.
///
/// Only Shift is passed on (as the Carbon `shiftKey` bit, `0x02` after the
/// shift by 16), so ⌃C translates to `c` and ⌃⇧C to `C`.  The other modifiers
/// are shown as glyphs by the encoder instead.
pub fn layout_modifier_state(flags: ModifierFlags) -> u32 {
    ((flags.bits() >> 16) & 0x02) as u32
}

/// Returns the capture source for the current platform.
///
/// # Errors
///
/// Returns [`CaptureError::UnsupportedPlatform`] where no event tap exists.
pub fn platform_source() -> Result<Box<dyn InputSource>, CaptureError> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacosEventTap::new()))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Err(CaptureError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
