//! macOS session event tap.
//!
//! Installs a listen-only `CGEventTap` at the session level for `KeyDown` and
//! `KeyUp`, on a dedicated thread running a `CFRunLoop`.  For each event the
//! callback reads the virtual key code and the modifier flags, translates the
//! key through the current keyboard layout (`UCKeyTranslate`, Shift state
//! only, no dead keys) and sends a [`KeyEvent`] down the channel.
//!
//! # Accessibility permission
//!
//! Creating the tap requires the process to be trusted under System Settings →
//! Privacy & Security → Input Monitoring.  Without it `CGEventTapCreate`
//! returns NULL and [`InputSource::start`] fails with
//! [`CaptureError::TapCreateFailed`].
//!
//! # Safety
//!
//! `unsafe` is limited to the Carbon and CoreGraphics calls that
//! `core-graphics` and `core-foundation` do not wrap.

#![cfg(target_os = "macos")]

use std::cell::Cell;
use std::os::raw::{c_ulong, c_void};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core_foundation::base::{CFType, CFTypeRef, TCFType};
use core_foundation::data::{CFData, CFDataRef};
use core_foundation::mach_port::CFMachPortRef;
use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_foundation::string::CFStringRef;
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
    EventField,
};
use keylog_core::{KeyEvent, KeyEventKind, ModifierFlags};
use tracing::{debug, error, warn};

use super::{layout_modifier_state, CaptureError, InputSource};

/// Upper bound on UTF-16 units produced per key; only the first one is used.
const MAX_STRING_LENGTH: usize = 4;

/// `kUCKeyActionDisplay`: the character printed on the keycap.
const UC_KEY_ACTION_DISPLAY: u16 = 3;

/// `1 << kUCKeyTranslateNoDeadKeysBit`.
const UC_KEY_TRANSLATE_NO_DEAD_KEYS_MASK: u32 = 1;

/// Longest the tap thread sleeps in the run loop before re-checking `stop`.
const RUN_LOOP_SLICE: Duration = Duration::from_millis(250);

type TISInputSourceRef = *mut c_void;

#[link(name = "Carbon", kind = "framework")]
extern "C" {
    static kTISPropertyUnicodeKeyLayoutData: CFStringRef;

    fn TISCopyCurrentKeyboardLayoutInputSource() -> TISInputSourceRef;
    fn TISGetInputSourceProperty(source: TISInputSourceRef, key: CFStringRef) -> *const c_void;
    fn LMGetKbdType() -> u8;
    fn UCKeyTranslate(
        key_layout: *const c_void,
        virtual_key_code: u16,
        key_action: u16,
        modifier_key_state: u32,
        keyboard_type: u32,
        key_translate_options: u32,
        dead_key_state: *mut u32,
        max_string_length: c_ulong,
        actual_string_length: *mut c_ulong,
        unicode_string: *mut u16,
    ) -> i32;
}

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// Handle to the tap thread's run loop.
struct TapRunLoop(CFRunLoop);

// SAFETY: the handle is only used to call `CFRunLoopStop`, which may be called
// from any thread.
unsafe impl Send for TapRunLoop {}

/// State of a running tap, owned by [`MacosEventTap`] between start and stop.
struct RunningTap {
    run_loop: TapRunLoop,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Key capture through a CoreGraphics session event tap.
pub struct MacosEventTap {
    sender: Arc<Mutex<Option<Sender<KeyEvent>>>>,
    running: Mutex<Option<RunningTap>>,
}

impl MacosEventTap {
    /// Creates a new (unstarted) tap.
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            running: Mutex::new(None),
        }
    }
}

impl Default for MacosEventTap {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MacosEventTap {
    fn start(&self) -> Result<mpsc::Receiver<KeyEvent>, CaptureError> {
        let mut running = self.running.lock().map_err(|_| poisoned())?;
        if running.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::channel::<KeyEvent>();
        *self.sender.lock().map_err(|_| poisoned())? = Some(tx);

        // The tap must be created on the thread whose run loop services it;
        // creation is reported back before the receiver is returned.
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<TapRunLoop, CaptureError>>(1);
        let sender = Arc::clone(&self.sender);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("keylog-event-tap".to_string())
            .spawn(move || run_tap_loop(sender, ready_tx, thread_stop))
            .map_err(|e| CaptureError::TapCreateFailed(e.to_string()))?;

        let run_loop = match ready_rx.recv() {
            Ok(Ok(run_loop)) => run_loop,
            Ok(Err(e)) => {
                self.clear_sender();
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                self.clear_sender();
                return Err(CaptureError::TapCreateFailed("tap thread exited".to_string()));
            }
        };

        *running = Some(RunningTap {
            run_loop,
            stop,
            thread,
        });
        Ok(rx)
    }

    fn stop(&self) {
        self.clear_sender();

        let tap = match self.running.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(tap) = tap {
            tap.stop.store(true, Ordering::SeqCst);
            tap.run_loop.0.stop();
            if tap.thread.join().is_err() {
                error!("event tap thread panicked");
            }
            debug!("event tap stopped");
        }
    }
}

impl MacosEventTap {
    fn clear_sender(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            *guard = None;
        }
    }
}

impl Drop for MacosEventTap {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poisoned() -> CaptureError {
    CaptureError::TapCreateFailed("capture state lock poisoned".to_string())
}

fn run_tap_loop(
    sender: Arc<Mutex<Option<Sender<KeyEvent>>>>,
    ready: mpsc::SyncSender<Result<TapRunLoop, CaptureError>>,
    stop: Arc<AtomicBool>,
) {
    // Filled in once the tap exists; read by the callback to re-enable it.
    let port: Rc<Cell<Option<CFMachPortRef>>> = Rc::new(Cell::new(None));
    let callback_port = Rc::clone(&port);
    let callback_sender = Arc::clone(&sender);

    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::KeyDown, CGEventType::KeyUp],
        move |_proxy, event_type, event| {
            match classify(event_type) {
                TapEvent::Key(kind) => forward_key_event(&callback_sender, kind, event),
                TapEvent::Disabled => {
                    warn!("event tap disabled by the system; re-enabling");
                    if let Some(port) = callback_port.get() {
                        // SAFETY: `port` belongs to the tap that owns this callback,
                        // which outlives every invocation of it.
                        unsafe { CGEventTapEnable(port, true) };
                    }
                }
                TapEvent::Other => {}
            }
            None
        },
    );

    let tap = match tap {
        Ok(tap) => tap,
        Err(()) => {
            let _ = ready.send(Err(CaptureError::TapCreateFailed(
                "CGEventTapCreate returned NULL; is Input Monitoring permission granted?"
                    .to_string(),
            )));
            return;
        }
    };
    port.set(Some(tap.mach_port.as_concrete_TypeRef()));

    let source = match tap.mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(()) => {
            let _ = ready.send(Err(CaptureError::TapCreateFailed(
                "unable to create run loop source".to_string(),
            )));
            return;
        }
    };

    let run_loop = CFRunLoop::get_current();
    // SAFETY: kCFRunLoopCommonModes is an immutable CoreFoundation constant.
    run_loop.add_source(&source, unsafe { kCFRunLoopCommonModes });
    tap.enable();
    if ready.send(Ok(TapRunLoop(run_loop))).is_err() {
        return;
    }
    debug!("event tap installed");

    // A stop request that lands before the loop starts running is caught by
    // the flag on the next slice.
    while !stop.load(Ordering::SeqCst) {
        // SAFETY: kCFRunLoopDefaultMode is an immutable CoreFoundation constant.
        let _ = CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, RUN_LOOP_SLICE, false);
    }
    debug!("event tap run loop exited");
}

/// What the tap callback should do with an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapEvent {
    Key(KeyEventKind),
    Disabled,
    Other,
}

fn classify(event_type: CGEventType) -> TapEvent {
    match event_type {
        CGEventType::KeyDown => TapEvent::Key(KeyEventKind::KeyDown),
        CGEventType::KeyUp => TapEvent::Key(KeyEventKind::KeyUp),
        CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
            TapEvent::Disabled
        }
        _ => TapEvent::Other,
    }
}

fn forward_key_event(sender: &Mutex<Option<Sender<KeyEvent>>>, kind: KeyEventKind, event: &CGEvent) {
    let key_code = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
    let flags = ModifierFlags(event.get_flags().bits());

    let translated_char = match translate_key(key_code, flags) {
        Ok(ch) => ch,
        Err(status) => {
            warn!(key_code, status, "UCKeyTranslate failed; event dropped");
            return;
        }
    };

    let key_event = KeyEvent {
        kind,
        key_code,
        flags,
        translated_char,
    };

    let Ok(guard) = sender.lock() else {
        error!("event tap sender lock poisoned");
        return;
    };
    if let Some(tx) = guard.as_ref() {
        // A closed receiver means the recorder is shutting down.
        let _ = tx.send(key_event);
    }
}

/// First UTF-16 unit `key_code` produces on the current keyboard layout with
/// only Shift applied, or `0` if it produces nothing.
///
/// Input sources without Unicode layout data (some input methods) yield `0`.
/// A non-zero `OSStatus` from `UCKeyTranslate` is returned as the error.
fn translate_key(key_code: u16, flags: ModifierFlags) -> Result<u32, i32> {
    // SAFETY: the Copy rule gives us ownership of the returned source; CFType
    // releases it on drop.
    let source_ref = unsafe { TISCopyCurrentKeyboardLayoutInputSource() };
    if source_ref.is_null() {
        debug!("no current keyboard layout");
        return Ok(0);
    }
    let source = unsafe { CFType::wrap_under_create_rule(source_ref as CFTypeRef) };

    // SAFETY: `source` is a live input source; the property follows the Get
    // rule and is retained by CFData for as long as we read it.
    let layout_ref =
        unsafe { TISGetInputSourceProperty(source_ref, kTISPropertyUnicodeKeyLayoutData) };
    if layout_ref.is_null() {
        debug!("keyboard layout has no Unicode layout data");
        return Ok(0);
    }
    let layout = unsafe { CFData::wrap_under_get_rule(layout_ref as CFDataRef) };

    let mut dead_key_state: u32 = 0;
    let mut buf = [0u16; MAX_STRING_LENGTH];
    let mut actual: c_ulong = 0;
    // SAFETY: `layout` holds a UCKeyboardLayout, `buf` has MAX_STRING_LENGTH
    // units and every out-pointer is a live local.
    let status = unsafe {
        UCKeyTranslate(
            layout.bytes().as_ptr().cast(),
            key_code,
            UC_KEY_ACTION_DISPLAY,
            layout_modifier_state(flags),
            u32::from(LMGetKbdType()),
            UC_KEY_TRANSLATE_NO_DEAD_KEYS_MASK,
            &mut dead_key_state,
            MAX_STRING_LENGTH as c_ulong,
            &mut actual,
            buf.as_mut_ptr(),
        )
    };
    drop(source);

    if status != 0 {
        return Err(status);
    }
    Ok(if actual == 0 { 0 } else { u32::from(buf[0]) })
}
