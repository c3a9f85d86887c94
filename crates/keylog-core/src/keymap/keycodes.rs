//! macOS virtual key codes used by the glyph table.
//!
//! Values are the `kVK_*` constants from Carbon `Events.h` (HIToolbox
//! framework).  They identify physical key positions, so they are independent
//! of the active keyboard layout.

pub const RETURN: u16 = 0x24; // kVK_Return
pub const TAB: u16 = 0x30; // kVK_Tab
pub const SPACE: u16 = 0x31; // kVK_Space
pub const DELETE: u16 = 0x33; // kVK_Delete
pub const ESCAPE: u16 = 0x35; // kVK_Escape
pub const HOME: u16 = 0x73; // kVK_Home
pub const PAGE_UP: u16 = 0x74; // kVK_PageUp
pub const FORWARD_DELETE: u16 = 0x75; // kVK_ForwardDelete
pub const END: u16 = 0x77; // kVK_End
pub const PAGE_DOWN: u16 = 0x79; // kVK_PageDown
pub const LEFT_ARROW: u16 = 0x7B; // kVK_LeftArrow
pub const RIGHT_ARROW: u16 = 0x7C; // kVK_RightArrow
pub const DOWN_ARROW: u16 = 0x7D; // kVK_DownArrow
pub const UP_ARROW: u16 = 0x7E; // kVK_UpArrow

pub const ANSI_A: u16 = 0x00; // kVK_ANSI_A
pub const ANSI_C: u16 = 0x08; // kVK_ANSI_C
pub const ANSI_1: u16 = 0x12; // kVK_ANSI_1
pub const F1: u16 = 0x7A; // kVK_F1
pub const KEYPAD_ENTER: u16 = 0x4C; // kVK_ANSI_KeypadEnter
