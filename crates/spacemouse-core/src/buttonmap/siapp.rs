//! Windows 3DxWare virtual keys (`V3DK_*`) to canonical buttons.
//!
//! The Windows driver delivers button changes inside window messages, one
//! virtual key per press or release.  Virtual keys name the *function* of a
//! button rather than its position, so the same code means the same thing on
//! every device model.

use super::ButtonCodeTable;
use crate::domain::event::CanonicalButton;

pub const V3DK_MENU: u32 = 1;
pub const V3DK_FIT: u32 = 2;
pub const V3DK_TOP: u32 = 3;
pub const V3DK_RIGHT: u32 = 5;
pub const V3DK_FRONT: u32 = 6;
pub const V3DK_CW: u32 = 9;
pub const V3DK_1: u32 = 13;
pub const V3DK_2: u32 = 14;
pub const V3DK_3: u32 = 15;
pub const V3DK_4: u32 = 16;
pub const V3DK_ESC: u32 = 23;
pub const V3DK_ALT: u32 = 24;
pub const V3DK_SHIFT: u32 = 25;
pub const V3DK_CTRL: u32 = 26;
pub const V3DK_ROTATE: u32 = 27;

/// Table for the Windows 3DxWare backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiappButtonTable;

impl ButtonCodeTable for SiappButtonTable {
    fn lookup(&self, raw: u32) -> CanonicalButton {
        vkey_to_button(raw)
    }
}

/// Translates a 3DxWare virtual key to a [`CanonicalButton`].
pub fn vkey_to_button(vkey: u32) -> CanonicalButton {
    match vkey {
        V3DK_MENU => CanonicalButton::Menu,
        V3DK_FIT => CanonicalButton::Fit,
        V3DK_TOP => CanonicalButton::Top,
        V3DK_RIGHT => CanonicalButton::Right,
        V3DK_FRONT => CanonicalButton::Front,
        V3DK_CW => CanonicalButton::RollCw,
        V3DK_1 => CanonicalButton::Custom1,
        V3DK_2 => CanonicalButton::Custom2,
        V3DK_3 => CanonicalButton::Custom3,
        V3DK_4 => CanonicalButton::Custom4,
        V3DK_ESC => CanonicalButton::Escape,
        V3DK_ALT => CanonicalButton::Alt,
        V3DK_SHIFT => CanonicalButton::Shift,
        V3DK_CTRL => CanonicalButton::Ctrl,
        V3DK_ROTATE => CanonicalButton::LockRotation,
        _ => CanonicalButton::Undefined,
    }
}
