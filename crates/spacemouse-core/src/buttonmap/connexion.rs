//! macOS 3Dconnexion client bitmask bits to canonical buttons.
//!
//! The 3DX client library reports the complete button state as a 32-bit mask
//! on every change.  Each button owns one bit; this table is keyed by the bit
//! *value* (`1 << n`), which is what the translator passes after splitting the
//! changed mask into single bits.
//!
//! Several of these bits are only reported when the vendor driver is
//! configured to pass the button through to the application.

use super::ButtonCodeTable;
use crate::domain::event::CanonicalButton;

pub const BIT_MENU: u32 = 1 << 0;
pub const BIT_FIT: u32 = 1 << 1;
pub const BIT_TOP: u32 = 1 << 2;
pub const BIT_RIGHT: u32 = 1 << 4;
pub const BIT_FRONT: u32 = 1 << 5;
pub const BIT_ROLL_CW: u32 = 1 << 8;
pub const BIT_CUSTOM_1: u32 = 1 << 12;
pub const BIT_CUSTOM_2: u32 = 1 << 13;
pub const BIT_CUSTOM_3: u32 = 1 << 14;
pub const BIT_CUSTOM_4: u32 = 1 << 15;
pub const BIT_ESCAPE: u32 = 1 << 22;
pub const BIT_ALT: u32 = 1 << 23;
pub const BIT_SHIFT: u32 = 1 << 24;
pub const BIT_CTRL: u32 = 1 << 25;
pub const BIT_LOCK_ROTATION: u32 = 1 << 26;

/// Table for the macOS 3DX backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnexionButtonTable;

impl ButtonCodeTable for ConnexionButtonTable {
    fn lookup(&self, raw: u32) -> CanonicalButton {
        bit_to_button(raw)
    }
}

/// Translates a single 3DX button bit to a [`CanonicalButton`].
///
/// Values with zero or several bits set never match and resolve to
/// [`CanonicalButton::Undefined`].
pub fn bit_to_button(bit: u32) -> CanonicalButton {
    match bit {
        BIT_MENU => CanonicalButton::Menu,
        BIT_FIT => CanonicalButton::Fit,
        BIT_TOP => CanonicalButton::Top,
        BIT_RIGHT => CanonicalButton::Right,
        BIT_FRONT => CanonicalButton::Front,
        BIT_ROLL_CW => CanonicalButton::RollCw,
        BIT_CUSTOM_1 => CanonicalButton::Custom1,
        BIT_CUSTOM_2 => CanonicalButton::Custom2,
        BIT_CUSTOM_3 => CanonicalButton::Custom3,
        BIT_CUSTOM_4 => CanonicalButton::Custom4,
        BIT_ESCAPE => CanonicalButton::Escape,
        BIT_ALT => CanonicalButton::Alt,
        BIT_SHIFT => CanonicalButton::Shift,
        BIT_CTRL => CanonicalButton::Ctrl,
        BIT_LOCK_ROTATION => CanonicalButton::LockRotation,
        _ => CanonicalButton::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_bits_map_to_expected_buttons() {
        assert_eq!(bit_to_button(4), CanonicalButton::Top);
        assert_eq!(bit_to_button(16), CanonicalButton::Right);
        assert_eq!(bit_to_button(32), CanonicalButton::Front);
        assert_eq!(bit_to_button(256), CanonicalButton::RollCw);
        assert_eq!(bit_to_button(67_108_864), CanonicalButton::LockRotation);
        assert_eq!(bit_to_button(4096), CanonicalButton::Custom1);
        assert_eq!(bit_to_button(32_768), CanonicalButton::Custom4);
        assert_eq!(bit_to_button(4_194_304), CanonicalButton::Escape);
        assert_eq!(bit_to_button(16_777_216), CanonicalButton::Shift);
        assert_eq!(bit_to_button(33_554_432), CanonicalButton::Ctrl);
        assert_eq!(bit_to_button(8_388_608), CanonicalButton::Alt);
        assert_eq!(bit_to_button(1), CanonicalButton::Menu);
        assert_eq!(bit_to_button(2), CanonicalButton::Fit);
    }

    #[test]
    fn test_multi_bit_values_are_undefined() {
        assert_eq!(bit_to_button(BIT_TOP | BIT_FIT), CanonicalButton::Undefined);
        assert_eq!(bit_to_button(0), CanonicalButton::Undefined);
    }

    #[test]
    fn test_unmapped_single_bits_are_undefined() {
        for n in [3u32, 6, 7, 9, 10, 11, 16, 20, 21, 27, 31] {
            assert_eq!(ConnexionButtonTable.lookup(1 << n), CanonicalButton::Undefined, "bit {n}");
        }
    }
}
