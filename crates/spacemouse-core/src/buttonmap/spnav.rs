//! spacenavd button numbers to canonical buttons.
//!
//! spacenavd reports one button number (`bnum`) per press or release event.
//! The numbers below are those of a SpaceMouse Wireless Pro; other models
//! reuse the same numbering for the buttons they share.

use super::ButtonCodeTable;
use crate::domain::event::CanonicalButton;

/// Table for the spacenavd backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpnavButtonTable;

impl ButtonCodeTable for SpnavButtonTable {
    fn lookup(&self, raw: u32) -> CanonicalButton {
        bnum_to_button(raw)
    }
}

/// Translates a spacenavd button number to a [`CanonicalButton`].
///
/// Returns [`CanonicalButton::Undefined`] for unmapped numbers.
pub fn bnum_to_button(bnum: u32) -> CanonicalButton {
    match bnum {
        0 => CanonicalButton::Menu,
        1 => CanonicalButton::Fit,
        2 => CanonicalButton::Top,
        4 => CanonicalButton::Right,
        5 => CanonicalButton::Front,
        8 => CanonicalButton::RollCw,
        12 => CanonicalButton::Custom1,
        13 => CanonicalButton::Custom2,
        14 => CanonicalButton::Custom3,
        15 => CanonicalButton::Custom4,
        22 => CanonicalButton::Escape,
        23 => CanonicalButton::Alt,
        24 => CanonicalButton::Shift,
        25 => CanonicalButton::Ctrl,
        26 => CanonicalButton::LockRotation,
        _ => CanonicalButton::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_MAPPINGS: &[(u32, CanonicalButton)] = &[
        (0, CanonicalButton::Menu),
        (1, CanonicalButton::Fit),
        (2, CanonicalButton::Top),
        (4, CanonicalButton::Right),
        (5, CanonicalButton::Front),
        (8, CanonicalButton::RollCw),
        (12, CanonicalButton::Custom1),
        (13, CanonicalButton::Custom2),
        (14, CanonicalButton::Custom3),
        (15, CanonicalButton::Custom4),
        (22, CanonicalButton::Escape),
        (23, CanonicalButton::Alt),
        (24, CanonicalButton::Shift),
        (25, CanonicalButton::Ctrl),
        (26, CanonicalButton::LockRotation),
    ];

    #[test]
    fn test_standard_bnums_map_to_expected_buttons() {
        for &(bnum, expected) in STANDARD_MAPPINGS {
            assert_eq!(SpnavButtonTable.lookup(bnum), expected, "bnum {bnum}");
        }
    }

    #[test]
    fn test_unmapped_bnums_are_undefined() {
        for bnum in [3u32, 6, 7, 9, 10, 11, 16, 21, 27, 31, 1000, u32::MAX] {
            assert_eq!(bnum_to_button(bnum), CanonicalButton::Undefined, "bnum {bnum}");
        }
    }

    #[test]
    fn test_every_defined_button_is_reachable() {
        for button in CanonicalButton::ALL {
            if button == CanonicalButton::Undefined {
                continue;
            }
            assert!(
                STANDARD_MAPPINGS.iter().any(|&(_, b)| b == button),
                "{button:?} has no spacenavd code"
            );
        }
    }
}
