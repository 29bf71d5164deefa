//! Button code tables: raw vendor button identifiers to [`CanonicalButton`].
//!
//! Every backend numbers the same physical buttons differently:
//!
//! | Button | spacenavd `bnum` | macOS 3DX bitmask bit | Windows `V3DK_*` |
//! |--------|------------------|-----------------------|------------------|
//! | Menu   | 0                | `1 << 0`              | 1                |
//! | Fit    | 1                | `1 << 1`              | 2                |
//! | Top    | 2                | `1 << 2`              | 3                |
//!
//! Each backend therefore ships its own table, and the tables are never
//! shared.  The translator only ever talks to the [`ButtonCodeTable`] trait, so
//! it stays backend-agnostic.
//!
//! Lookups are total: a raw code without an entry resolves to
//! [`CanonicalButton::Undefined`] and is still delivered, so applications can
//! notice and log buttons on hardware nobody has mapped yet.

pub mod connexion;
pub mod siapp;
pub mod spnav;

use crate::domain::event::CanonicalButton;

pub use connexion::ConnexionButtonTable;
pub use siapp::SiappButtonTable;
pub use spnav::SpnavButtonTable;

/// Fixed mapping from one backend's raw button codes to canonical buttons.
///
/// For bitmask backends `raw` is the value of a single bit (e.g. `0x4`), not
/// its index.
pub trait ButtonCodeTable {
    /// Resolves `raw`, returning [`CanonicalButton::Undefined`] when unmapped.
    fn lookup(&self, raw: u32) -> CanonicalButton;
}

impl<T: ButtonCodeTable + ?Sized> ButtonCodeTable for &T {
    fn lookup(&self, raw: u32) -> CanonicalButton {
        (**self).lookup(raw)
    }
}

/// A table backed by a static slice of `(raw, button)` pairs.
///
/// Useful for devices with a non-standard layout and for tests.  The first
/// matching entry wins.
#[derive(Debug, Clone, Copy)]
pub struct StaticButtonTable {
    entries: &'static [(u32, CanonicalButton)],
}

impl StaticButtonTable {
    pub const fn new(entries: &'static [(u32, CanonicalButton)]) -> Self {
        Self { entries }
    }
}

impl ButtonCodeTable for StaticButtonTable {
    fn lookup(&self, raw: u32) -> CanonicalButton {
        self.entries
            .iter()
            .find(|(code, _)| *code == raw)
            .map(|&(_, button)| button)
            .unwrap_or(CanonicalButton::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: StaticButtonTable = StaticButtonTable::new(&[
        (0x1, CanonicalButton::Top),
        (0x4, CanonicalButton::Fit),
    ]);

    #[test]
    fn test_static_table_resolves_entries() {
        assert_eq!(TABLE.lookup(0x1), CanonicalButton::Top);
        assert_eq!(TABLE.lookup(0x4), CanonicalButton::Fit);
    }

    #[test]
    fn test_static_table_unmapped_is_undefined() {
        assert_eq!(TABLE.lookup(0x2), CanonicalButton::Undefined);
    }

    #[test]
    fn test_backend_tables_agree_on_physical_buttons() {
        // The 3DX bitmask bit for a button is 1 << (spacenavd button number).
        for bnum in 0u32..32 {
            assert_eq!(
                SpnavButtonTable.lookup(bnum),
                ConnexionButtonTable.lookup(1 << bnum),
                "spnav {bnum} and 3DX bit {bnum} disagree"
            );
        }
    }

    #[test]
    fn test_reference_table_forwards_lookup() {
        let table = &SpnavButtonTable;
        assert_eq!(table.lookup(1), CanonicalButton::Fit);
    }
}
