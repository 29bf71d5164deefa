//! Modifier keys held on the device itself.
//!
//! Some spacemice carry Shift, Ctrl and Alt keys.  They are reported like any
//! other button, but applications usually want to know which of them are
//! *held* when another button goes down.  [`ModifierKeyTracker`] keeps that
//! state; every [`ButtonEvent`](super::event::ButtonEvent) carries a snapshot
//! of it.
//!
//! Set semantics, not a reference count: pressing Shift twice without a
//! release in between leaves it held once, and one release clears it.

use serde::{Deserialize, Serialize};

use super::event::CanonicalButton;

/// Set over {Shift, Ctrl, Alt}, stored as a bitmask.
///
/// | Bit | Key   |
/// |-----|-------|
/// | 1   | Shift |
/// | 2   | Ctrl  |
/// | 4   | Alt   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierKeySet(u8);

impl ModifierKeySet {
    pub const EMPTY: ModifierKeySet = ModifierKeySet(0);
    pub const SHIFT: ModifierKeySet = ModifierKeySet(1 << 0);
    pub const CTRL: ModifierKeySet = ModifierKeySet(1 << 1);
    pub const ALT: ModifierKeySet = ModifierKeySet(1 << 2);

    const ALL_BITS: u8 = 0b111;

    /// Builds a set from raw bits, ignoring bits outside {Shift, Ctrl, Alt}.
    pub fn from_bits_truncate(bits: u8) -> Self {
        ModifierKeySet(bits & Self::ALL_BITS)
    }

    /// Returns the raw bitmask.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every key in `other` is in `self`.
    pub fn contains(self, other: ModifierKeySet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ModifierKeySet) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ModifierKeySet) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if Shift is held.
    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    /// Returns `true` if Ctrl is held.
    pub fn ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }

    /// Returns `true` if Alt is held.
    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }

    /// The modifier a canonical button stands for, if any.
    pub fn for_button(button: CanonicalButton) -> Option<ModifierKeySet> {
        match button {
            CanonicalButton::Shift => Some(Self::SHIFT),
            CanonicalButton::Ctrl => Some(Self::CTRL),
            CanonicalButton::Alt => Some(Self::ALT),
            _ => None,
        }
    }
}

impl std::ops::BitOr for ModifierKeySet {
    type Output = ModifierKeySet;

    fn bitor(self, rhs: ModifierKeySet) -> ModifierKeySet {
        ModifierKeySet(self.0 | rhs.0)
    }
}

/// Accumulates which modifiers are currently held.
///
/// Only Shift, Ctrl and Alt change the state; every other button is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierKeyTracker {
    current: ModifierKeySet,
}

impl ModifierKeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_press(&mut self, button: CanonicalButton) {
        if let Some(modifier) = ModifierKeySet::for_button(button) {
            self.current.insert(modifier);
        }
    }

    pub fn on_release(&mut self, button: CanonicalButton) {
        if let Some(modifier) = ModifierKeySet::for_button(button) {
            self.current.remove(modifier);
        }
    }

    /// Snapshot of the held modifiers.
    pub fn current(&self) -> ModifierKeySet {
        self.current
    }

    /// Forgets all held modifiers.
    pub fn reset(&mut self) {
        self.current = ModifierKeySet::EMPTY;
    }
}
