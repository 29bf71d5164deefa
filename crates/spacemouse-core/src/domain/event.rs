//! Canonical spacemouse events.
//!
//! These are the only shapes an application ever sees, regardless of which
//! vendor driver produced the underlying sample.
//!
//! # Rotation encoding
//!
//! Drivers report rotation as a raw 3-component vector `(rx, ry, rz)`.  A
//! [`MoveEvent`] stores it in axis-angle form instead:
//!
//! - `angle` is the Euclidean norm of the raw vector (still in device units).
//! - `(axis_x, axis_y, axis_z)` is the unit vector parallel to it.
//!
//! The zero vector has no direction, so it is encoded as `angle = 0` with the
//! axis pinned to `(0, 0, 1)`.  Consumers never see a NaN axis.

use serde::{Deserialize, Serialize};

use super::modifiers::ModifierKeySet;

/// A translation and/or rotation movement of the cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Translation along x (device units).
    pub tx: i32,
    /// Translation along y (device units).
    pub ty: i32,
    /// Translation along z (device units).
    pub tz: i32,
    /// Rotation angle: norm of the raw rotation vector.
    pub angle: f64,
    /// Rotation axis, x component.
    pub axis_x: f64,
    /// Rotation axis, y component.
    pub axis_y: f64,
    /// Rotation axis, z component.
    pub axis_z: f64,
}

impl MoveEvent {
    /// Returns the rotation axis as an array.
    pub fn axis(&self) -> [f64; 3] {
        [self.axis_x, self.axis_y, self.axis_z]
    }

    /// Returns the translation as an array.
    pub fn translation(&self) -> [i32; 3] {
        [self.tx, self.ty, self.tz]
    }
}

/// Buttons found on a spacemouse, independent of the backend that reported them.
///
/// The numeric values are stable and are what the language bindings hand to
/// applications.  [`CanonicalButton::Undefined`] stands for any hardware button
/// that no backend table knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CanonicalButton {
    // View buttons
    Top = 0,
    Right = 1,
    Front = 2,
    /// Roll the view clockwise in the plane orthogonal to the view direction.
    RollCw = 3,
    LockRotation = 4,

    // Configurable buttons
    Custom1 = 5,
    Custom2 = 6,
    Custom3 = 7,
    Custom4 = 8,

    // Keyboard-style keys
    Escape = 9,
    Shift = 10,
    Ctrl = 11,
    Alt = 12,

    Menu = 13,
    /// Fit the shown objects to the screen.
    Fit = 14,

    Undefined = 15,
}

impl CanonicalButton {
    /// All buttons in numeric order.
    pub const ALL: [CanonicalButton; 16] = [
        CanonicalButton::Top,
        CanonicalButton::Right,
        CanonicalButton::Front,
        CanonicalButton::RollCw,
        CanonicalButton::LockRotation,
        CanonicalButton::Custom1,
        CanonicalButton::Custom2,
        CanonicalButton::Custom3,
        CanonicalButton::Custom4,
        CanonicalButton::Escape,
        CanonicalButton::Shift,
        CanonicalButton::Ctrl,
        CanonicalButton::Alt,
        CanonicalButton::Menu,
        CanonicalButton::Fit,
        CanonicalButton::Undefined,
    ];

    /// Returns the stable numeric value of this button.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A button press or release, with the modifiers held at emission time.
///
/// `modifiers` is a copy: later modifier changes never affect an event that
/// has already been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button: CanonicalButton,
    pub modifiers: ModifierKeySet,
}

/// Any event the translator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanonicalEvent {
    Move(MoveEvent),
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
}
