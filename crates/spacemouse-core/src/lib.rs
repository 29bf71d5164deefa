//! # spacemouse-core
//!
//! Vendor-independent event model and state translation for 3D input devices
//! ("spacemice").
//!
//! This crate has zero dependencies on OS APIs, vendor SDKs, or threads.  The
//! daemon crate owns the acquisition loops and callback plumbing; everything
//! that decides *what* an application sees lives here.
//!
//! # Architecture overview
//!
//! A spacemouse reports six axes (three translation, three rotation) and a
//! handful of buttons.  Each vendor driver reports them differently:
//!
//! - spacenavd sends one explicit button number per press or release.
//! - The macOS 3DX client library sends the full button bitmask on every change.
//! - The Windows 3DxWare driver sends virtual-key codes inside window messages.
//!
//! This crate defines:
//!
//! - **`domain`** – The canonical event shapes ([`MoveEvent`], [`ButtonEvent`])
//!   and the modifier-key state ([`ModifierKeySet`], [`ModifierKeyTracker`]).
//!
//! - **`buttonmap`** – One fixed [`ButtonCodeTable`] per backend mapping raw
//!   codes onto [`CanonicalButton`].  Unmapped codes resolve to
//!   [`CanonicalButton::Undefined`].
//!
//! - **`translate`** – The [`StateTranslator`]: turns one raw sample into zero
//!   or more canonical events, diffing button state and tracking modifiers.

pub mod buttonmap;
pub mod domain;
pub mod translate;

pub use buttonmap::ButtonCodeTable;
pub use domain::event::{ButtonEvent, CanonicalButton, CanonicalEvent, MoveEvent};
pub use domain::modifiers::{ModifierKeySet, ModifierKeyTracker};
pub use translate::{translate_motion, EventSink, RawSample, RecordingSink, StateTranslator};
