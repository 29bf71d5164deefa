//! Domain types with no OS or vendor dependencies.
//!
//! - [`event`] – canonical move and button events.
//! - [`modifiers`] – the Shift/Ctrl/Alt set and the tracker that maintains it.
//!
//! Every type here is plain data: `Copy`, `Send` and `Sync`, so events can be
//! handed from the acquisition thread to any consumer without sharing state.

pub mod event;
pub mod modifiers;
