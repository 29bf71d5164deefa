//! State translation: raw device samples to canonical events.
//!
//! A [`StateTranslator`] owns the only mutable state on the event path:
//!
//! - the last observed button bitmask (for edge-triggered diffing), and
//! - the [`ModifierKeyTracker`].
//!
//! It is driven sequentially by exactly one backend, so it needs no locking.
//! Events are pushed into an [`EventSink`] as they are produced, which keeps
//! the modifier snapshot in each [`ButtonEvent`] exact: it is taken at the
//! moment that particular event is emitted.
//!
//! # Button diffing
//!
//! Bitmask backends report the full state; the translator computes
//! `changed = old ^ new` and emits one event per changed bit, lowest bit
//! first.  Two buttons changing in the same sample are two events.
//!
//! Transition backends report one explicit `(code, pressed)` pair per
//! message.  That is the single-element case of the same rule, so they skip
//! the diff.

mod motion;
mod recording;

pub use motion::{translate_motion, DEFAULT_AXIS};
pub use recording::RecordingSink;

use tracing::debug;

use crate::buttonmap::ButtonCodeTable;
use crate::domain::event::{ButtonEvent, CanonicalButton, CanonicalEvent};
use crate::domain::modifiers::{ModifierKeySet, ModifierKeyTracker};

/// Receives canonical events as the translator produces them.
pub trait EventSink {
    fn emit(&self, event: CanonicalEvent);
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: CanonicalEvent) {
        (**self).emit(event)
    }
}

/// One untranslated sample from a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSample {
    /// Translation and rotation in device units.
    Motion {
        translation: [i32; 3],
        rotation: [i32; 3],
    },
    /// The complete button bitmask (bitmask backends).
    Buttons(u32),
    /// One explicit button transition (transition backends).
    ButtonTransition { code: u32, pressed: bool },
}

/// Converts raw samples into canonical events for one backend.
#[derive(Debug, Clone)]
pub struct StateTranslator<T> {
    table: T,
    last_buttons: u32,
    modifiers: ModifierKeyTracker,
}

impl<T: ButtonCodeTable> StateTranslator<T> {
    /// Creates a translator with all buttons released and no modifiers held.
    pub fn new(table: T) -> Self {
        Self {
            table,
            last_buttons: 0,
            modifiers: ModifierKeyTracker::new(),
        }
    }

    /// Returns to the initial "all released" state.
    pub fn reset(&mut self) {
        self.last_buttons = 0;
        self.modifiers.reset();
    }

    /// The bitmask the next [`RawSample::Buttons`] sample is diffed against.
    pub fn last_buttons(&self) -> u32 {
        self.last_buttons
    }

    /// The modifiers currently held.
    pub fn modifiers(&self) -> ModifierKeySet {
        self.modifiers.current()
    }

    /// Translates one sample, emitting zero or more events into `sink`.
    pub fn process<S: EventSink + ?Sized>(&mut self, sample: RawSample, sink: &S) {
        match sample {
            RawSample::Motion {
                translation,
                rotation,
            } => sink.emit(CanonicalEvent::Move(translate_motion(translation, rotation))),
            RawSample::Buttons(mask) => self.process_buttons(mask, sink),
            RawSample::ButtonTransition { code, pressed } => {
                self.emit_button(code, pressed, sink)
            }
        }
    }

    /// Diffs `mask` against the previous bitmask and emits one event per
    /// changed bit.
    pub fn process_buttons<S: EventSink + ?Sized>(&mut self, mask: u32, sink: &S) {
        let mut changed = self.last_buttons ^ mask;
        // Updated before dispatch: a sink that unwinds must not leave a stale mask.
        self.last_buttons = mask;

        while changed != 0 {
            let bit = changed & changed.wrapping_neg();
            changed &= !bit;
            self.emit_button(bit, mask & bit != 0, sink);
        }
    }

    fn emit_button<S: EventSink + ?Sized>(&mut self, raw: u32, pressed: bool, sink: &S) {
        let button = self.table.lookup(raw);
        if button == CanonicalButton::Undefined {
            debug!(raw, pressed, "unmapped raw button code");
        }

        if pressed {
            self.modifiers.on_press(button);
        } else {
            self.modifiers.on_release(button);
        }

        let event = ButtonEvent {
            button,
            modifiers: self.modifiers.current(),
        };
        sink.emit(if pressed {
            CanonicalEvent::ButtonPress(event)
        } else {
            CanonicalEvent::ButtonRelease(event)
        });
    }
}
