//! An [`EventSink`] that records everything it receives.
//!
//! Used by tests and by tools that want to inspect a translated trace.
//! Events are stored behind a `Mutex` so the sink can be shared with a
//! background thread through an `Arc`.

use std::sync::{Mutex, PoisonError};

use super::EventSink;
use crate::domain::event::{ButtonEvent, CanonicalEvent, MoveEvent};

/// Records emitted events in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CanonicalEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    pub fn events(&self) -> Vec<CanonicalEvent> {
        self.lock().clone()
    }

    /// Removes and returns all recorded events.
    pub fn take(&self) -> Vec<CanonicalEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Recorded move events, in order.
    pub fn moves(&self) -> Vec<MoveEvent> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                CanonicalEvent::Move(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    /// Recorded press events, in order.
    pub fn presses(&self) -> Vec<ButtonEvent> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                CanonicalEvent::ButtonPress(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Recorded release events, in order.
    pub fn releases(&self) -> Vec<ButtonEvent> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                CanonicalEvent::ButtonRelease(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CanonicalEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: CanonicalEvent) {
        self.lock().push(event);
    }
}
