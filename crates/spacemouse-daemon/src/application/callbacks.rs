//! Callback slots: where canonical events leave the daemon.
//!
//! The application may install or replace callbacks at any time, from any
//! thread, while a backend thread is dispatching.  Each dispatch takes a
//! snapshot of the current callback under the lock and invokes it with the
//! lock released, so a callback can itself call the setters without
//! deadlocking.  An event is delivered to the callback that was installed
//! when the event was dispatched.
//!
//! A panicking callback is contained: the panic is caught, reported through
//! `tracing` and the log sink, and translation carries on with the next
//! event.
//!
//! [`CallbackSlots::clear`] waits for dispatches already in flight, so once
//! it returns no previously installed callback is running.  Called from
//! inside a callback it cannot wait for itself and returns at once.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use spacemouse_core::{ButtonEvent, CanonicalEvent, EventSink, MoveEvent};
use tracing::warn;

use super::log_sink::LogSink;

pub type MoveCallback = Arc<dyn Fn(MoveEvent) + Send + Sync>;
pub type ButtonCallback = Arc<dyn Fn(ButtonEvent) + Send + Sync>;

#[derive(Clone)]
struct Slots {
    on_move: MoveCallback,
    on_press: ButtonCallback,
    on_release: ButtonCallback,
    log_sink: LogSink,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            on_move: Arc::new(|_: MoveEvent| {}),
            on_press: Arc::new(|_: ButtonEvent| {}),
            on_release: Arc::new(|_: ButtonEvent| {}),
            log_sink: LogSink::noop(),
        }
    }
}

/// The application's three event callbacks plus its log sink.
///
/// Unset callbacks are no-ops, so every event is always "delivered".
#[derive(Default)]
pub struct CallbackSlots {
    slots: RwLock<Slots>,
    /// Held shared for the length of every dispatch.
    gate: RwLock<()>,
}

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

impl CallbackSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_sink(log_sink: LogSink) -> Self {
        let slots = Self::new();
        slots.set_log_sink(log_sink);
        slots
    }

    pub fn set_move(&self, callback: impl Fn(MoveEvent) + Send + Sync + 'static) {
        self.write().on_move = Arc::new(callback);
    }

    pub fn set_press(&self, callback: impl Fn(ButtonEvent) + Send + Sync + 'static) {
        self.write().on_press = Arc::new(callback);
    }

    pub fn set_release(&self, callback: impl Fn(ButtonEvent) + Send + Sync + 'static) {
        self.write().on_release = Arc::new(callback);
    }

    pub fn set_log_sink(&self, log_sink: LogSink) {
        self.write().log_sink = log_sink;
    }

    /// Resets all three callbacks to no-ops and detaches the log sink, in
    /// one step.  Any event dispatched afterwards sees only no-ops.
    ///
    /// Returns once in-flight dispatches on other threads have finished.
    pub fn clear(&self) {
        *self.write() = Slots::default();
        if !DISPATCHING.with(Cell::get) {
            drop(self.gate.write().unwrap_or_else(PoisonError::into_inner));
        }
    }

    /// Sends `message` to the current log sink.
    pub fn log(&self, message: &str) {
        let sink = self.read().log_sink.clone();
        sink.log(message);
    }

    pub fn dispatch_move(&self, event: MoveEvent) {
        let _gate = self.enter();
        let callback = self.read().on_move.clone();
        self.guarded("move", || callback(event));
    }

    pub fn dispatch_press(&self, event: ButtonEvent) {
        let _gate = self.enter();
        let callback = self.read().on_press.clone();
        self.guarded("button press", || callback(event));
    }

    pub fn dispatch_release(&self, event: ButtonEvent) {
        let _gate = self.enter();
        let callback = self.read().on_release.clone();
        self.guarded("button release", || callback(event));
    }

    fn enter(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn guarded(&self, slot: &str, f: impl FnOnce()) {
        let outer = DISPATCHING.with(|d| d.replace(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(f));
        DISPATCHING.with(|d| d.set(outer));
        if let Err(payload) = outcome {
            let reason = panic_message(payload.as_ref());
            warn!(slot, reason, "event callback panicked");
            self.log(&format!("{slot} callback panicked: {reason}"));
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for CallbackSlots {
    fn emit(&self, event: CanonicalEvent) {
        match event {
            CanonicalEvent::Move(e) => self.dispatch_move(e),
            CanonicalEvent::ButtonPress(e) => self.dispatch_press(e),
            CanonicalEvent::ButtonRelease(e) => self.dispatch_release(e),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
