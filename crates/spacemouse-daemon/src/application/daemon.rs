//! The event daemon: one backend, three callbacks, one log sink.
//!
//! `EventDaemon` is the single handle an application holds.  It owns the
//! active backend and the [`CallbackSlots`] the backend delivers into, and
//! exposes the lifecycle (`initialize` / `close`), the callback setters, and
//! `release`.
//!
//! # Sharing
//!
//! Applications usually want one daemon per process, reachable from
//! wherever callbacks are registered.  [`initialize_daemon`] returns a
//! [`DaemonHandle`] (an `Arc`) that is created and initialized once and then
//! cloned to every caller; dropping the last clone closes the backend.
//!
//! # Threading
//!
//! All methods take `&self` and may be called from any thread.  Callbacks run
//! on the backend's acquisition thread (the polling thread for pull
//! backends, the caller of [`EventDaemon::process_message`] for push
//! backends).
//!
//! A callback may call `is_initialized`, `kind`, the setters and `release`
//! on the daemon that invoked it; none of these wait on the backend.  It must
//! not call `initialize`, `close`, `process_message` or `with_backend`.
//!
//! `close` stops the backend under the backend lock but waits for a polling
//! thread only after unlocking, so a callback still in flight on that thread
//! never contends with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use spacemouse_core::{ButtonEvent, MoveEvent};
use thiserror::Error;
use tracing::{info, warn};

use super::callbacks::CallbackSlots;
use super::log_sink::LogSink;
use crate::infrastructure::backend::{Backend, BackendError, BackendKind, PushBackend, SharedSink};

/// Error type for daemon operations.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("backend initialization failed: {0}")]
    Backend(#[from] BackendError),
}

/// Shared handle to a daemon.
pub type DaemonHandle<B> = Arc<EventDaemon<B>>;

/// Owns a backend and routes its events to application callbacks.
pub struct EventDaemon<B: Backend> {
    backend: Mutex<B>,
    slots: Arc<CallbackSlots>,
    kind: BackendKind,
    /// Mirrors `backend.is_initialized()`; only written under the backend lock.
    initialized: AtomicBool,
    /// Serializes `initialize` and `close`, including the unlocked join.
    lifecycle: Mutex<()>,
}

impl<B: Backend> EventDaemon<B> {
    /// Creates an uninitialized daemon with no log sink.
    pub fn new(backend: B) -> Self {
        Self::with_log_sink(backend, LogSink::noop())
    }

    /// Creates an uninitialized daemon reporting lifecycle messages to
    /// `log_sink`.
    pub fn with_log_sink(backend: B, log_sink: LogSink) -> Self {
        Self {
            kind: backend.kind(),
            initialized: AtomicBool::new(backend.is_initialized()),
            backend: Mutex::new(backend),
            slots: Arc::new(CallbackSlots::with_log_sink(log_sink)),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Starts the backend.  No-op if it is already running.
    ///
    /// On failure the daemon stays uninitialized and may be initialized
    /// again later.
    pub fn initialize(&self) -> Result<(), DaemonError> {
        let _lifecycle = self.lock_lifecycle();
        let mut backend = self.lock_backend();
        if backend.is_initialized() {
            return Ok(());
        }

        let kind = self.kind;
        info!(%kind, "initializing backend");
        self.slots.log(&format!("initializing {kind} backend"));

        let sink: SharedSink = self.slots.clone();
        let result = backend.initialize(sink);
        self.initialized.store(backend.is_initialized(), Ordering::SeqCst);
        if let Err(e) = result {
            warn!(%kind, error = %e, "backend initialization failed");
            self.slots.log(&format!("{kind} backend initialization failed: {e}"));
            return Err(e.into());
        }
        Ok(())
    }

    /// Stops the backend.  No-op if it is not running.
    ///
    /// For pull backends this joins the polling thread, so no callback runs
    /// after `close` returns.
    pub fn close(&self) {
        let _lifecycle = self.lock_lifecycle();
        let pending = {
            let mut backend = self.lock_backend();
            if !backend.is_initialized() {
                return;
            }

            let kind = self.kind;
            info!(%kind, "closing backend");
            self.slots.log(&format!("closing {kind} backend"));
            let pending = backend.begin_close();
            self.initialized.store(backend.is_initialized(), Ordering::SeqCst);
            pending
        };
        if let Some(pending) = pending {
            pending.finish();
        }
    }

    /// Whether the backend is running.  Never waits on the backend.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Installs the move callback, replacing any previous one.
    pub fn set_move_callback(&self, callback: impl Fn(MoveEvent) + Send + Sync + 'static) {
        self.slots.set_move(callback);
    }

    /// Installs the button-press callback, replacing any previous one.
    pub fn set_button_press_callback(
        &self,
        callback: impl Fn(ButtonEvent) + Send + Sync + 'static,
    ) {
        self.slots.set_press(callback);
    }

    /// Installs the button-release callback, replacing any previous one.
    pub fn set_button_release_callback(
        &self,
        callback: impl Fn(ButtonEvent) + Send + Sync + 'static,
    ) {
        self.slots.set_release(callback);
    }

    pub fn set_log_sink(&self, log_sink: LogSink) {
        self.slots.set_log_sink(log_sink);
    }

    /// Detaches the application: resets all three callbacks to no-ops and
    /// drops the log sink, atomically.  The backend keeps running; use
    /// [`close`](Self::close) to stop it.
    ///
    /// Waits for callbacks already running on other threads, so no
    /// application callback runs once this returns.
    pub fn release(&self) {
        self.slots.clear();
        info!("application callbacks released");
    }

    /// Runs `f` with exclusive access to the backend, e.g. to set a
    /// platform handle before initializing.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut backend = self.lock_backend();
        let result = f(&mut backend);
        self.initialized.store(backend.is_initialized(), Ordering::SeqCst);
        result
    }

    fn lock_backend(&self) -> MutexGuard<'_, B> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: PushBackend> EventDaemon<B> {
    /// Forwards one platform message to the backend.
    ///
    /// Returns `true` when the message was device-related and consumed.
    /// Callbacks run on the calling thread before this returns.
    pub fn process_message(&self, message: &B::Message) -> bool {
        self.lock_backend().process_message(message)
    }
}

impl<B: Backend> Drop for EventDaemon<B> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Creates a shared daemon and initializes it.
///
/// Initialization failure is not an error here: it is logged, and the
/// returned daemon reports `is_initialized() == false`.
pub fn initialize_daemon<B: Backend>(backend: B, log_sink: LogSink) -> DaemonHandle<B> {
    let daemon = Arc::new(EventDaemon::with_log_sink(backend, log_sink));
    if let Err(e) = daemon.initialize() {
        warn!(error = %e, "daemon started without a device backend");
    }
    daemon
}
