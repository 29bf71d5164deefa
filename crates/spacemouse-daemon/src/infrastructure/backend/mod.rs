//! Backends: the vendor-specific side of device acquisition.
//!
//! A backend turns whatever its vendor driver delivers into [`RawSample`]s,
//! runs them through its own [`StateTranslator`], and hands the resulting
//! canonical events to the [`SharedSink`] it was initialized with.
//!
//! Two delivery styles exist:
//!
//! - **Pull** ([`spnav`]): the backend starts a dedicated polling thread in
//!   `initialize()` and joins it in `close()`.
//! - **Push** ([`connexion`], [`siapp`]): the OS or vendor library delivers
//!   messages to the application, whose message pump forwards each one to
//!   [`PushBackend::process_message`].  No thread is started; translation
//!   runs synchronously on the caller's thread.
//!
//! Exactly one backend is active per daemon, and it is the only writer of its
//! translator state.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --initialize()--> Running --close()--> Stopped
//!                                    ^                    |
//!                                    +---initialize()-----+
//! ```
//!
//! `initialize()` on a running backend and `close()` on a stopped one are
//! no-ops.  A failed `initialize()` leaves the backend not initialized.
//!
//! Closing a pull backend means joining its polling thread.  Callers that
//! hold a lock the polling thread may also need (the daemon's backend lock)
//! use [`Backend::begin_close`] instead: it stops the backend under the lock
//! and returns the join as a [`PendingClose`] to finish after unlocking.
//!
//! # Testability
//!
//! Vendor SDK calls sit behind small collaborator traits
//! ([`spnav::SpnavConnection`], [`connexion::ConnexionClient`],
//! [`siapp::SiappDriver`]) so every backend can be exercised with in-memory
//! fakes.  [`mock::MockBackend`] stands in for a whole backend.
//!
//! [`RawSample`]: spacemouse_core::RawSample
//! [`StateTranslator`]: spacemouse_core::StateTranslator

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spacemouse_core::EventSink;

pub mod connexion;
pub mod mock;
pub mod siapp;
pub mod spnav;

#[cfg(unix)]
pub mod spnav_socket;

/// The sink a backend delivers canonical events to.
pub type SharedSink = Arc<dyn EventSink + Send + Sync>;

/// Error type for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The vendor daemon or driver could not be reached.
    #[error("device backend unavailable: {0}")]
    Unavailable(String),
    /// The vendor library returned an error code.
    #[error("vendor driver returned error code {0}")]
    Driver(i32),
    /// The Windows driver needs a window to post messages to.
    #[error("a window handle must be set before initializing")]
    MissingWindowHandle,
    /// The polling thread could not be started.
    #[error("failed to spawn polling thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Identifies a backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// spacenavd (Linux), pull-style.
    Spnav,
    /// 3Dconnexion client library (macOS), push-style.
    Connexion,
    /// 3DxWare driver (Windows), push-style.
    Siapp,
    /// In-memory backend for tests.
    Mock,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Spnav => "spnav",
            BackendKind::Connexion => "3dx",
            BackendKind::Siapp => "siapp",
            BackendKind::Mock => "mock",
        })
    }
}

/// A device backend.
pub trait Backend: Send {
    fn kind(&self) -> BackendKind;

    /// Acquires the device and starts delivering events into `sink`.
    ///
    /// No-op when already initialized.
    fn initialize(&mut self, sink: SharedSink) -> Result<(), BackendError>;

    /// Releases the device.  After this returns no further events reach the
    /// sink.  No-op when not initialized.
    fn close(&mut self);

    /// Stops the backend, leaving any blocking wait to the returned
    /// [`PendingClose`].  `is_initialized()` is `false` once this returns.
    ///
    /// Backends that close synchronously keep the default.
    fn begin_close(&mut self) -> Option<PendingClose> {
        self.close();
        None
    }

    fn is_initialized(&self) -> bool;
}

/// The blocking remainder of a [`Backend::begin_close`].
///
/// No event reaches the sink once [`finish`](Self::finish) returns.
#[must_use = "the backend is not fully closed until the pending close is finished"]
pub struct PendingClose(Box<dyn FnOnce() + Send>);

impl PendingClose {
    pub fn new(finish: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(finish))
    }

    pub fn finish(self) {
        (self.0)()
    }
}

impl fmt::Debug for PendingClose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingClose(..)")
    }
}

/// A backend fed by an external message pump.
pub trait PushBackend: Backend {
    /// The platform message type the pump hands over.
    type Message: ?Sized;

    /// Translates `message` synchronously.
    ///
    /// Returns `true` when the message was device-related and therefore
    /// consumed; `false` lets the pump pass it on.
    fn process_message(&mut self, message: &Self::Message) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_display_names() {
        assert_eq!(BackendKind::Spnav.to_string(), "spnav");
        assert_eq!(BackendKind::Connexion.to_string(), "3dx");
        assert_eq!(BackendKind::Siapp.to_string(), "siapp");
    }

    #[test]
    fn test_pending_close_runs_its_work_on_finish() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let done = Arc::new(AtomicBool::new(false));
        let d = done.clone();
        let pending = PendingClose::new(move || d.store(true, Ordering::SeqCst));

        assert!(!done.load(Ordering::SeqCst));
        pending.finish();
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn test_backend_error_messages_name_the_cause() {
        let err = BackendError::Unavailable("spacenavd not running".to_string());
        assert_eq!(err.to_string(), "device backend unavailable: spacenavd not running");
        assert_eq!(BackendError::Driver(-43).to_string(), "vendor driver returned error code -43");
    }
}
