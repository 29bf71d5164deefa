//! In-memory backend for tests.
//!
//! `MockBackend` is a push-style backend whose messages are raw samples.  It
//! uses the 3DX bitmask table, so `RawSample::Buttons` masks are interpreted
//! with the `buttonmap::connexion::BIT_*` layout.
//!
//! # Example
//!
//! ```rust
//! use spacemouse_daemon::infrastructure::backend::mock::MockBackend;
//! use spacemouse_daemon::{EventDaemon, LogSink};
//! use spacemouse_core::RawSample;
//!
//! let daemon = EventDaemon::with_log_sink(MockBackend::new(), LogSink::noop());
//! daemon.initialize().unwrap();
//! assert!(daemon.process_message(&RawSample::Buttons(1 << 2)));
//! ```

use spacemouse_core::buttonmap::ConnexionButtonTable;
use spacemouse_core::{RawSample, StateTranslator};

use super::{Backend, BackendError, BackendKind, PushBackend, SharedSink};

/// Scriptable in-memory backend.
pub struct MockBackend {
    translator: StateTranslator<ConnexionButtonTable>,
    sink: Option<SharedSink>,
    /// When `true`, the next `initialize()` fails with `Unavailable`.
    pub fail_next_initialize: bool,
    initialize_calls: usize,
    close_calls: usize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            translator: StateTranslator::new(ConnexionButtonTable),
            sink: None,
            fail_next_initialize: false,
            initialize_calls: 0,
            close_calls: 0,
        }
    }

    /// A backend whose first `initialize()` fails.
    pub fn unavailable() -> Self {
        Self {
            fail_next_initialize: true,
            ..Self::new()
        }
    }

    /// Number of `initialize()` calls that reached the backend.
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls
    }

    /// Number of `close()` calls that released the backend.
    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    fn initialize(&mut self, sink: SharedSink) -> Result<(), BackendError> {
        if self.sink.is_some() {
            return Ok(());
        }
        self.initialize_calls += 1;
        if std::mem::take(&mut self.fail_next_initialize) {
            return Err(BackendError::Unavailable("mock device unplugged".to_string()));
        }
        self.translator.reset();
        self.sink = Some(sink);
        Ok(())
    }

    fn close(&mut self) {
        if self.sink.take().is_some() {
            self.close_calls += 1;
        }
    }

    fn is_initialized(&self) -> bool {
        self.sink.is_some()
    }
}

impl PushBackend for MockBackend {
    type Message = RawSample;

    fn process_message(&mut self, message: &RawSample) -> bool {
        match self.sink.as_ref() {
            Some(sink) => {
                self.translator.process(*message, &**sink);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use spacemouse_core::RecordingSink;

    #[test]
    fn test_unavailable_fails_once_then_recovers() {
        let mut backend = MockBackend::unavailable();

        let first = backend.initialize(Arc::new(RecordingSink::new()));
        let second = backend.initialize(Arc::new(RecordingSink::new()));

        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(backend.initialize_calls(), 2);
    }

    #[test]
    fn test_messages_need_an_initialized_backend() {
        let mut backend = MockBackend::new();
        let sink = Arc::new(RecordingSink::new());

        assert!(!backend.process_message(&RawSample::Buttons(1)));
        backend.initialize(sink.clone()).expect("initialize");
        assert!(backend.process_message(&RawSample::Buttons(1)));

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_close_counts_only_real_releases() {
        let mut backend = MockBackend::new();

        backend.close();
        backend.initialize(Arc::new(RecordingSink::new())).expect("initialize");
        backend.close();
        backend.close();

        assert_eq!(backend.close_calls(), 1);
    }
}
