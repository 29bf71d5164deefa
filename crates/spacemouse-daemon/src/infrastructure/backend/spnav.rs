//! spacenavd backend (pull-style).
//!
//! spacenavd queues device events on a connection; the client has to poll
//! for them.  `initialize()` opens the connection and hands it to a
//! dedicated polling thread, which repeatedly:
//!
//! 1. waits up to `poll_interval` for the cancellation signal,
//! 2. if not cancelled, polls for one event, and
//! 3. if one was available, translates it and emits into the sink.
//!
//! `close()` sends the cancellation signal and joins the thread.  The thread
//! hands the connection back when it exits, and only then is the connection
//! closed, so a poll can never run against a closed connection.  `close()`
//! therefore blocks for at most one interval plus one poll.
//!
//! A panic inside a poll stops the thread but still hands the connection
//! back, so the backend can be closed and initialized again.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use spacemouse_core::buttonmap::SpnavButtonTable;
use spacemouse_core::{RawSample, StateTranslator};
use tracing::{debug, error, info};

use super::{Backend, BackendError, BackendKind, PendingClose, SharedSink};

/// Default wait between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Shortest wait between polls.  Shorter intervals are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// One event as reported by spacenavd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpnavEvent {
    Motion {
        translation: [i32; 3],
        rotation: [i32; 3],
        /// Milliseconds since the previous motion event.
        period: u32,
    },
    Button {
        bnum: u32,
        press: bool,
    },
}

impl From<SpnavEvent> for RawSample {
    fn from(event: SpnavEvent) -> Self {
        match event {
            SpnavEvent::Motion {
                translation,
                rotation,
                ..
            } => RawSample::Motion {
                translation,
                rotation,
            },
            SpnavEvent::Button { bnum, press } => RawSample::ButtonTransition {
                code: bnum,
                pressed: press,
            },
        }
    }
}

/// Connection to spacenavd.
///
/// [`super::spnav_socket::SpnavSocket`] speaks the daemon's socket protocol;
/// tests use scripted in-memory connections.
pub trait SpnavConnection: Send + 'static {
    fn open(&mut self) -> Result<(), BackendError>;
    fn close(&mut self);
    /// Returns the next queued event without blocking.
    fn poll_event(&mut self) -> Option<SpnavEvent>;
}

struct PollWorker<C> {
    cancel: Sender<()>,
    handle: JoinHandle<Option<C>>,
}

/// Pull-style backend polling a [`SpnavConnection`] on its own thread.
pub struct SpnavBackend<C: SpnavConnection> {
    /// Holds the connection while idle; empty while the worker owns it.
    connection: Arc<Mutex<Option<C>>>,
    worker: Option<PollWorker<C>>,
    poll_interval: Duration,
    stack_size: Option<usize>,
}

impl<C: SpnavConnection> SpnavBackend<C> {
    pub fn new(connection: C) -> Self {
        Self::with_poll_interval(connection, DEFAULT_POLL_INTERVAL)
    }

    /// `poll_interval` below [`MIN_POLL_INTERVAL`] is raised to it.
    pub fn with_poll_interval(connection: C, poll_interval: Duration) -> Self {
        Self {
            connection: Arc::new(Mutex::new(Some(connection))),
            worker: None,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            stack_size: None,
        }
    }

    /// Sets the stack size of the polling thread.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn idle_connection(&self) -> MutexGuard<'_, Option<C>> {
        lock_slot(&self.connection)
    }
}

impl<C: SpnavConnection> Backend for SpnavBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Spnav
    }

    fn initialize(&mut self, sink: SharedSink) -> Result<(), BackendError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let mut connection = self.idle_connection().take().ok_or_else(|| {
            BackendError::Unavailable("connection is still held by a closing poller".to_string())
        })?;
        if let Err(e) = connection.open() {
            *self.idle_connection() = Some(connection);
            return Err(e);
        }

        let (cancel, cancelled) = mpsc::channel();
        let (handoff, handed) = mpsc::channel::<C>();
        let interval = self.poll_interval;
        let mut builder = thread::Builder::new().name("spacemouse-spnav-poll".to_string());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }
        let spawned = builder.spawn(move || {
            let connection = handed.recv().ok()?;
            Some(run_poll_loop(connection, sink, cancelled, interval))
        });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "failed to spawn spacenav polling thread");
                connection.close();
                *self.idle_connection() = Some(connection);
                return Err(BackendError::Spawn(e));
            }
        };
        if let Err(mpsc::SendError(mut connection)) = handoff.send(connection) {
            connection.close();
            *self.idle_connection() = Some(connection);
            return Err(BackendError::Unavailable(
                "spacenav polling thread exited before it started".to_string(),
            ));
        }

        self.worker = Some(PollWorker { cancel, handle });
        info!(interval_ms = interval.as_millis() as u64, "spacenav polling started");
        Ok(())
    }

    fn close(&mut self) {
        if let Some(pending) = self.begin_close() {
            pending.finish();
        }
    }

    fn begin_close(&mut self) -> Option<PendingClose> {
        let worker = self.worker.take()?;

        // The worker may already have exited; a failed send is fine.
        let _ = worker.cancel.send(());
        let slot = Arc::clone(&self.connection);
        Some(PendingClose::new(move || finish_close(worker.handle, &slot)))
    }

    fn is_initialized(&self) -> bool {
        self.worker.is_some()
    }
}

impl<C: SpnavConnection> Drop for SpnavBackend<C> {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock_slot<C>(slot: &Mutex<Option<C>>) -> MutexGuard<'_, Option<C>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Joins the polling thread, then closes the connection it hands back.
fn finish_close<C: SpnavConnection>(handle: JoinHandle<Option<C>>, slot: &Mutex<Option<C>>) {
    match handle.join() {
        Ok(Some(mut connection)) => {
            connection.close();
            *lock_slot(slot) = Some(connection);
            info!("spacenav polling stopped");
        }
        Ok(None) => debug!("spacenav polling thread never received its connection"),
        Err(_) => error!("spacenav polling thread panicked; connection dropped"),
    }
}

/// Body of the polling thread.  Returns the connection on cancellation or
/// after a panicking poll.
fn run_poll_loop<C: SpnavConnection>(
    mut connection: C,
    sink: SharedSink,
    cancelled: Receiver<()>,
    interval: Duration,
) -> C {
    let mut translator = StateTranslator::new(SpnavButtonTable);
    debug!("spacenav polling thread running");

    // A dropped sender counts as cancellation too.
    while let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(interval) {
        let polled = panic::catch_unwind(AssertUnwindSafe(|| {
            if let Some(event) = connection.poll_event() {
                translator.process(event.into(), &*sink);
            }
        }));
        if polled.is_err() {
            error!("spacenav poll panicked; polling stopped until the backend is reinitialized");
            break;
        }
    }

    debug!("spacenav polling thread exiting");
    connection
}
