//! spacemouse-daemon library entry point.
//!
//! Embedders create an [`EventDaemon`] around one backend, install callbacks,
//! and (for push backends) forward platform messages to it.  The binary in
//! `main.rs` uses the same module tree.
//!
//! ```rust,no_run
//! # #[cfg(unix)] {
//! use spacemouse_daemon::infrastructure::backend::spnav::SpnavBackend;
//! use spacemouse_daemon::infrastructure::backend::spnav_socket::SpnavSocket;
//! use spacemouse_daemon::{initialize_daemon, LogSink};
//!
//! let daemon = initialize_daemon(SpnavBackend::new(SpnavSocket::default()), LogSink::noop());
//! daemon.set_move_callback(|m| println!("{:?}", m.translation()));
//! # }
//! ```

pub mod application;
pub mod infrastructure;

pub use application::callbacks::CallbackSlots;
pub use application::daemon::{initialize_daemon, DaemonError, DaemonHandle, EventDaemon};
pub use application::log_sink::LogSink;
pub use infrastructure::backend::{Backend, BackendError, BackendKind, PushBackend};
