//! Application layer: the daemon handle embedders talk to.
//!
//! - `daemon` – [`daemon::EventDaemon`], lifecycle and the shared handle.
//! - `callbacks` – the three event callback slots and panic containment.
//! - `log_sink` – the lifecycle message sink.

pub mod callbacks;
pub mod daemon;
pub mod log_sink;
