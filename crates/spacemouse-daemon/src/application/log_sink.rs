//! Application-supplied sink for lifecycle messages.
//!
//! The daemon reports backend initialization, shutdown and swallowed
//! callback panics as plain strings.  Everything also goes to `tracing`;
//! the log sink exists for embedders that route diagnostics somewhere else
//! (an in-app console, a host application's logger).

use std::fmt;
use std::sync::Arc;

/// A shareable `Fn(&str)` receiving lifecycle messages.
#[derive(Clone)]
pub struct LogSink(Arc<dyn Fn(&str) + Send + Sync>);

impl LogSink {
    pub fn new(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A sink that discards everything.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn log(&self, message: &str) {
        (self.0)(message)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogSink(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_log_forwards_message() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let sink = LogSink::new(move |m| captured.lock().unwrap().push(m.to_string()));

        sink.log("initializing spnav backend");
        sink.clone().log("closing spnav backend");

        assert_eq!(
            *lines.lock().unwrap(),
            vec!["initializing spnav backend", "closing spnav backend"]
        );
    }

    #[test]
    fn test_noop_accepts_messages() {
        LogSink::default().log("dropped");
    }
}
