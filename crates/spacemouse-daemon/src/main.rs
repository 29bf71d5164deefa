//! spacemouse-daemon entry point.
//!
//! Runs the spacenavd backend headless and prints every canonical event as
//! one JSON line on stdout, e.g.
//!
//! ```text
//! {"type":"button_press","button":"Top","modifiers":1}
//! ```
//!
//! Push backends (3DX, 3DxWare) need the host application's message loop
//! and are only usable through the library.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()         -- ~/.config/spacemouse/config.toml, or defaults
//!  └─ initialize_daemon()   -- starts the spacenavd polling thread
//!  └─ ctrl_c().await        -- callbacks print from the polling thread
//!  └─ release() + close()
//! ```

use anyhow::bail;
use spacemouse_core::CanonicalEvent;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use spacemouse_daemon::infrastructure::backend::BackendKind;
use spacemouse_daemon::infrastructure::storage::config::{load_config, DaemonConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (DaemonConfig::default(), Some(e)),
    };

    // Level is overridden by `RUST_LOG`.  Logs go to stderr; stdout carries events.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.daemon.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        warn!("using default configuration: {e}");
    }
    info!(backend = %config.daemon.backend, "spacemouse-daemon starting");

    match config.daemon.backend {
        BackendKind::Spnav => run_spnav(&config).await,
        other => bail!("the {other} backend needs a host message loop and cannot run headless"),
    }
}

#[cfg(unix)]
async fn run_spnav(config: &DaemonConfig) -> anyhow::Result<()> {
    use spacemouse_daemon::infrastructure::backend::spnav::SpnavBackend;
    use spacemouse_daemon::infrastructure::backend::spnav_socket::SpnavSocket;
    use spacemouse_daemon::{initialize_daemon, LogSink};

    let socket = SpnavSocket::new(&config.spnav.socket_path);
    let backend = SpnavBackend::with_poll_interval(socket, config.daemon.poll_interval());
    let daemon = initialize_daemon(
        backend,
        LogSink::new(|m| info!(target: "spacemouse_daemon::lifecycle", "{m}")),
    );
    if !daemon.is_initialized() {
        bail!(
            "could not connect to spacenavd at {}",
            config.spnav.socket_path.display()
        );
    }

    daemon.set_move_callback(|e| print_event(&CanonicalEvent::Move(e)));
    daemon.set_button_press_callback(|e| print_event(&CanonicalEvent::ButtonPress(e)));
    daemon.set_button_release_callback(|e| print_event(&CanonicalEvent::ButtonRelease(e)));

    info!("spacemouse-daemon ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    daemon.release();
    daemon.close();
    info!("spacemouse-daemon stopped");
    Ok(())
}

#[cfg(not(unix))]
async fn run_spnav(_config: &DaemonConfig) -> anyhow::Result<()> {
    bail!("spacenavd is only available on unix platforms")
}

fn print_event(event: &CanonicalEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("failed to encode event: {e}"),
    }
}
