//! 3Dconnexion client-library backend (push-style).
//!
//! The macOS framework calls the application back with device-state
//! messages on the main run loop.  The embedding application forwards each
//! message to [`EventDaemon::process_message`], which lands in
//! [`ConnexionBackend::process_message`].
//!
//! Initialization installs the framework's message handlers, then registers
//! this process as a client.  A client id of `0` means the framework refused
//! the registration.  Messages are only accepted when they are device-state
//! messages addressed to the registered client id.
//!
//! [`EventDaemon::process_message`]: crate::application::daemon::EventDaemon::process_message

use spacemouse_core::buttonmap::ConnexionButtonTable;
use spacemouse_core::{RawSample, StateTranslator};
use tracing::{info, trace, warn};

use super::{Backend, BackendError, BackendKind, PushBackend, SharedSink};

/// Message type of a device-state message (`'3dSR'`).
pub const MSG_DEVICE_STATE: u32 = 0x3364_5352;

/// Device-state command: the button bitmask changed.
pub const CMD_HANDLE_BUTTONS: u16 = 2;
/// Device-state command: new axis values.
pub const CMD_HANDLE_AXIS: u16 = 3;

/// Default name the client registers under.
pub const DEFAULT_CLIENT_NAME: &str = "spacemouse";

/// How the framework routes device events between registered clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum ClientMode {
    /// Receive events whenever this client is running, even in the background.
    #[default]
    TakeOver = 1,
    /// Receive events only while this client is frontmost.
    Plugin = 2,
}

/// Device state carried by a device-state message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnexionDeviceState {
    /// Client id the message is addressed to.
    pub client: u16,
    pub command: u16,
    /// Translation x/y/z, then rotation x/y/z.
    pub axis: [i16; 6],
    /// Full bitmask of held buttons.
    pub buttons: u32,
}

/// A message delivered by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnexionMessage {
    pub message_type: u32,
    pub state: ConnexionDeviceState,
}

impl ConnexionMessage {
    /// Builds a device-state message.
    pub fn device_state(state: ConnexionDeviceState) -> Self {
        Self {
            message_type: MSG_DEVICE_STATE,
            state,
        }
    }
}

/// The 3Dconnexion framework calls this backend depends on.
#[cfg_attr(test, mockall::automock)]
pub trait ConnexionClient: Send {
    /// Installs the message handlers.  `Err` carries the framework's error code.
    fn install_handlers(&mut self) -> Result<(), i32>;
    /// Registers a client; returns its id, `0` on failure.
    fn register_client(&mut self, name: &str, mode: ClientMode) -> u16;
    fn unregister_client(&mut self, client_id: u16);
    fn cleanup_handlers(&mut self);
}

/// Push-style backend for the 3Dconnexion framework.
pub struct ConnexionBackend<C: ConnexionClient> {
    client: C,
    client_name: String,
    mode: ClientMode,
    client_id: Option<u16>,
    translator: StateTranslator<ConnexionButtonTable>,
    sink: Option<SharedSink>,
}

impl<C: ConnexionClient> ConnexionBackend<C> {
    pub fn new(client: C, client_name: impl Into<String>) -> Self {
        Self {
            client,
            client_name: client_name.into(),
            mode: ClientMode::default(),
            client_id: None,
            translator: StateTranslator::new(ConnexionButtonTable),
            sink: None,
        }
    }

    /// Sets the registration mode used by the next `initialize()`.
    pub fn with_mode(mut self, mode: ClientMode) -> Self {
        self.mode = mode;
        self
    }

    /// The id assigned at registration, while initialized.
    pub fn client_id(&self) -> Option<u16> {
        self.client_id
    }
}

impl<C: ConnexionClient> Backend for ConnexionBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Connexion
    }

    fn initialize(&mut self, sink: SharedSink) -> Result<(), BackendError> {
        if self.client_id.is_some() {
            return Ok(());
        }

        self.client.install_handlers().map_err(BackendError::Driver)?;

        let id = self.client.register_client(&self.client_name, self.mode);
        if id == 0 {
            warn!(name = %self.client_name, "3DX client registration refused");
            self.client.cleanup_handlers();
            return Err(BackendError::Unavailable(
                "3DX client registration returned no client id".to_string(),
            ));
        }

        self.translator.reset();
        self.client_id = Some(id);
        self.sink = Some(sink);
        info!(client_id = id, "3DX client registered");
        Ok(())
    }

    fn close(&mut self) {
        let Some(id) = self.client_id.take() else {
            return;
        };
        self.client.unregister_client(id);
        self.client.cleanup_handlers();
        self.sink = None;
        info!(client_id = id, "3DX client unregistered");
    }

    fn is_initialized(&self) -> bool {
        self.client_id.is_some()
    }
}

impl<C: ConnexionClient> PushBackend for ConnexionBackend<C> {
    type Message = ConnexionMessage;

    fn process_message(&mut self, message: &ConnexionMessage) -> bool {
        let (Some(id), Some(sink)) = (self.client_id, self.sink.as_ref()) else {
            return false;
        };
        if message.message_type != MSG_DEVICE_STATE || message.state.client != id {
            return false;
        }

        let state = &message.state;
        match state.command {
            CMD_HANDLE_AXIS => {
                let a = state.axis.map(i32::from);
                let sample = RawSample::Motion {
                    translation: [a[0], a[1], a[2]],
                    rotation: [a[3], a[4], a[5]],
                };
                self.translator.process(sample, &**sink);
            }
            CMD_HANDLE_BUTTONS => {
                self.translator.process(RawSample::Buttons(state.buttons), &**sink);
            }
            other => trace!(command = other, "ignoring 3DX device-state command"),
        }
        true
    }
}

impl<C: ConnexionClient> Drop for ConnexionBackend<C> {
    fn drop(&mut self) {
        self.close();
    }
}
