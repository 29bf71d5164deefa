//! 3DxWare driver backend (Windows, push-style).
//!
//! The driver posts device events as window messages to a window the
//! application names at open time, so a [`WindowHandle`] must be set before
//! `initialize()`.  The application's window procedure forwards every
//! message to the daemon; the driver decides whether it is a device event.
//!
//! A button event may carry both a pressed and a released code; the press is
//! processed first.

use spacemouse_core::buttonmap::SiappButtonTable;
use spacemouse_core::{RawSample, StateTranslator};
use tracing::info;

use super::{Backend, BackendError, BackendKind, PushBackend, SharedSink};

/// Opaque native window handle (`HWND` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

#[cfg(windows)]
impl From<windows::Win32::Foundation::HWND> for WindowHandle {
    fn from(hwnd: windows::Win32::Foundation::HWND) -> Self {
        WindowHandle(hwnd.0 as isize)
    }
}

/// A decoded driver event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiEvent {
    Motion {
        translation: [i32; 3],
        rotation: [i32; 3],
    },
    Button {
        pressed: Option<u32>,
        released: Option<u32>,
    },
    /// A device event with no canonical counterpart (zero, device change, ...).
    Other,
}

/// The 3DxWare driver calls this backend depends on.
pub trait SiappDriver: Send {
    /// The window message type the driver inspects.
    type Message: ?Sized;

    fn open(&mut self, window: WindowHandle) -> Result<(), BackendError>;
    fn close(&mut self);

    /// Decodes `message`; `None` when it is not a device event.
    fn decode(&mut self, message: &Self::Message) -> Option<SiEvent>;
}

/// Push-style backend for the 3DxWare driver.
pub struct SiappBackend<D: SiappDriver> {
    driver: D,
    window: Option<WindowHandle>,
    open: bool,
    translator: StateTranslator<SiappButtonTable>,
    sink: Option<SharedSink>,
}

impl<D: SiappDriver> SiappBackend<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            window: None,
            open: false,
            translator: StateTranslator::new(SiappButtonTable),
            sink: None,
        }
    }

    /// Names the window the driver posts to.  Takes effect on the next
    /// `initialize()`.
    pub fn set_window_handle(&mut self, window: WindowHandle) {
        self.window = Some(window);
    }

    pub fn window_handle(&self) -> Option<WindowHandle> {
        self.window
    }
}

impl<D: SiappDriver> Backend for SiappBackend<D> {
    fn kind(&self) -> BackendKind {
        BackendKind::Siapp
    }

    fn initialize(&mut self, sink: SharedSink) -> Result<(), BackendError> {
        if self.open {
            return Ok(());
        }
        let window = self.window.ok_or(BackendError::MissingWindowHandle)?;
        self.driver.open(window)?;

        self.translator.reset();
        self.sink = Some(sink);
        self.open = true;
        info!(window = window.0, "3DxWare driver opened");
        Ok(())
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.driver.close();
        self.open = false;
        self.sink = None;
        info!("3DxWare driver closed");
    }

    fn is_initialized(&self) -> bool {
        self.open
    }
}

impl<D: SiappDriver> PushBackend for SiappBackend<D> {
    type Message = D::Message;

    fn process_message(&mut self, message: &D::Message) -> bool {
        let Some(sink) = self.sink.as_ref().filter(|_| self.open) else {
            return false;
        };
        let Some(event) = self.driver.decode(message) else {
            return false;
        };

        match event {
            SiEvent::Motion {
                translation,
                rotation,
            } => self.translator.process(
                RawSample::Motion {
                    translation,
                    rotation,
                },
                &**sink,
            ),
            SiEvent::Button { pressed, released } => {
                if let Some(code) = pressed {
                    self.translator
                        .process(RawSample::ButtonTransition { code, pressed: true }, &**sink);
                }
                if let Some(code) = released {
                    self.translator
                        .process(RawSample::ButtonTransition { code, pressed: false }, &**sink);
                }
            }
            SiEvent::Other => {}
        }
        true
    }
}

impl<D: SiappDriver> Drop for SiappBackend<D> {
    fn drop(&mut self) {
        self.close();
    }
}
