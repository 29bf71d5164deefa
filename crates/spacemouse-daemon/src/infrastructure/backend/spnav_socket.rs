//! spacenavd client over its UNIX domain socket.
//!
//! spacenavd accepts plain clients on `/var/run/spnav.sock` and writes one
//! fixed-size record per event: eight native-endian `i32` words.
//!
//! | word | motion           | button             |
//! |------|------------------|--------------------|
//! | 0    | `0`              | `1` press, `2` release |
//! | 1-3  | translation x/y/z | `1`: button number |
//! | 4-6  | rotation x/y/z   | unused             |
//! | 7    | period (ms)      | unused             |
//!
//! The stream is switched to non-blocking mode so [`SpnavSocket::poll_event`]
//! returns immediately when no complete record is queued.  Partial records
//! are buffered across polls.

use std::io::{ErrorKind, Read};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::spnav::{SpnavConnection, SpnavEvent};
use super::BackendError;

/// Where spacenavd listens by default.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/spnav.sock";

const EVENT_WORDS: usize = 8;
const EVENT_BYTES: usize = EVENT_WORDS * 4;

const UEV_PRESS: i32 = 1;
const UEV_RELEASE: i32 = 2;

/// Socket connection to spacenavd.
pub struct SpnavSocket {
    path: PathBuf,
    stream: Option<UnixStream>,
    buf: [u8; EVENT_BYTES],
    filled: usize,
}

impl SpnavSocket {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stream: None,
            buf: [0; EVENT_BYTES],
            filled: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.filled = 0;
    }
}

impl Default for SpnavSocket {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }
}

impl SpnavConnection for SpnavSocket {
    fn open(&mut self) -> Result<(), BackendError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let unavailable = |e: std::io::Error| {
            BackendError::Unavailable(format!(
                "cannot connect to spacenavd at {}: {e}",
                self.path.display()
            ))
        };
        let stream = UnixStream::connect(&self.path).map_err(unavailable)?;
        stream.set_nonblocking(true).map_err(unavailable)?;

        debug!(path = %self.path.display(), "connected to spacenavd");
        self.stream = Some(stream);
        self.filled = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.disconnect();
    }

    fn poll_event(&mut self) -> Option<SpnavEvent> {
        loop {
            let read = match self.stream.as_mut() {
                Some(stream) => stream.read(&mut self.buf[self.filled..]),
                None => return None,
            };

            match read {
                Ok(0) => {
                    warn!("spacenavd closed the connection");
                    self.disconnect();
                    return None;
                }
                Ok(n) => {
                    self.filled += n;
                    if self.filled == EVENT_BYTES {
                        self.filled = 0;
                        return Some(decode_event(&self.buf));
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return None,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "spacenavd read failed");
                    self.disconnect();
                    return None;
                }
            }
        }
    }
}

/// Decodes one wire record.  Unknown type words are read as motion.
pub fn decode_event(record: &[u8; EVENT_BYTES]) -> SpnavEvent {
    let mut data = [0i32; EVENT_WORDS];
    for (word, chunk) in data.iter_mut().zip(record.chunks_exact(4)) {
        *word = i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    match data[0] {
        kind @ (UEV_PRESS | UEV_RELEASE) => SpnavEvent::Button {
            bnum: data[1] as u32,
            press: kind == UEV_PRESS,
        },
        _ => SpnavEvent::Motion {
            translation: [data[1], data[2], data[3]],
            rotation: [data[4], data[5], data[6]],
            period: data[7] as u32,
        },
    }
}

/// Encodes one wire record, as spacenavd would send it.
pub fn encode_event(event: &SpnavEvent) -> [u8; EVENT_BYTES] {
    let data: [i32; EVENT_WORDS] = match *event {
        SpnavEvent::Motion {
            translation: [x, y, z],
            rotation: [rx, ry, rz],
            period,
        } => [0, x, y, z, rx, ry, rz, period as i32],
        SpnavEvent::Button { bnum, press } => {
            let kind = if press { UEV_PRESS } else { UEV_RELEASE };
            [kind, bnum as i32, 0, 0, 0, 0, 0, 0]
        }
    };

    let mut record = [0u8; EVENT_BYTES];
    for (chunk, word) in record.chunks_exact_mut(4).zip(data) {
        chunk.copy_from_slice(&word.to_ne_bytes());
    }
    record
}
