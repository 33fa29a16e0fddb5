//! i3 IPC framing.
//!
//! Every message on the i3 socket, in both directions, is
//!
//! ```text
//! "i3-ipc" <payload length: u32> <message type: u32> <payload>
//! ```
//!
//! with both integers in native byte order and the payload JSON.  Events
//! pushed on a subscribed connection use the same framing with the high bit
//! of the type set.
//!
//! The socket is found through `$I3SOCK`, then `$SWAYSOCK` (sway speaks the
//! same protocol), then `i3 --get-socketpath`.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Magic string opening every message.
pub const MAGIC: &[u8; 6] = b"i3-ipc";

const HEADER_LEN: usize = MAGIC.len() + 8;

/// Run the payload as an i3 command.
pub const RUN_COMMAND: u32 = 0;
/// Subscribe this connection to a JSON list of event names.
pub const SUBSCRIBE: u32 = 2;
/// Return the layout tree.
pub const GET_TREE: u32 = 4;

/// Set on the type of every event message.
pub const EVENT_MASK: u32 = 1 << 31;
pub const EVENT_WORKSPACE: u32 = EVENT_MASK;
pub const EVENT_WINDOW: u32 = EVENT_MASK | 3;

/// Errors that can occur when talking to i3.
#[derive(Debug, thiserror::Error)]
pub enum I3Error {
    #[error("i3 socket not found: {0}")]
    Socket(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("command failed: {0}")]
    Command(String),
}

/// Resolve the i3 IPC socket path.
pub fn socket_path() -> Result<PathBuf, I3Error> {
    for var in ["I3SOCK", "SWAYSOCK"] {
        if let Some(path) = std::env::var_os(var).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
    }

    let output = std::process::Command::new("i3")
        .arg("--get-socketpath")
        .output()
        .map_err(|e| {
            I3Error::Socket(format!("I3SOCK unset and `i3 --get-socketpath` failed: {}", e))
        })?;
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || path.is_empty() {
        return Err(I3Error::Socket(
            "I3SOCK unset and `i3 --get-socketpath` printed nothing".into(),
        ));
    }
    Ok(PathBuf::from(path))
}

/// Write one framed message.
pub fn write_message<W: Write>(w: &mut W, message_type: u32, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "payload too large"))?;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&message_type.to_ne_bytes());
    buf.extend_from_slice(payload);
    w.write_all(&buf)
}

/// Read one framed message, returning its type and payload.
pub fn read_message<R: Read>(r: &mut R) -> Result<(u32, Vec<u8>), I3Error> {
    let mut header = [0u8; HEADER_LEN];
    r.read_exact(&mut header)?;
    if &header[..MAGIC.len()] != MAGIC {
        return Err(I3Error::Protocol(format!(
            "bad magic {:?}",
            String::from_utf8_lossy(&header[..MAGIC.len()])
        )));
    }
    let mut word = [0u8; 4];
    word.copy_from_slice(&header[6..10]);
    let len = u32::from_ne_bytes(word) as usize;
    word.copy_from_slice(&header[10..14]);
    let message_type = u32::from_ne_bytes(word);

    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    Ok((message_type, payload))
}

/// One connection to the i3 IPC socket.
///
/// A connection that has subscribed to events only receives events from
/// then on, so commands and queries use their own connections.
pub struct I3Connection {
    stream: UnixStream,
}

impl I3Connection {
    pub fn connect(path: &Path) -> Result<Self, I3Error> {
        let stream = UnixStream::connect(path)
            .map_err(|e| I3Error::Socket(format!("connect to {}: {}", path.display(), e)))?;
        Ok(Self { stream })
    }

    /// Send a message and wait for the reply of the same type.
    pub fn request(&mut self, message_type: u32, payload: &[u8]) -> Result<Vec<u8>, I3Error> {
        write_message(&mut self.stream, message_type, payload)?;
        let (reply_type, reply) = self.receive()?;
        if reply_type != message_type {
            return Err(I3Error::Protocol(format!(
                "expected reply type {}, got {:#x}",
                message_type, reply_type
            )));
        }
        Ok(reply)
    }

    /// Block until the next message arrives.
    pub fn receive(&mut self) -> Result<(u32, Vec<u8>), I3Error> {
        read_message(&mut self.stream)
    }
}
