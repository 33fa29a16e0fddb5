//! One-shot control client.
//!
//! Used by `focus-last --switch` and `focus-last --window <name>` from a
//! keybinding: connect, write the payload once, close.

use crate::command::{MAX_REQUEST_LEN, SWITCH_TOKEN};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Errors produced by the control client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot reach daemon at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("payload is {0} bytes, limit is {max}", max = MAX_REQUEST_LEN)]
    TooLong(usize),
}

/// Send `payload` to the daemon listening on `path`.
pub fn send(path: &Path, payload: &[u8]) -> Result<(), ClientError> {
    if payload.len() > MAX_REQUEST_LEN {
        return Err(ClientError::TooLong(payload.len()));
    }
    let mut stream = UnixStream::connect(path).map_err(|source| ClientError::Connect {
        path: path.to_path_buf(),
        source,
    })?;
    stream.write_all(payload)?;
    Ok(())
}

/// Ask the daemon to go back to the previous window.
pub fn send_switch(path: &Path) -> Result<(), ClientError> {
    send(path, SWITCH_TOKEN.as_bytes())
}

/// Ask the daemon for workspace `name` (or the previous one if already
/// there).
pub fn send_window(path: &Path, name: &str) -> Result<(), ClientError> {
    send(path, name.as_bytes())
}
