//! [`WindowManager`] implementation backed by i3 IPC.
//!
//! Every call opens a short-lived connection to the i3 socket, sends one
//! request and reads one reply.  The event subscription lives on its own
//! connection (see [`events`](super::events)).

use super::ipc::{I3Connection, I3Error, GET_TREE, RUN_COMMAND};
use super::tree::Node;
use crate::command::{ContainerId, FocusSnapshot};
use crate::config::JumpMode;
use crate::traits::WindowManager;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// i3-backed window manager.
pub struct I3Wm {
    socket: PathBuf,
    jump_mode: JumpMode,
}

/// One entry of the `RUN_COMMAND` reply array.
#[derive(Deserialize)]
struct CommandReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl I3Wm {
    /// Create a handle for the i3 instance listening on `socket`.
    ///
    /// No connection is opened eagerly.
    pub fn new(socket: impl AsRef<Path>, jump_mode: JumpMode) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
            jump_mode,
        }
    }

    /// Run an i3 command and check every reply entry for success.
    pub fn run_command(&self, command: &str) -> Result<(), I3Error> {
        debug!("i3 command: {}", command);
        let mut conn = I3Connection::connect(&self.socket)?;
        let reply = conn.request(RUN_COMMAND, command.as_bytes())?;
        let replies: Vec<CommandReply> = serde_json::from_slice(&reply)?;
        match replies.into_iter().find(|r| !r.success) {
            Some(failed) => Err(I3Error::Command(format!(
                "{}: {}",
                command,
                failed.error.unwrap_or_else(|| "unknown error".into())
            ))),
            None => Ok(()),
        }
    }

    /// Fetch the whole layout tree.
    pub fn tree(&self) -> Result<Node, I3Error> {
        let mut conn = I3Connection::connect(&self.socket)?;
        let reply = conn.request(GET_TREE, b"")?;
        Ok(serde_json::from_slice(&reply)?)
    }
}

impl WindowManager for I3Wm {
    type Error = I3Error;

    fn focused(&self) -> Result<FocusSnapshot, Self::Error> {
        self.tree()?
            .focus_snapshot()
            .ok_or_else(|| I3Error::Protocol("tree has no focused container in a workspace".into()))
    }

    fn focus_container(&self, id: ContainerId) -> Result<(), Self::Error> {
        self.run_command(&format!("[con_id={}] focus", id))
    }

    fn switch_workspace(&self, target: &str) -> Result<(), Self::Error> {
        self.run_command(&self.jump_mode.command(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i3::ipc::{read_message, write_message};
    use std::os::unix::net::UnixListener;
    use std::thread::JoinHandle;

    /// Fake i3: accept one connection, answer one request with `reply`, and
    /// hand back what was asked.
    fn serve_once(listener: UnixListener, reply: &'static str) -> JoinHandle<(u32, String)> {
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let (ty, payload) = read_message(&mut stream).unwrap();
            write_message(&mut stream, ty, reply.as_bytes()).unwrap();
            (ty, String::from_utf8(payload).unwrap())
        })
    }

    fn fake_i3() -> (tempfile::TempDir, PathBuf, UnixListener) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipc.sock");
        let listener = UnixListener::bind(&path).unwrap();
        (dir, path, listener)
    }

    #[test]
    fn focus_container_sends_con_id_command() {
        let (_dir, path, listener) = fake_i3();
        let server = serve_once(listener, r#"[{"success":true}]"#);

        let wm = I3Wm::new(&path, JumpMode::Number);
        wm.focus_container(94_221_001).unwrap();

        let (ty, payload) = server.join().unwrap();
        assert_eq!(ty, RUN_COMMAND);
        assert_eq!(payload, "[con_id=94221001] focus");
    }

    #[test]
    fn switch_workspace_uses_jump_mode() {
        let (_dir, path, listener) = fake_i3();
        let server = serve_once(listener, r#"[{"success":true}]"#);

        let wm = I3Wm::new(&path, JumpMode::Name);
        wm.switch_workspace("3: mail").unwrap();

        let (_, payload) = server.join().unwrap();
        assert_eq!(payload, r#"workspace "3: mail""#);
    }

    #[test]
    fn failed_command_is_an_error() {
        let (_dir, path, listener) = fake_i3();
        let server = serve_once(
            listener,
            r#"[{"success":false,"parse_error":true,"error":"Expected one of these tokens"}]"#,
        );

        let wm = I3Wm::new(&path, JumpMode::Number);
        let err = wm.focus_container(1).unwrap_err();
        assert!(matches!(err, I3Error::Command(ref msg) if msg.contains("Expected one of")));
        server.join().unwrap();
    }

    #[test]
    fn focused_reads_tree() {
        let (_dir, path, listener) = fake_i3();
        let server = serve_once(
            listener,
            r#"{"id":1,"type":"root","nodes":[{"id":2,"type":"output","nodes":[
                {"id":3,"type":"workspace","name":"1: web","nodes":[
                    {"id":4,"type":"con","focused":true,"window_properties":{"class":"firefox"}}
                ]}
            ]}]}"#,
        );

        let wm = I3Wm::new(&path, JumpMode::Number);
        let snap = wm.focused().unwrap();
        assert_eq!(snap.workspace, "1: web");
        assert_eq!(snap.window.map(|w| w.id), Some(4));

        let (ty, _) = server.join().unwrap();
        assert_eq!(ty, GET_TREE);
    }
}
