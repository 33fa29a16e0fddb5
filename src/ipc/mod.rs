//! The control socket.
//!
//! Keybindings reach the daemon through a Unix stream socket: the
//! [`client`] writes one short payload and hangs up, the [`listener`]
//! multiplexes those connections and hands each payload to the
//! dispatcher.  Nothing is ever written back.

pub mod client;
pub mod listener;

use std::path::{Path, PathBuf};

/// Directory holding the socket for user `euid` on display `display`.
///
/// `display` is appended verbatim, so `:0` gives `i3_focus_last.1000:0`.
pub fn socket_dir_in(tmp: &Path, euid: u32, display: &str) -> PathBuf {
    tmp.join(format!("i3_focus_last.{}{}", euid, display))
}

/// The display this session runs on: `$DISPLAY`, then `$WAYLAND_DISPLAY`.
fn display_id() -> String {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

/// `<temp dir>/i3_focus_last.<euid><display>/socket`.
///
/// Daemon and client compute the same path independently.
pub fn default_socket_path() -> PathBuf {
    let euid = nix::unistd::geteuid().as_raw();
    socket_dir_in(&std::env::temp_dir(), euid, &display_id()).join("socket")
}
