//! Commands and types used throughout focus-last.
//!
//! This module defines the vocabulary that all components share:
//! [`WmEvent`] describes the window-manager notifications the daemon reacts
//! to, [`ControlRequest`] is a decoded control-socket payload, and
//! [`Action`] is what the dispatcher decides to do about it.
//!
//! Clients send raw bytes; the daemon decodes them here (`"switch"` or a
//! workspace name/number).

use std::fmt;

/// Maximum number of bytes read from a single control connection.
pub const MAX_REQUEST_LEN: usize = 1024;

/// Literal token asking for the previous window.
pub const SWITCH_TOKEN: &str = "switch";

/// Identifier of a window-manager container (i3 `con_id`).
pub type ContainerId = u64;

/// Reference to a window-manager container.
///
/// The daemon only remembers which container it was; the window itself
/// belongs to the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRef {
    pub id: ContainerId,
    /// X11 window class, or the Wayland `app_id` under sway.
    pub class: Option<String>,
    pub name: Option<String>,
}

impl WindowRef {
    /// A reference carrying only the container id.
    pub fn new(id: ContainerId) -> Self {
        Self {
            id,
            class: None,
            name: None,
        }
    }
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{} ({})", self.id, class),
            None => write!(f, "{}", self.id),
        }
    }
}

/// What the window manager reported as focused at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSnapshot {
    pub workspace: String,
    /// `None` when the focused workspace has no windows.
    pub window: Option<WindowRef>,
}

/// The closed set of window-manager notifications the daemon handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    /// Focus moved to `container`, possibly within the same workspace.
    WindowFocus(WindowRef),
    /// Focus moved to the workspace `name`, whose focused window is
    /// `focused` (if any).
    WorkspaceFocus {
        name: String,
        focused: Option<WindowRef>,
    },
}

/// A decoded control-socket payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// The literal `switch` token.
    Switch,
    /// Anything else: a workspace name or number.
    Workspace(String),
}

/// Reasons a control payload is ignored.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("empty request")]
    Empty,
    #[error("request is not valid utf-8")]
    NotUtf8,
}

impl ControlRequest {
    /// Decode a raw payload.
    ///
    /// One trailing line terminator is stripped so that line-oriented tools
    /// (`echo switch | socat ...`) behave like the bundled client.
    pub fn parse(payload: &[u8]) -> Result<Self, RequestError> {
        let payload = payload
            .strip_suffix(b"\n")
            .map(|p| p.strip_suffix(b"\r").unwrap_or(p))
            .unwrap_or(payload);
        if payload.is_empty() {
            return Err(RequestError::Empty);
        }
        let text = std::str::from_utf8(payload).map_err(|_| RequestError::NotUtf8)?;
        if text == SWITCH_TOKEN {
            Ok(Self::Switch)
        } else {
            Ok(Self::Workspace(text.to_string()))
        }
    }

    /// Decide what to do given the name of the workspace that currently has
    /// focus.
    ///
    /// Asking for the workspace you are already on (any prefix of its name)
    /// means "take me back".
    pub fn resolve(&self, current_workspace: &str) -> Action {
        match self {
            Self::Switch => Action::SwapToPrevious,
            Self::Workspace(target) if current_workspace.starts_with(target.as_str()) => {
                Action::SwapToPrevious
            }
            Self::Workspace(target) => Action::GoToWorkspace(target.clone()),
        }
    }
}

/// The single action a control request turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Re-focus the previous window, if one is recorded.
    SwapToPrevious,
    /// Jump to the named workspace.
    GoToWorkspace(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SwapToPrevious => write!(f, "swap-to-previous"),
            Action::GoToWorkspace(ws) => write!(f, "go-to-workspace {:?}", ws),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_switch_token() {
        assert_eq!(ControlRequest::parse(b"switch"), Ok(ControlRequest::Switch));
        assert_eq!(ControlRequest::parse(b"switch\n"), Ok(ControlRequest::Switch));
        assert_eq!(ControlRequest::parse(b"switch\r\n"), Ok(ControlRequest::Switch));
    }

    #[test]
    fn parse_workspace_is_verbatim() {
        assert_eq!(
            ControlRequest::parse(b" 3: mail "),
            Ok(ControlRequest::Workspace(" 3: mail ".into()))
        );
        // Only an exact match is the token.
        assert_eq!(
            ControlRequest::parse(b"switches"),
            Ok(ControlRequest::Workspace("switches".into()))
        );
    }

    #[test]
    fn parse_rejects_empty_and_invalid() {
        assert_eq!(ControlRequest::parse(b""), Err(RequestError::Empty));
        assert_eq!(ControlRequest::parse(b"\n"), Err(RequestError::Empty));
        assert_eq!(
            ControlRequest::parse(&[0xff, 0xfe]),
            Err(RequestError::NotUtf8)
        );
    }

    #[test]
    fn switch_always_swaps() {
        assert_eq!(ControlRequest::Switch.resolve("1: web"), Action::SwapToPrevious);
        assert_eq!(ControlRequest::Switch.resolve(""), Action::SwapToPrevious);
    }

    #[test]
    fn prefix_of_current_workspace_swaps() {
        let current = "2: term";
        for target in ["2", "2:", "2: term"] {
            assert_eq!(
                ControlRequest::Workspace(target.into()).resolve(current),
                Action::SwapToPrevious,
                "target {:?}",
                target
            );
        }
    }

    #[test]
    fn non_prefix_jumps_with_literal_target() {
        let current = "2: term";
        for target in ["1", "term", "2: terminal", "22"] {
            assert_eq!(
                ControlRequest::Workspace(target.into()).resolve(current),
                Action::GoToWorkspace(target.into()),
                "target {:?}",
                target
            );
        }
    }

    #[test]
    fn window_ref_display_includes_class() {
        let mut w = WindowRef::new(94);
        assert_eq!(w.to_string(), "94");
        w.class = Some("firefox".into());
        assert_eq!(w.to_string(), "94 (firefox)");
    }
}
