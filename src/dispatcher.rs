//! Turns control requests into window-manager commands.
//!
//! [`Dispatcher`] reads the [`FocusHistory`] but never writes it: after a
//! swap, the window manager's own focus events update the history.

use crate::command::{Action, ControlRequest, RequestError};
use crate::history::{FocusHistory, FocusState};
use crate::traits::WindowManager;
use log::{debug, info};

/// Possible errors from the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The payload could not be decoded.
    #[error("bad request: {0}")]
    Request(#[from] RequestError),
    /// The window manager rejected or failed the command.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

/// Dispatches control payloads against the current focus history.
pub struct Dispatcher<W: WindowManager> {
    wm: W,
    history: FocusHistory,
}

impl<W: WindowManager> Dispatcher<W> {
    pub fn new(wm: W, history: FocusHistory) -> Self {
        Self { wm, history }
    }

    /// Decode `payload`, pick an action and carry it out.
    ///
    /// The history is read once; routing and the swap target both come
    /// from that one copy.  Returns the action taken so callers can log or
    /// test it.
    pub fn handle(&self, payload: &[u8]) -> Result<Action, DispatchError> {
        let state = self.history.snapshot();
        self.dispatch(payload, &state)
    }

    /// Like [`handle`](Self::handle), against an already taken `state`.
    pub fn dispatch(&self, payload: &[u8], state: &FocusState) -> Result<Action, DispatchError> {
        let request = ControlRequest::parse(payload)?;
        let action = request.resolve(&state.current_workspace);
        debug!("request {:?} on {:?} -> {}", request, state.current_workspace, action);
        self.execute(&action, state)?;
        Ok(action)
    }

    /// Carry out `action`.  Swapping with no recorded previous window does
    /// nothing.
    pub fn execute(&self, action: &Action, state: &FocusState) -> Result<(), DispatchError> {
        match action {
            Action::SwapToPrevious => self.swap_to_previous(state),
            Action::GoToWorkspace(target) => {
                info!("switching to workspace {:?}", target);
                self.wm
                    .switch_workspace(target)
                    .map_err(|e| DispatchError::WindowManager(e.to_string()))
            }
        }
    }

    fn swap_to_previous(&self, state: &FocusState) -> Result<(), DispatchError> {
        match &state.previous_window {
            Some(window) => {
                info!(
                    "focusing previous window {} on {:?}",
                    window,
                    state.previous_workspace.as_deref().unwrap_or("?")
                );
                self.wm
                    .focus_container(window.id)
                    .map_err(|e| DispatchError::WindowManager(e.to_string()))
            }
            None => {
                debug!("no previous window recorded, nothing to do");
                Ok(())
            }
        }
    }
}
