//! The daemon orchestrator.
//!
//! Start-up order matters: the event subscription is opened *before* the
//! tree is queried so no focus change between the two is lost; events that
//! arrive meanwhile wait in the socket.
//!
//! Once running there are two long-lived threads:
//!
//! * the event source, forwarding [`WmEvent`]s over a channel to the main
//!   thread, which applies them to the [`FocusHistory`];
//! * the control listener, handing payloads to the [`Dispatcher`].
//!
//! The daemon runs until the window manager goes away.

use crate::command::WmEvent;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::history::{FocusHistory, FocusState};
use crate::i3::events::I3EventSource;
use crate::i3::ipc::{socket_path as i3_socket_path, I3Error};
use crate::i3::wm::I3Wm;
use crate::ipc::listener::{ControlListener, ListenerError};
use crate::traits::{EventSource, WindowManager};
use log::{error, info, warn};
use std::path::Path;
use std::sync::mpsc;

/// Fatal daemon errors.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("window manager: {0}")]
    WindowManager(#[from] I3Error),
    #[error("control socket: {0}")]
    Listener(#[from] ListenerError),
    #[error("event source failed: {0}")]
    EventSource(String),
    #[error("event source stopped")]
    EventSourceStopped,
}

/// Connect to i3, bind `socket_path` and run forever.
pub fn run(config: &Config, socket_path: &Path) -> Result<(), DaemonError> {
    let wm_socket = match &config.wm_socket {
        Some(path) => path.clone(),
        None => i3_socket_path()?,
    };
    info!("using i3 socket {}", wm_socket.display());

    let source = I3EventSource::subscribe(&wm_socket)?;
    let wm = I3Wm::new(&wm_socket, config.jump_mode);
    let history = FocusHistory::new(FocusState::from_snapshot(wm.focused()?));
    let listener = ControlListener::bind(socket_path)?;

    serve(wm, source, listener, history)
}

/// Run the event source and the control listener against `history`.
///
/// Returns only when the event source ends; that is always an error since
/// the window manager connection cannot be re-established.
pub fn serve<W, S>(
    wm: W,
    mut source: S,
    listener: ControlListener,
    history: FocusHistory,
) -> Result<(), DaemonError>
where
    W: WindowManager + Send + 'static,
    S: EventSource + 'static,
{
    log_init(&history.snapshot());

    let dispatcher = Dispatcher::new(wm, history.clone());
    std::thread::spawn(move || {
        let result = listener.run(|payload| match dispatcher.handle(payload) {
            Ok(action) => info!("handled {}", action),
            Err(e) => warn!("control request failed: {}", e),
        });
        if let Err(e) = result {
            error!("control listener stopped: {}", e);
            std::process::exit(1);
        }
    });

    let (tx, rx) = mpsc::channel::<WmEvent>();
    let source_thread = std::thread::spawn(move || source.run(tx));

    for event in rx {
        let workspace_change = matches!(event, WmEvent::WorkspaceFocus { .. });
        history.apply(event);
        if workspace_change {
            log_transition(&history.snapshot());
        }
    }

    match source_thread.join() {
        Ok(Ok(())) => Err(DaemonError::EventSourceStopped),
        Ok(Err(e)) => Err(DaemonError::EventSource(e.to_string())),
        Err(_) => Err(DaemonError::EventSource("event thread panicked".into())),
    }
}

fn log_init(state: &FocusState) {
    match &state.current_window {
        Some(w) => info!("init: workspace {:?}, con {}", state.current_workspace, w),
        None => info!("init: workspace {:?}, no window", state.current_workspace),
    }
}

fn log_transition(state: &FocusState) {
    let prev_ws = state.previous_workspace.as_deref().unwrap_or("-");
    match &state.previous_window {
        Some(w) => info!(
            "new workspace {:?} (previous {:?}, con {})",
            state.current_workspace, prev_ws, w
        ),
        None => info!(
            "new workspace {:?} (previous {:?}, no window)",
            state.current_workspace, prev_ws
        ),
    }
}
