//! Subscribes to i3 focus events and translates them into [`WmEvent`]s.
//!
//! The subscription uses a dedicated connection: once `SUBSCRIBE` succeeds
//! i3 only pushes events on it.  Events other than `window::focus` and
//! `workspace::focus` are dropped here.

use super::ipc::{I3Connection, I3Error, EVENT_WINDOW, EVENT_WORKSPACE, SUBSCRIBE};
use super::tree::Node;
use crate::command::WmEvent;
use crate::traits::EventSource;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::Path;
use std::sync::mpsc;

/// Payload of a `window` event.
#[derive(Deserialize)]
struct WindowEventJson {
    change: String,
    container: Node,
}

/// Payload of a `workspace` event.
#[derive(Deserialize)]
struct WorkspaceEventJson {
    change: String,
    #[serde(default)]
    current: Option<Node>,
}

#[derive(Deserialize)]
struct SubscribeReply {
    success: bool,
}

/// An [`EventSource`] reading from an i3 event subscription.
pub struct I3EventSource {
    conn: I3Connection,
}

impl I3EventSource {
    /// Connect to `socket` and subscribe to window and workspace events.
    ///
    /// Events emitted after this returns are buffered by the socket until
    /// [`run`](EventSource::run) reads them.
    pub fn subscribe(socket: &Path) -> Result<Self, I3Error> {
        let mut conn = I3Connection::connect(socket)?;
        let reply = conn.request(SUBSCRIBE, br#"["window","workspace"]"#)?;
        let reply: SubscribeReply = serde_json::from_slice(&reply)?;
        if !reply.success {
            return Err(I3Error::Protocol("subscription refused".into()));
        }
        info!("subscribed to i3 events on {}", socket.display());
        Ok(Self { conn })
    }
}

/// Decode one event message.  `Ok(None)` for events the daemon ignores.
pub fn decode_event(message_type: u32, payload: &[u8]) -> Result<Option<WmEvent>, I3Error> {
    match message_type {
        EVENT_WINDOW => {
            let ev: WindowEventJson = serde_json::from_slice(payload)?;
            if ev.change != "focus" {
                return Ok(None);
            }
            Ok(Some(WmEvent::WindowFocus(ev.container.window_ref())))
        }
        EVENT_WORKSPACE => {
            let ev: WorkspaceEventJson = serde_json::from_slice(payload)?;
            match ev.current {
                Some(current) if ev.change == "focus" => Ok(Some(WmEvent::WorkspaceFocus {
                    focused: current.focused_window().map(Node::window_ref),
                    name: current.name.unwrap_or_default(),
                })),
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

impl EventSource for I3EventSource {
    type Error = I3Error;

    /// Read events until the connection drops.
    ///
    /// This method **blocks** forever.  Run it on a dedicated thread.  Any
    /// read error, including end of stream, is returned: losing i3 is fatal.
    /// An event that fails to decode is logged and skipped.
    fn run(&mut self, sink: mpsc::Sender<WmEvent>) -> Result<(), Self::Error> {
        loop {
            let (message_type, payload) = self.conn.receive()?;
            let decoded = match decode_event(message_type, &payload) {
                Ok(decoded) => decoded,
                Err(I3Error::Json(e)) => {
                    warn!("skipping undecodable event {:#x}: {}", message_type, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            match decoded {
                Some(event) => {
                    if let WmEvent::WindowFocus(ref w) = event {
                        debug!("window focus: con {}", w);
                    }
                    if sink.send(event).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                None => debug!("ignoring event {:#x}", message_type),
            }
        }
    }
}
