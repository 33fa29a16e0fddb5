//! Core traits that decouple focus-last from any specific window manager.
//!
//! Every concrete backend (i3 over its IPC socket, a test recorder, …)
//! implements one of these traits.  The [`Dispatcher`](crate::dispatcher::Dispatcher)
//! and the [daemon](crate::daemon) only depend on these abstractions.

use crate::command::{ContainerId, FocusSnapshot, WmEvent};
use std::sync::mpsc;

/// Abstraction over a window manager that can report focus and move it.
///
/// An implementation might talk to i3 via IPC, or it might be a recording
/// stub used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Query the focused container and the workspace that owns it.
    fn focused(&self) -> Result<FocusSnapshot, Self::Error>;

    /// Give focus to the container with the given id.
    fn focus_container(&self, id: ContainerId) -> Result<(), Self::Error>;

    /// Switch to the workspace named (or numbered) `target`.
    fn switch_workspace(&self, target: &str) -> Result<(), Self::Error>;
}

/// A source of [`WmEvent`]s.
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each focus event must be sent through `sink` exactly once, in the order
///   the window manager emitted them.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start receiving and forward every focus event into `sink`.
    fn run(&mut self, sink: mpsc::Sender<WmEvent>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::WindowRef;

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    /// A test double that emits a fixed sequence of events.
    struct MockSource {
        events: Vec<WmEvent>,
    }

    impl EventSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<WmEvent>) -> Result<(), MockError> {
            for ev in self.events.drain(..) {
                let _ = sink.send(ev);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_preserves_order() {
        let mut src = MockSource {
            events: vec![
                WmEvent::WindowFocus(WindowRef::new(1)),
                WmEvent::WorkspaceFocus {
                    name: "2".into(),
                    focused: None,
                },
            ],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let events: Vec<WmEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], WmEvent::WindowFocus(WindowRef::new(1)));
    }
}
