//! The focus history store.
//!
//! [`FocusHistory`] is a cloneable handle to the one [`FocusState`] the
//! daemon keeps.  The event subscriber writes through
//! [`on_window_focus`](FocusHistory::on_window_focus) and
//! [`on_workspace_focus`](FocusHistory::on_workspace_focus); the dispatcher
//! reads a consistent copy with [`snapshot`](FocusHistory::snapshot).
//!
//! Every operation holds the mutex for its full duration, so the compound
//! workspace update is never observed half-applied.

use crate::command::{FocusSnapshot, WindowRef, WmEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Current and previous focus, one level deep.
///
/// `previous_*` only ever change on a workspace transition; window focus
/// changes inside a workspace leave them alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    pub current_workspace: String,
    pub current_window: Option<WindowRef>,
    /// `None` until the first workspace transition.
    pub previous_workspace: Option<String>,
    pub previous_window: Option<WindowRef>,
}

impl FocusState {
    /// Initial state built from a tree query: no history yet.
    pub fn from_snapshot(snapshot: FocusSnapshot) -> Self {
        Self {
            current_workspace: snapshot.workspace,
            current_window: snapshot.window,
            previous_workspace: None,
            previous_window: None,
        }
    }

    fn window_focus(&mut self, window: WindowRef) {
        self.current_window = Some(window);
    }

    fn workspace_focus(&mut self, name: String, focused: Option<WindowRef>) {
        self.previous_window = self.current_window.take();
        self.previous_workspace = Some(std::mem::replace(&mut self.current_workspace, name));
        self.current_window = focused;
    }
}

/// Shared handle to the daemon's [`FocusState`].
#[derive(Debug, Clone, Default)]
pub struct FocusHistory {
    inner: Arc<Mutex<FocusState>>,
}

impl FocusHistory {
    pub fn new(state: FocusState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Lock the state.  The state is plain data, so a panic elsewhere while
    /// holding the lock cannot leave it inconsistent; recover the guard.
    fn lock(&self) -> MutexGuard<'_, FocusState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the state at this instant.
    pub fn snapshot(&self) -> FocusState {
        self.lock().clone()
    }

    /// Record a focus change that may or may not cross workspaces.
    pub fn on_window_focus(&self, window: WindowRef) {
        self.lock().window_focus(window);
    }

    /// Record a workspace transition: the current pair becomes the previous
    /// pair, then the new workspace and its focused window become current.
    pub fn on_workspace_focus(&self, name: String, focused: Option<WindowRef>) {
        self.lock().workspace_focus(name, focused);
    }

    /// Route a subscriber event to the matching handler.
    pub fn apply(&self, event: WmEvent) {
        match event {
            WmEvent::WindowFocus(window) => self.on_window_focus(window),
            WmEvent::WorkspaceFocus { name, focused } => self.on_workspace_focus(name, focused),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(id: u64) -> Option<WindowRef> {
        Some(WindowRef::new(id))
    }

    fn history(workspace: &str, window: Option<WindowRef>) -> FocusHistory {
        FocusHistory::new(FocusState::from_snapshot(FocusSnapshot {
            workspace: workspace.into(),
            window,
        }))
    }

    #[test]
    fn starts_without_history() {
        let h = history("1: web", win(1));
        let s = h.snapshot();
        assert_eq!(s.previous_workspace, None);
        assert_eq!(s.previous_window, None);
        assert_eq!(s.current_workspace, "1: web");
        assert_eq!(s.current_window, win(1));
    }

    #[test]
    fn previous_lags_by_exactly_one_workspace_transition() {
        let h = history("1", win(10));
        let steps = [("2", win(20)), ("3", None), ("1", win(10)), ("5", win(50))];

        for (name, focused) in steps {
            let before = h.snapshot();
            h.on_workspace_focus(name.into(), focused.clone());
            let after = h.snapshot();
            assert_eq!(
                after.previous_workspace.as_deref(),
                Some(before.current_workspace.as_str())
            );
            assert_eq!(after.previous_window, before.current_window);
            assert_eq!(after.current_workspace, name);
            assert_eq!(after.current_window, focused);
        }
    }

    #[test]
    fn window_focus_leaves_previous_untouched() {
        let h = history("1", win(1));
        h.on_workspace_focus("2".into(), win(2));
        let before = h.snapshot();

        for id in 3..10 {
            h.on_window_focus(WindowRef::new(id));
        }

        let after = h.snapshot();
        assert_eq!(after.previous_workspace, before.previous_workspace);
        assert_eq!(after.previous_window, before.previous_window);
        assert_eq!(after.current_workspace, "2");
        assert_eq!(after.current_window, win(9));
    }

    #[test]
    fn window_focus_before_any_transition_keeps_no_history() {
        let h = history("1", None);
        h.on_window_focus(WindowRef::new(7));
        let s = h.snapshot();
        assert_eq!(s.previous_workspace, None);
        assert_eq!(s.current_window, win(7));
    }

    #[test]
    fn empty_workspace_records_absent_window() {
        let h = history("1", win(1));
        h.on_workspace_focus("9".into(), None);
        h.on_workspace_focus("1".into(), win(1));
        let s = h.snapshot();
        assert_eq!(s.previous_workspace.as_deref(), Some("9"));
        assert_eq!(s.previous_window, None);
    }

    #[test]
    fn apply_routes_events() {
        let h = history("1: web", win(1));
        h.apply(WmEvent::WorkspaceFocus {
            name: "2: term".into(),
            focused: win(2),
        });
        h.apply(WmEvent::WindowFocus(WindowRef::new(3)));
        let s = h.snapshot();
        assert_eq!(s.previous_workspace.as_deref(), Some("1: web"));
        assert_eq!(s.previous_window, win(1));
        assert_eq!(s.current_workspace, "2: term");
        assert_eq!(s.current_window, win(3));
    }

    #[test]
    fn clones_share_state_across_threads() {
        let h = history("1", win(1));
        let writer = h.clone();
        let t = std::thread::spawn(move || {
            for i in 0..100u64 {
                writer.on_workspace_focus(i.to_string(), win(i));
            }
        });
        t.join().unwrap();
        let s = h.snapshot();
        assert_eq!(s.current_workspace, "99");
        assert_eq!(s.previous_workspace.as_deref(), Some("98"));
        assert_eq!(s.previous_window, win(98));
    }
}
