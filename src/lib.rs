//! **focus-last**: jump back to the previously focused window in i3.
//!
//! A daemon remembers the current and the previous (workspace, window)
//! pair by following i3's focus events.  Keybindings talk to it over a Unix
//! socket: `switch` focuses the previous window, a workspace name jumps
//! there (or back, if it is the workspace you are already on).
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`]: queries focus and issues focus/workspace
//!   commands, so the [`dispatcher`] is not coupled to i3.
//! * [`traits::EventSource`]: delivers focus events to the
//!   [`history`] store.
//!
//! Concrete implementations live in [`i3`] (i3/sway IPC) and [`ipc`]
//! (the control socket).  [`daemon`] wires them together.

pub mod command;
pub mod config;
pub mod daemon;
pub mod dispatcher;
pub mod history;
pub mod i3;
pub mod ipc;
pub mod traits;
