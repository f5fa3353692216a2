//! Core traits that decouple hyprdock from any specific compositor,
//! process launcher, or transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  The
//! [`DockController`](crate::controller::DockController) only depends on
//! these abstractions.

use crate::command::{Message, MonitorInfo, WindowInfo};
use std::sync::mpsc;

/// Abstraction over a compositor that can report its windows and focus one
/// of them.
///
/// An implementation might talk to Hyprland via IPC, or it might be a
/// scripted stub used in tests.  Every call is a point-in-time request and
/// must return (successfully or not) within a bounded time.
pub trait Compositor {
    /// The error type produced by this compositor.
    type Error: std::error::Error + Send + 'static;

    /// Return every open window, in the compositor's discovery order.
    fn clients(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// Return the address of the focused window, or `None` if nothing has
    /// focus.
    fn active_window_address(&self) -> Result<Option<String>, Self::Error>;

    /// Return the id of the workspace currently focused.
    fn active_workspace(&self) -> Result<i32, Self::Error>;

    /// Return the list of monitors the compositor knows about.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error>;

    /// Give keyboard focus to the window at `address`.
    fn focus_window(&self, address: &str) -> Result<(), Self::Error>;
}

/// Starts applications that have no open window yet.
///
/// Launching is fire-and-forget: the controller never waits for, nor learns
/// about, the outcome.
pub trait AppLauncher {
    fn launch(&self, app_identity: &str);
}

/// A producer of [`Message`]s for the controller's queue.
///
/// Implementations listen on some transport (the compositor's event socket,
/// the UI command socket, …) and forward parsed messages into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](MessageSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received message must be sent through `sink` exactly once, in
///   arrival order.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait MessageSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Message`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Message>) -> Result<(), Self::Error>;
}
