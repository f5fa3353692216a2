//! **hyprdock**: the controller behind an auto-hiding application dock.
//!
//! hyprdock keeps a live view of the compositor's windows, turns it into an
//! ordered list of launcher buttons (pinned apps first, in the user's saved
//! order), and decides when the dock should be shown or tucked away.  A UI
//! renders whatever hyprdock publishes and feeds back hover, click and drag
//! input.
//!
//! # Architecture
//!
//! Everything funnels through one queue of [`command::Message`]s consumed by
//! [`controller::DockController`] on a single thread.  The crate is organised
//! around three traits:
//!
//! * [`traits::Compositor`]: window queries and focus, so the dock logic is
//!   not coupled to any specific compositor.
//! * [`traits::MessageSource`]: producers of queue messages (the
//!   compositor's event socket, the UI command socket, …).
//! * [`traits::AppLauncher`]: fire-and-forget application start.
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC), [`ipc`]
//! (Unix-socket command listener) and [`launcher`] (detached processes).

pub mod command;
pub mod config;
pub mod controller;
pub mod hyprland;
pub mod ipc;
pub mod launcher;
pub mod occlusion;
pub mod pinned;
pub mod registry;
pub mod traits;
pub mod visibility;
