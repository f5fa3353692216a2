//! Messages and types used throughout hyprdock.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every input the UI can send, [`CompositorEvent`]
//! describes every compositor notification the controller reacts to, and
//! [`Message`] is the closed set of things that travel through the main
//! loop's queue.  [`WindowInfo`] / [`MonitorInfo`] are the supporting data
//! types.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Every input the UI layer can send to the dock controller.
///
/// On the wire these are newline-delimited JSON values, e.g.
/// `"HoverEnter"` or `{"Reorder":{"source":0,"target":2}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// The pointer entered the dock hit-region.
    HoverEnter,

    /// The pointer left the dock hit-region.
    HoverLeave,

    /// A drag gesture moved the entry at `source` onto position `target`.
    ///
    /// Both indices refer to the launcher list as last published.
    Reorder { source: usize, target: usize },

    /// The launcher entry at the given index was clicked.
    Activate(usize),
}

/// Notifications from the compositor's event socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorEvent {
    /// The event subscription is connected.  Emitted once per connection.
    Ready,
    WindowOpened { address: String, app_identity: String },
    WindowClosed { address: String },
    ActiveWindowChanged { address: String },
    FloatingModeChanged { address: String },
    FullscreenChanged { fullscreen: bool },
    WindowMoved { address: String, workspace_id: i32 },
    WorkspaceChanged { workspace_id: i32 },
}

impl CompositorEvent {
    /// Whether this event can change which windows sit on the active
    /// workspace (and therefore requires a visibility census).
    pub fn affects_census(&self) -> bool {
        !matches!(
            self,
            CompositorEvent::Ready | CompositorEvent::ActiveWindowChanged { .. }
        )
    }
}

/// One item in the controller's input queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Command(Command),
    Compositor(CompositorEvent),
}

impl From<Command> for Message {
    fn from(cmd: Command) -> Self {
        Message::Command(cmd)
    }
}

impl From<CompositorEvent> for Message {
    fn from(ev: CompositorEvent) -> Self {
        Message::Compositor(ev)
    }
}

/// Fullscreen state as reported in the client list.
///
/// Older Hyprland versions report a boolean, newer ones an integer mode
/// (`0` = none, `1` = maximised, `2` = fullscreen).  Any non-zero mode
/// counts as fullscreen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Fullscreen(pub bool);

impl<'de> Deserialize<'de> for Fullscreen {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Fullscreen;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "boolean or integer fullscreen mode")
            }
            fn visit_bool<E>(self, b: bool) -> Result<Fullscreen, E>
            where
                E: DeError,
            {
                Ok(Fullscreen(b))
            }
            fn visit_u64<E>(self, n: u64) -> Result<Fullscreen, E>
            where
                E: DeError,
            {
                Ok(Fullscreen(n != 0))
            }
            fn visit_i64<E>(self, n: i64) -> Result<Fullscreen, E>
            where
                E: DeError,
            {
                Ok(Fullscreen(n != 0))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// One open window as seen in the compositor's client list.
///
/// Snapshots are rebuilt wholesale on every registry refresh; a
/// `WindowInfo` is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    /// Compositor address (`0x…`), unique per window.
    pub address: String,
    /// Application class used to group windows.  Compare with
    /// [`identity_key`](WindowInfo::identity_key), never directly.
    pub app_identity: String,
    pub workspace_id: i32,
    pub monitor: i64,
    pub floating: bool,
    pub fullscreen: bool,
    pub title: String,
    /// Top-left corner on the virtual desktop (pixels).
    pub at: (i32, i32),
    /// Width and height (pixels).
    pub size: (i32, i32),
}

impl WindowInfo {
    /// Case-insensitive grouping key.
    pub fn identity_key(&self) -> String {
        identity_key(&self.app_identity)
    }

    /// Whether the window tiles (neither floating nor fullscreen).
    pub fn is_tiled(&self) -> bool {
        !self.floating && !self.fullscreen
    }
}

/// Normalise an application identity into its case-insensitive key.
pub fn identity_key(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// Static information about a monitor known to the compositor.
///
/// `width`/`height` are the mode in physical pixels; `x`/`y` are already
/// logical, like window geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    pub id: i64,
    /// Output name (e.g. `"DP-1"`).
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    /// Wayland output transform, `0..=7`.  Odd values rotate by 90° or 270°.
    pub transform: i32,
    pub focused: bool,
    /// Id of the workspace currently shown on this monitor.
    pub active_workspace: i32,
}

impl MonitorInfo {
    /// Width and height in the logical pixels windows are placed in.
    pub fn logical_size(&self) -> (i32, i32) {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let w = (f64::from(self.width) / scale).round() as i32;
        let h = (f64::from(self.height) / scale).round() as i32;
        if self.transform % 2 == 1 {
            (h, w)
        } else {
            (w, h)
        }
    }
}

/// Pick the output the dock lives on: the focused monitor, else the first.
pub fn primary_monitor(monitors: &[MonitorInfo]) -> Option<&MonitorInfo> {
    monitors
        .iter()
        .find(|m| m.focused)
        .or_else(|| monitors.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_wire() {
        let c: Command = serde_json::from_str(r#""HoverEnter""#).unwrap();
        assert_eq!(c, Command::HoverEnter);
        let c: Command = serde_json::from_str(r#"{"Reorder":{"source":0,"target":2}}"#).unwrap();
        assert_eq!(c, Command::Reorder { source: 0, target: 2 });
        let c: Command = serde_json::from_str(r#"{"Activate":3}"#).unwrap();
        assert_eq!(c, Command::Activate(3));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<Command>(r#""Explode""#).is_err());
    }

    #[test]
    fn fullscreen_accepts_bool_and_mode() {
        let f: Fullscreen = serde_json::from_str("true").unwrap();
        assert!(f.0);
        let f: Fullscreen = serde_json::from_str("0").unwrap();
        assert!(!f.0);
        let f: Fullscreen = serde_json::from_str("2").unwrap();
        assert!(f.0);
        assert!(serde_json::from_str::<Fullscreen>(r#""yes""#).is_err());
    }

    #[test]
    fn identity_key_is_case_insensitive() {
        assert_eq!(identity_key("Firefox"), identity_key("firefox"));
        assert_eq!(identity_key(" Kitty "), "kitty");
    }

    #[test]
    fn census_relevance() {
        assert!(!CompositorEvent::Ready.affects_census());
        assert!(!CompositorEvent::ActiveWindowChanged { address: "0x1".into() }.affects_census());
        assert!(CompositorEvent::WindowClosed { address: "0x1".into() }.affects_census());
        assert!(CompositorEvent::WorkspaceChanged { workspace_id: 2 }.affects_census());
    }

    fn monitor(name: &str, focused: bool) -> MonitorInfo {
        MonitorInfo {
            id: 0,
            name: name.into(),
            width: 1920,
            height: 1080,
            x: 0,
            y: 0,
            scale: 1.0,
            transform: 0,
            focused,
            active_workspace: 1,
        }
    }

    #[test]
    fn logical_size_applies_scale_and_rotation() {
        let m = MonitorInfo {
            width: 3840,
            height: 2160,
            scale: 2.0,
            ..monitor("DP-1", true)
        };
        assert_eq!(m.logical_size(), (1920, 1080));
        let m = MonitorInfo {
            width: 2560,
            height: 1440,
            scale: 1.25,
            transform: 1,
            ..monitor("DP-2", true)
        };
        assert_eq!(m.logical_size(), (1152, 2048));
    }

    #[test]
    fn primary_monitor_prefers_focused() {
        let mons = vec![monitor("DP-1", false), monitor("DP-2", true)];
        assert_eq!(primary_monitor(&mons).map(|m| m.name.as_str()), Some("DP-2"));
        let mons = vec![monitor("DP-1", false), monitor("DP-2", false)];
        assert_eq!(primary_monitor(&mons).map(|m| m.name.as_str()), Some("DP-1"));
        assert!(primary_monitor(&[]).is_none());
    }
}
