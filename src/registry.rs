//! Live snapshot of the compositor's windows.
//!
//! [`WindowRegistry`] owns the only copy of the window list.  A
//! [`refresh`](WindowRegistry::refresh) replaces it wholesale; readers never
//! see a half-updated list.  [`group_by_identity`] derives the per-app view
//! the launcher model is built from.

use crate::command::{identity_key, WindowInfo};
use crate::traits::Compositor;
use log::{debug, warn};

/// All open windows of one application, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGroup {
    /// Identity as spelled by the first window discovered.
    pub identity: String,
    pub windows: Vec<WindowInfo>,
}

/// Windows grouped by case-insensitive identity, groups in order of first
/// discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowGroups {
    groups: Vec<WindowGroup>,
}

impl WindowGroups {
    /// Look up a group by identity, ignoring case.
    pub fn get(&self, identity: &str) -> Option<&WindowGroup> {
        let key = identity_key(identity);
        self.groups.iter().find(|g| identity_key(&g.identity) == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Partition `windows` into one group per identity.
///
/// Every window lands in exactly one group; groups keep the order in which
/// their first window appears, and windows keep their relative order.
pub fn group_by_identity(windows: &[WindowInfo]) -> WindowGroups {
    let mut groups: Vec<WindowGroup> = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    for w in windows {
        let key = w.identity_key();
        match keys.iter().position(|k| *k == key) {
            Some(i) => groups[i].windows.push(w.clone()),
            None => {
                keys.push(key);
                groups.push(WindowGroup {
                    identity: w.app_identity.clone(),
                    windows: vec![w.clone()],
                });
            }
        }
    }
    WindowGroups { groups }
}

/// Owner of the current window snapshot and focused-window address.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<WindowInfo>,
    active: Option<String>,
    last_refresh_ok: bool,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-query the compositor and replace the snapshot.
    ///
    /// A failed client-list query yields an empty snapshot: "no windows" is
    /// a valid state for every consumer.  [`is_fresh`](Self::is_fresh)
    /// reports whether the last refresh reflects the compositor's reality.
    pub fn refresh<C: Compositor>(&mut self, compositor: &C) -> &[WindowInfo] {
        let (windows, ok) = match compositor.clients() {
            Ok(clients) => {
                let windows: Vec<WindowInfo> = clients
                    .into_iter()
                    .filter(|w| {
                        let keep = !w.app_identity.trim().is_empty();
                        if !keep {
                            debug!("skipping window {} without a class", w.address);
                        }
                        keep
                    })
                    .collect();
                (windows, true)
            }
            Err(e) => {
                warn!("client list unavailable, using empty snapshot: {}", e);
                (Vec::new(), false)
            }
        };
        let active = match compositor.active_window_address() {
            Ok(addr) => addr.filter(|a| !a.is_empty()),
            Err(e) => {
                warn!("active window unavailable: {}", e);
                None
            }
        };

        self.windows = windows;
        self.active = active;
        self.last_refresh_ok = ok;
        debug!("registry holds {} window(s)", self.windows.len());
        &self.windows
    }

    /// The current snapshot.
    pub fn windows(&self) -> &[WindowInfo] {
        &self.windows
    }

    /// Group the current snapshot by identity.
    pub fn groups(&self) -> WindowGroups {
        group_by_identity(&self.windows)
    }

    /// Address of the focused window as of the last refresh.
    pub fn active_window_address(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether the last refresh got a real client list.
    pub fn is_fresh(&self) -> bool {
        self.last_refresh_ok
    }
}
