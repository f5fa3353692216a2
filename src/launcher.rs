//! Launcher buttons: one per application, pinned ones first.
//!
//! [`rebuild`] turns the pinned order plus the registry's groups into the
//! ordered list the UI renders.  [`activate`] decides what a click on an
//! entry does: launch the app if nothing is open, otherwise focus the next
//! window after the one currently focused.

use crate::command::{identity_key, WindowInfo};
use crate::registry::WindowGroups;
use crate::traits::AppLauncher;
use log::{debug, warn};
use serde::Serialize;
use std::process::{Command as Process, Stdio};

/// One dock button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LauncherEntry {
    pub app_identity: String,
    pub pinned: bool,
    /// Open windows of this app, in discovery order.  Empty only for
    /// pinned apps that are not running.
    pub instances: Vec<WindowInfo>,
    /// Icon-theme lookup key.
    pub icon_key: String,
    /// Tooltip text: the first window's title, else the identity.
    pub label: String,
    pub running: bool,
}

impl LauncherEntry {
    fn new(app_identity: &str, pinned: bool, instances: Vec<WindowInfo>) -> Self {
        let label = instances
            .first()
            .map(|w| w.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| app_identity.to_string());
        Self {
            app_identity: app_identity.to_string(),
            pinned,
            running: !instances.is_empty(),
            instances,
            icon_key: identity_key(app_identity),
            label,
        }
    }
}

/// Build the launcher list.
///
/// Pinned apps come first in `pinned_order`, each exactly once, carrying
/// whatever windows they have.  Every other running app follows in
/// discovery order.
pub fn rebuild(pinned_order: &[String], groups: &WindowGroups) -> Vec<LauncherEntry> {
    let pinned_keys: Vec<String> = pinned_order.iter().map(|p| identity_key(p)).collect();

    let mut entries: Vec<LauncherEntry> = Vec::with_capacity(pinned_order.len() + groups.len());
    for app in pinned_order {
        let instances = groups
            .get(app)
            .map(|g| g.windows.clone())
            .unwrap_or_default();
        entries.push(LauncherEntry::new(app, true, instances));
    }
    for group in groups.iter() {
        if pinned_keys.contains(&identity_key(&group.identity)) {
            continue;
        }
        entries.push(LauncherEntry::new(&group.identity, false, group.windows.clone()));
    }
    entries
}

/// What clicking an entry should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Nothing open: start the application.
    Launch(String),
    /// Focus the window at this address.
    Focus(String),
}

/// Decide the effect of clicking `entry`.
///
/// Clicking cycles through an app's windows: the target is the one after
/// the focused window, wrapping around.  If none of the app's windows has
/// focus, the first one is targeted.
pub fn activate(entry: &LauncherEntry, active_address: Option<&str>) -> Activation {
    if entry.instances.is_empty() {
        return Activation::Launch(entry.app_identity.clone());
    }
    let count = entry.instances.len();
    let next = match active_address
        .and_then(|addr| entry.instances.iter().position(|w| w.address == addr))
    {
        Some(idx) => (idx + 1) % count,
        None => 0,
    };
    Activation::Focus(entry.instances[next].address.clone())
}

/// Starts applications as detached background processes.
///
/// The identity is executed as a program name with null stdio.  A helper
/// thread waits on the child so it does not linger as a zombie; nobody
/// waits on that thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl AppLauncher for DetachedLauncher {
    fn launch(&self, app_identity: &str) {
        let program = app_identity.trim().to_string();
        if program.is_empty() {
            return;
        }
        debug!("launching {}", program);
        std::thread::spawn(move || {
            let child = Process::new(&program)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            match child {
                Ok(mut child) => {
                    let _ = child.wait();
                }
                Err(e) => warn!("failed to launch {}: {}", program, e),
            }
        });
    }
}
