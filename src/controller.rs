//! The orchestrator that ties the registry, launcher model, pinned store and
//! visibility machine together.
//!
//! [`DockController`] consumes one [`Message`] at a time, in arrival order,
//! and fires its timers from [`tick`](DockController::tick).  Nothing here
//! runs concurrently: a registry refresh and everything derived from it
//! (launcher rebuild, census) complete within a single step.
//!
//! Errors never escape: IPC failures keep the last known state, failed
//! writes keep the previous pinned order, and both are logged.

use crate::command::{Command, CompositorEvent, Message, WindowInfo};
use crate::config::DockConfig;
use crate::launcher::{self, Activation, LauncherEntry};
use crate::occlusion::OcclusionTracker;
use crate::pinned::{self, PinnedStore};
use crate::registry::WindowRegistry;
use crate::traits::{AppLauncher, Compositor};
use crate::visibility::{Visibility, VisibilityMachine};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

/// State changes published to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DockUpdate {
    /// The full, ordered launcher list.  Sent after every rebuild.
    Entries(Vec<LauncherEntry>),
    Visibility(Visibility),
    Occluded(bool),
}

/// Orchestrates the dock.
///
/// Generic over the [`Compositor`] and [`AppLauncher`] so it can be driven
/// by Hyprland in production and by scripted doubles in tests.
pub struct DockController<C: Compositor, L: AppLauncher> {
    compositor: C,
    launcher: L,
    config: DockConfig,
    registry: WindowRegistry,
    pinned: PinnedStore,
    visibility: VisibilityMachine,
    occlusion: OcclusionTracker,
    entries: Vec<LauncherEntry>,
    ready: bool,
    pending_census: Option<Instant>,
    next_occlusion_check: Instant,
    update_tx: Option<mpsc::Sender<DockUpdate>>,
}

impl<C: Compositor, L: AppLauncher> DockController<C, L> {
    /// Create a controller.  The dock starts shown; nothing touching the
    /// window list happens until the compositor reports
    /// [`Ready`](CompositorEvent::Ready).
    pub fn new(
        compositor: C,
        launcher: L,
        pinned: PinnedStore,
        config: DockConfig,
        now: Instant,
    ) -> Self {
        Self {
            compositor,
            launcher,
            registry: WindowRegistry::new(),
            pinned,
            visibility: VisibilityMachine::new(config.hide_delay()),
            occlusion: OcclusionTracker::new(config.occlusion_height),
            entries: Vec::new(),
            ready: false,
            pending_census: None,
            next_occlusion_check: now,
            update_tx: None,
            config,
        }
    }

    /// Attach the UI update channel.  The current visibility and occlusion
    /// are sent immediately.
    pub fn set_updates(&mut self, tx: mpsc::Sender<DockUpdate>) {
        self.update_tx = Some(tx);
        self.publish(DockUpdate::Visibility(self.visibility.state()));
        self.publish(DockUpdate::Occluded(self.occlusion.occluded()));
    }

    pub fn entries(&self) -> &[LauncherEntry] {
        &self.entries
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility.state()
    }

    pub fn occluded(&self) -> bool {
        self.occlusion.occluded()
    }

    pub fn pinned_order(&self) -> &[String] {
        self.pinned.order()
    }

    /// Whether the compositor has reported ready at least once.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Process a single [`Message`].
    pub fn handle(&mut self, msg: Message, now: Instant) {
        match msg {
            Message::Compositor(ev) => self.handle_event(ev, now),
            Message::Command(cmd) => self.handle_command(cmd, now),
        }
    }

    /// Fire every timer whose deadline is at or before `now`.
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.pending_census, Some(due) if now >= due) {
            self.pending_census = None;
            // Clients that appeared since Ready only show up in a fresh list.
            self.sync_windows();
            self.census(now);
        }
        if let Some(v) = self.visibility.poll(now) {
            info!("dock {:?}", v);
            self.publish(DockUpdate::Visibility(v));
        }
        if now >= self.next_occlusion_check {
            self.check_occlusion();
            self.next_occlusion_check = now + self.config.occlusion_interval();
        }
    }

    /// The earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Instant {
        [self.pending_census, self.visibility.hide_deadline()]
            .into_iter()
            .flatten()
            .fold(self.next_occlusion_check, Instant::min)
    }

    /// Run the main loop until every message source has hung up.
    ///
    /// Messages are handled in arrival order; between them the loop sleeps
    /// no longer than the next timer deadline.
    pub fn run(&mut self, rx: mpsc::Receiver<Message>) {
        info!("hyprdock running");
        loop {
            self.tick(Instant::now());
            let timeout = self
                .next_deadline()
                .saturating_duration_since(Instant::now());
            match rx.recv_timeout(timeout) {
                Ok(msg) => {
                    debug!("handling {:?}", msg);
                    self.handle(msg, Instant::now());
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("all message sources closed, exiting");
    }

    //  Compositor events

    fn handle_event(&mut self, ev: CompositorEvent, now: Instant) {
        if ev == CompositorEvent::Ready {
            if self.ready {
                info!("compositor reconnected, resynchronising");
                self.pending_census = None;
                self.sync_windows();
                self.census(now);
            } else {
                info!("compositor ready");
                self.ready = true;
                self.sync_windows();
                self.pending_census = Some(now + self.config.initial_census_delay());
            }
            return;
        }
        if !self.ready {
            debug!("ignoring {:?} before ready", ev);
            return;
        }
        self.sync_windows();
        if ev.affects_census() {
            self.census(now);
        }
    }

    /// Refresh the registry and rebuild the launcher list from it.
    fn sync_windows(&mut self) {
        self.registry.refresh(&self.compositor);
        self.rebuild_entries();
    }

    fn rebuild_entries(&mut self) {
        self.entries = launcher::rebuild(self.pinned.order(), &self.registry.groups());
        self.publish(DockUpdate::Entries(self.entries.clone()));
    }

    /// Re-evaluate visibility against the windows on the active workspace.
    ///
    /// Skipped (keeping the current state) when either the window list or
    /// the active workspace could not be fetched.
    fn census(&mut self, now: Instant) {
        if !self.registry.is_fresh() {
            warn!("window list is stale, keeping dock {:?}", self.visibility.state());
            return;
        }
        let workspace = match self.compositor.active_workspace() {
            Ok(ws) => ws,
            Err(e) => {
                warn!("active workspace unavailable, keeping dock {:?}: {}", self.visibility.state(), e);
                return;
            }
        };
        let ws_clients: Vec<WindowInfo> = self
            .registry
            .windows()
            .iter()
            .filter(|w| w.workspace_id == workspace)
            .cloned()
            .collect();
        debug!("workspace {} holds {} window(s)", workspace, ws_clients.len());
        if let Some(v) = self.visibility.census(&ws_clients, now) {
            info!("dock {:?}", v);
            self.publish(DockUpdate::Visibility(v));
        }
    }

    fn check_occlusion(&mut self) {
        let monitors = match self.compositor.monitors() {
            Ok(m) => m,
            Err(e) => {
                debug!("occlusion check skipped: {}", e);
                return;
            }
        };
        let Some(output) = crate::command::primary_monitor(&monitors) else {
            return;
        };
        let region = self.occlusion.region_for(output);
        let workspace = output.active_workspace;
        let windows = match self.compositor.clients() {
            Ok(w) => w,
            Err(e) => {
                debug!("occlusion check skipped: {}", e);
                return;
            }
        };
        if let Some(occluded) = self.occlusion.update(region.is_covered(&windows, workspace)) {
            debug!("occluded: {}", occluded);
            self.publish(DockUpdate::Occluded(occluded));
        }
    }

    //  UI commands

    fn handle_command(&mut self, cmd: Command, now: Instant) {
        match cmd {
            Command::HoverEnter => {
                if let Some(v) = self.visibility.hover_enter() {
                    info!("dock {:?}", v);
                    self.publish(DockUpdate::Visibility(v));
                }
            }
            Command::HoverLeave => self.visibility.hover_leave(now),
            Command::Reorder { source, target } => self.reorder(source, target),
            Command::Activate(index) => self.activate(index),
        }
    }

    fn reorder(&mut self, source: usize, target: usize) {
        let moved = match pinned::reorder(source, target, &self.entries) {
            Ok(moved) => moved,
            Err(e) => {
                warn!("ignoring drag: {}", e);
                return;
            }
        };
        if source == target {
            return;
        }
        let order = pinned::pinned_order(&moved);
        info!("pinned order now {:?}", order);
        if let Err(e) = self.pinned.persist(order) {
            warn!("could not save pinned order, keeping previous: {}", e);
        }
        self.rebuild_entries();
    }

    fn activate(&mut self, index: usize) {
        let Some(entry) = self.entries.get(index) else {
            warn!(
                "activate: no entry at index {} (have {})",
                index,
                self.entries.len()
            );
            return;
        };
        match launcher::activate(entry, self.registry.active_window_address()) {
            Activation::Launch(app) => {
                info!("launching {}", app);
                self.launcher.launch(&app);
            }
            Activation::Focus(address) => {
                debug!("focusing {}", address);
                if let Err(e) = self.compositor.focus_window(&address) {
                    warn!("focus {} failed: {}", address, e);
                }
            }
        }
    }

    fn publish(&self, update: DockUpdate) {
        if let Some(tx) = &self.update_tx {
            let _ = tx.send(update);
        }
    }
}

//  Tests
