//! Show/auto-hide state machine for the dock.
//!
//! ```text
//!            hover-enter / empty or all-floating workspace
//!   Hidden ─────────────────────────────────────────────▶ Shown
//!     ▲                                                     │
//!     │  hide timer expires                                 │ hover-leave /
//!     └──────────── Shown + pending hide ◀──────────────────┘ tiled window on workspace
//! ```
//!
//! Time is passed in explicitly: the machine stores the deadline of its one
//! hide timer and fires it from [`poll`](VisibilityMachine::poll).  The main
//! loop sleeps until [`hide_deadline`](VisibilityMachine::hide_deadline).

use crate::command::WindowInfo;
use log::debug;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Shown,
    Hidden,
}

#[derive(Debug)]
pub struct VisibilityMachine {
    state: Visibility,
    pending_hide: Option<Instant>,
    hide_delay: Duration,
}

impl VisibilityMachine {
    /// Start shown, with no timer armed.
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            state: Visibility::Shown,
            pending_hide: None,
            hide_delay,
        }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    /// When the armed hide timer fires, if one is armed.
    pub fn hide_deadline(&self) -> Option<Instant> {
        self.pending_hide
    }

    /// Pointer entered the dock: cancel any pending hide and show.
    ///
    /// Returns the new state if it changed.
    pub fn hover_enter(&mut self) -> Option<Visibility> {
        self.show()
    }

    /// Pointer left the dock: arm the hide timer if shown.
    pub fn hover_leave(&mut self, now: Instant) {
        if self.state == Visibility::Shown {
            self.arm(now);
        }
    }

    /// Re-evaluate after the set of windows on the active workspace
    /// changed.
    ///
    /// An empty workspace, or one holding only floating/fullscreen windows,
    /// shows the dock at once.  A single tiled window is enough to start
    /// the hide countdown.
    pub fn census(&mut self, ws_clients: &[WindowInfo], now: Instant) -> Option<Visibility> {
        if ws_clients.is_empty() {
            debug!("census: empty workspace");
            return self.show();
        }
        if ws_clients.iter().any(WindowInfo::is_tiled) {
            if self.state == Visibility::Shown && self.pending_hide.is_none() {
                debug!("census: tiled window present, arming hide");
                self.arm(now);
            }
            return None;
        }
        debug!("census: only floating/fullscreen windows");
        self.show()
    }

    /// Fire the hide timer if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Visibility> {
        match self.pending_hide {
            Some(deadline) if now >= deadline => {
                self.pending_hide = None;
                if self.state == Visibility::Shown {
                    self.state = Visibility::Hidden;
                    debug!("hide timer fired");
                    return Some(self.state);
                }
                None
            }
            _ => None,
        }
    }

    /// Cancel any pending hide and show.  Returns the new state if it
    /// changed.
    pub fn show(&mut self) -> Option<Visibility> {
        self.pending_hide = None;
        if self.state == Visibility::Hidden {
            self.state = Visibility::Shown;
            return Some(self.state);
        }
        None
    }

    /// Arm the hide timer, replacing any previous one.
    fn arm(&mut self, now: Instant) {
        self.pending_hide = Some(now + self.hide_delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::window;

    const DELAY: Duration = Duration::from_millis(1000);

    fn floating(address: &str) -> WindowInfo {
        WindowInfo {
            floating: true,
            ..window(address, "pavucontrol", 1)
        }
    }

    fn fullscreen(address: &str) -> WindowInfo {
        WindowInfo {
            fullscreen: true,
            ..window(address, "mpv", 1)
        }
    }

    /// Drive the machine to Hidden via a tiled census.
    fn hidden_machine(t0: Instant) -> VisibilityMachine {
        let mut m = VisibilityMachine::new(DELAY);
        m.census(&[window("0x1", "kitty", 1)], t0);
        assert_eq!(m.poll(t0 + DELAY), Some(Visibility::Hidden));
        m
    }

    #[test]
    fn starts_shown_without_timer() {
        let m = VisibilityMachine::new(DELAY);
        assert_eq!(m.state(), Visibility::Shown);
        assert_eq!(m.hide_deadline(), None);
    }

    #[test]
    fn tiled_window_hides_no_sooner_than_delay() {
        let t0 = Instant::now();
        let mut m = VisibilityMachine::new(DELAY);
        assert_eq!(m.census(&[window("0x1", "kitty", 1)], t0), None);
        assert_eq!(m.hide_deadline(), Some(t0 + DELAY));

        assert_eq!(m.poll(t0 + Duration::from_millis(999)), None);
        assert_eq!(m.state(), Visibility::Shown);
        assert_eq!(m.poll(t0 + DELAY), Some(Visibility::Hidden));
        assert_eq!(m.hide_deadline(), None);
    }

    #[test]
    fn empty_workspace_forces_shown() {
        let t0 = Instant::now();
        let mut m = hidden_machine(t0);
        assert_eq!(m.census(&[], t0 + DELAY), Some(Visibility::Shown));

        // Also cancels a pending hide while shown.
        m.census(&[window("0x1", "kitty", 1)], t0 + DELAY);
        assert!(m.hide_deadline().is_some());
        assert_eq!(m.census(&[], t0 + DELAY), None);
        assert_eq!(m.hide_deadline(), None);
        assert_eq!(m.state(), Visibility::Shown);
    }

    #[test]
    fn floating_or_fullscreen_only_forces_shown() {
        let t0 = Instant::now();
        let mut m = hidden_machine(t0);
        assert_eq!(
            m.census(&[floating("0x2"), fullscreen("0x3")], t0 + DELAY),
            Some(Visibility::Shown)
        );
        assert_eq!(m.hide_deadline(), None);
    }

    #[test]
    fn one_tiled_among_fullscreen_still_hides() {
        let t0 = Instant::now();
        let mut m = VisibilityMachine::new(DELAY);
        m.census(&[fullscreen("0x2"), window("0x1", "kitty", 1)], t0);
        assert_eq!(m.poll(t0 + DELAY), Some(Visibility::Hidden));
    }

    #[test]
    fn census_does_not_rearm_pending_timer() {
        let t0 = Instant::now();
        let mut m = VisibilityMachine::new(DELAY);
        let tiled = [window("0x1", "kitty", 1)];
        m.census(&tiled, t0);
        m.census(&tiled, t0 + Duration::from_millis(600));
        assert_eq!(m.hide_deadline(), Some(t0 + DELAY));
    }

    #[test]
    fn census_while_hidden_keeps_hidden() {
        let t0 = Instant::now();
        let mut m = hidden_machine(t0);
        assert_eq!(m.census(&[window("0x1", "kitty", 1)], t0 + DELAY * 2), None);
        assert_eq!(m.state(), Visibility::Hidden);
        assert_eq!(m.hide_deadline(), None);
    }

    #[test]
    fn hover_enter_cancels_pending_hide() {
        let t0 = Instant::now();
        let mut m = VisibilityMachine::new(DELAY);
        m.census(&[window("0x1", "kitty", 1)], t0);
        assert_eq!(m.hover_enter(), None);
        assert_eq!(m.hide_deadline(), None);
        assert_eq!(m.poll(t0 + DELAY * 5), None);
        assert_eq!(m.state(), Visibility::Shown);
    }

    #[test]
    fn hover_enter_shows_hidden_dock_at_once() {
        let t0 = Instant::now();
        let mut m = hidden_machine(t0);
        assert_eq!(m.hover_enter(), Some(Visibility::Shown));
    }

    #[test]
    fn hover_leave_rearms_from_latest_leave() {
        let t0 = Instant::now();
        let mut m = VisibilityMachine::new(DELAY);
        m.hover_leave(t0);
        m.hover_leave(t0 + Duration::from_millis(500));
        assert_eq!(m.hide_deadline(), Some(t0 + Duration::from_millis(1500)));
        assert_eq!(m.poll(t0 + DELAY), None);
        assert_eq!(
            m.poll(t0 + Duration::from_millis(1500)),
            Some(Visibility::Hidden)
        );
    }

    #[test]
    fn hover_leave_while_hidden_is_noop() {
        let t0 = Instant::now();
        let mut m = hidden_machine(t0);
        m.hover_leave(t0 + DELAY);
        assert_eq!(m.hide_deadline(), None);
    }
}
