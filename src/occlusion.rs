//! Is anything covering the strip of screen the dock sits in?
//!
//! The answer only drives a visual `occluded` attribute; it never changes
//! the dock's shown/hidden state.

use crate::command::{MonitorInfo, WindowInfo};

/// Axis-aligned rectangle in virtual-desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcclusionRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl OcclusionRegion {
    /// The full-width strip of `height` logical pixels along the bottom
    /// edge of `monitor`.
    pub fn bottom_strip(monitor: &MonitorInfo, height: u32) -> Self {
        let (width, screen_height) = monitor.logical_size();
        let height = i32::try_from(height).unwrap_or(i32::MAX).min(screen_height);
        Self {
            x: monitor.x,
            y: monitor.y + screen_height - height,
            width,
            height,
        }
    }

    /// Whether the window's rectangle overlaps this region by at least one
    /// pixel.
    pub fn intersects(&self, window: &WindowInfo) -> bool {
        let (wx, wy) = window.at;
        let (ww, wh) = window.size;
        if ww <= 0 || wh <= 0 {
            return false;
        }
        wx < self.x + self.width
            && wx + ww > self.x
            && wy < self.y + self.height
            && wy + wh > self.y
    }

    /// Whether any window on `workspace_id` overlaps this region.
    pub fn is_covered(&self, windows: &[WindowInfo], workspace_id: i32) -> bool {
        windows
            .iter()
            .filter(|w| w.workspace_id == workspace_id)
            .any(|w| self.intersects(w))
    }
}

/// Remembers the last region and verdict so the controller only reports
/// changes.
#[derive(Debug)]
pub struct OcclusionTracker {
    height: u32,
    output: Option<(i32, i32, i32, i32)>,
    region: Option<OcclusionRegion>,
    occluded: bool,
}

impl OcclusionTracker {
    pub fn new(height: u32) -> Self {
        Self {
            height,
            output: None,
            region: None,
            occluded: false,
        }
    }

    pub fn occluded(&self) -> bool {
        self.occluded
    }

    /// The region for the dock's output, recomputed only when the output
    /// geometry differs from last time.
    pub fn region_for(&mut self, monitor: &MonitorInfo) -> OcclusionRegion {
        let (width, height) = monitor.logical_size();
        let geometry = (monitor.x, monitor.y, width, height);
        match self.region {
            Some(region) if self.output == Some(geometry) => region,
            _ => {
                let region = OcclusionRegion::bottom_strip(monitor, self.height);
                self.output = Some(geometry);
                self.region = Some(region);
                region
            }
        }
    }

    /// Record a fresh verdict.  Returns it if it differs from the last one.
    pub fn update(&mut self, occluded: bool) -> Option<bool> {
        if occluded == self.occluded {
            return None;
        }
        self.occluded = occluded;
        Some(occluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::window;

    fn monitor_1080p() -> MonitorInfo {
        MonitorInfo {
            id: 0,
            name: "DP-1".into(),
            width: 1920,
            height: 1080,
            x: 0,
            y: 0,
            scale: 1.0,
            transform: 0,
            focused: true,
            active_workspace: 1,
        }
    }

    fn placed(at: (i32, i32), size: (i32, i32), ws: i32) -> WindowInfo {
        WindowInfo {
            at,
            size,
            ..window("0x1", "kitty", ws)
        }
    }

    #[test]
    fn strip_sits_on_bottom_edge() {
        let r = OcclusionRegion::bottom_strip(&monitor_1080p(), 80);
        assert_eq!(
            r,
            OcclusionRegion {
                x: 0,
                y: 1000,
                width: 1920,
                height: 80
            }
        );
    }

    #[test]
    fn strip_follows_monitor_offset() {
        let m = MonitorInfo {
            x: 1920,
            y: 200,
            ..monitor_1080p()
        };
        let r = OcclusionRegion::bottom_strip(&m, 80);
        assert_eq!((r.x, r.y), (1920, 1200));
    }

    #[test]
    fn overlap_is_detected() {
        let r = OcclusionRegion::bottom_strip(&monitor_1080p(), 80);
        // Tiled window reaching the bottom edge.
        assert!(r.intersects(&placed((5, 50), (1910, 1025), 1)));
        // Window ending exactly where the strip starts does not overlap.
        assert!(!r.intersects(&placed((0, 0), (1920, 1000), 1)));
        // Window on another monitor.
        assert!(!r.intersects(&placed((1920, 900), (800, 600), 1)));
        // Degenerate size.
        assert!(!r.intersects(&placed((0, 1010), (0, 0), 1)));
    }

    #[test]
    fn strip_uses_logical_size_on_scaled_output() {
        let hidpi = MonitorInfo {
            width: 3840,
            height: 2160,
            scale: 2.0,
            ..monitor_1080p()
        };
        let r = OcclusionRegion::bottom_strip(&hidpi, 80);
        assert_eq!(
            r,
            OcclusionRegion {
                x: 0,
                y: 1000,
                width: 1920,
                height: 80
            }
        );
        assert!(r.is_covered(&[placed((0, 0), (1920, 1080), 1)], 1));
    }

    #[test]
    fn strip_follows_rotated_output() {
        let portrait = MonitorInfo {
            transform: 1,
            ..monitor_1080p()
        };
        let r = OcclusionRegion::bottom_strip(&portrait, 80);
        assert_eq!((r.y, r.width), (1840, 1080));
    }

    #[test]
    fn only_active_workspace_counts() {
        let r = OcclusionRegion::bottom_strip(&monitor_1080p(), 80);
        let windows = vec![placed((0, 900), (500, 500), 2)];
        assert!(!r.is_covered(&windows, 1));
        assert!(r.is_covered(&windows, 2));
    }

    #[test]
    fn tracker_reports_changes_only() {
        let mut t = OcclusionTracker::new(80);
        assert_eq!(t.update(false), None);
        assert_eq!(t.update(true), Some(true));
        assert_eq!(t.update(true), None);
        assert!(t.occluded());
        assert_eq!(t.update(false), Some(false));
    }

    #[test]
    fn tracker_recomputes_on_geometry_change() {
        let mut t = OcclusionTracker::new(80);
        let m = monitor_1080p();
        assert_eq!(t.region_for(&m).y, 1000);
        let taller = MonitorInfo {
            height: 1440,
            width: 2560,
            ..m
        };
        let r = t.region_for(&taller);
        assert_eq!((r.y, r.width), (1360, 2560));
    }
}
