//! Shared constants for the editor crate.

use crate::geom::Coords;

// ── Dashboard defaults ──────────────────────────────────────────

/// Name given to a dashboard that has never been named.
pub const DEFAULT_NAME: &str = "untitled";

/// Default grid step in pixels.
pub const DEFAULT_GRID: u32 = 20;

/// Default viewport (dashboard canvas) size in pixels.
pub const DEFAULT_VIEWPORT: Coords = Coords { x: 900.0, y: 600.0 };

/// Default viewer scale.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Grid steps offered in the globals bar.
pub const GRIDS: [u32; 8] = [1, 5, 10, 15, 20, 25, 30, 50];

/// Smallest viewport dimension offered in the globals bar.
pub const DIMENSION_MIN: u32 = 300;

/// Largest viewport dimension offered in the globals bar.
pub const DIMENSION_MAX: u32 = 2000;

/// Step between offered viewport dimensions.
pub const DIMENSION_STEP: u32 = 100;

// ── Limits ──────────────────────────────────────────────────────

/// Smallest viewport dimension accepted from dashboard source.
pub const MIN_VIEWPORT: f64 = 100.0;

/// Smallest accepted viewer scale.
pub const MIN_SCALE: f64 = 0.1;

/// The scroll offset may not get closer than this to the far viewport edge.
pub const SCROLL_MARGIN: f64 = 100.0;

/// Highest z-index selectable in the property bar.
pub const MAX_ZINDEX: i64 = 99;

// ── Interaction ─────────────────────────────────────────────────

/// Two presses closer than this (milliseconds) count as a double click.
pub const CLICK_MS: f64 = 300.0;

/// Window size assumed until the host reports the real one.
pub const DEFAULT_WINDOW: Coords = Coords { x: 1280.0, y: 800.0 };

/// The sidebar cannot be resized narrower than this.
pub const MIN_SIDEBAR_WIDTH: f64 = 350.0;

/// Initial sidebar width, capped by the window width.
pub const DEFAULT_SIDEBAR_WIDTH: f64 = 390.0;

/// An element anchor must sit at least this far inside the rubber band.
pub const SELECTION_SLOP: f64 = 5.0;

/// Ruler legend offset from the element anchor, in pixels.
pub const RULER_LEGEND_DX: f64 = 5.0;

/// Ruler legend offset above the element anchor, in pixels.
pub const RULER_LEGEND_DY: f64 = 15.0;

// ── Messages ────────────────────────────────────────────────────

/// Confirmation shown when leaving an editor with unsaved changes.
pub const DASHBOARD_MODIFIED_CONFIRM: &str = "Dashboard has been modified. Exit editor?";

/// Confirmation shown before deleting every element.
pub const DASHBOARD_CLEAR_CONFIRM: &str = "All dashboard elements will be deleted";

pub const DASHBOARD_CLEARED: &str = "dashboard cleared";
pub const DASHBOARD_SOURCE_SET: &str = "dashboard source set";

/// Viewport sizes offered in the globals bar.
#[must_use]
pub fn dimensions() -> Vec<u32> {
    (DIMENSION_MIN..=DIMENSION_MAX).step_by(DIMENSION_STEP as usize).collect()
}
