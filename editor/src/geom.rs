//! Dashboard geometry: coordinates, rubber-band rectangles and grid snapping.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point or a size in dashboard pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift this point by `(dx, dy)`.
    #[must_use]
    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta(self, other: Coords) -> Coords {
        Coords { x: self.x - other.x, y: self.y - other.y }
    }
}

/// Axis-aligned rectangle spanned by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Normalize two arbitrary corners into a rectangle.
    #[must_use]
    pub fn from_corners(a: Coords, b: Coords) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Map all four edges through `f`, recomputing width and height.
    #[must_use]
    pub fn map(self, f: impl Fn(Coords) -> Coords) -> Self {
        Self::from_corners(f(Coords::new(self.left, self.top)), f(Coords::new(self.right, self.bottom)))
    }

    /// Rubber-band rule: the anchor must be inside, with `slop` pixels to
    /// spare on the right and bottom edges.
    #[must_use]
    pub fn contains_anchor(&self, p: Coords, slop: f64) -> bool {
        p.x >= self.left && p.x + slop <= self.right && p.y >= self.top && p.y + slop <= self.bottom
    }
}

/// Round `v` to the nearest multiple of `grid`.
#[must_use]
pub fn snap(v: f64, grid: u32) -> f64 {
    if grid == 0 {
        return v;
    }
    let g = f64::from(grid);
    (v / g).round() * g
}

/// Round `v` down to a multiple of `grid`.
#[must_use]
pub fn floor_to_grid(v: f64, grid: u32) -> f64 {
    if grid == 0 {
        return v;
    }
    let g = f64::from(grid);
    (v / g).floor() * g
}

/// Snap both components of `p` to the grid.
#[must_use]
pub fn snap_coords(p: Coords, grid: u32) -> Coords {
    Coords::new(snap(p.x, grid), snap(p.y, grid))
}

/// Keep an element of `size` anchored at `pos` inside `viewport`.
///
/// The far edge is clipped first, then the anchor is clamped to zero, so an
/// element larger than the viewport ends up at the origin.
#[must_use]
pub fn clip_to_viewport(pos: Coords, size: Coords, viewport: Coords) -> Coords {
    let mut out = pos;
    if out.x + size.x > viewport.x {
        out.x = viewport.x - size.x;
    }
    if out.y + size.y > viewport.y {
        out.y = viewport.y - size.y;
    }
    if out.x < 0.0 {
        out.x = 0.0;
    }
    if out.y < 0.0 {
        out.y = 0.0;
    }
    out
}
