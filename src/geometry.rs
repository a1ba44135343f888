//! Geometry primitives in CSS pixel space.
//!
//! Everything the controller measures comes from the page's layout viewport,
//! so coordinates are fractional `f64` values with the origin at the
//! top-left of the viewport.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A rectangle in `{ left, top, width, height }` form.
///
/// This is the shape the service boundary expects for bounding boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a normalized rectangle spanning two arbitrary corners.
    pub fn from_points(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self {
            left,
            top,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// The full viewport as a rectangle anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle (exclusive of right/bottom edges)
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Clip the rectangle to `[0, size]` on both axes.
    pub fn clamp_to(&self, size: Size) -> Self {
        let left = self.left.clamp(0.0, size.width);
        let top = self.top.clamp(0.0, size.height);
        let right = self.right().clamp(0.0, size.width);
        let bottom = self.bottom().clamp(0.0, size.height);
        Self {
            left,
            top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }

    /// Center plus four corners moved `inset` pixels toward the center.
    ///
    /// The inset shrinks for small boxes so the corner points never cross
    /// the center.
    pub fn probe_points(&self, inset: f64) -> [Point; 5] {
        let dx = inset.min(self.width / 4.0).max(0.0);
        let dy = inset.min(self.height / 4.0).max(0.0);
        [
            self.center(),
            Point::new(self.left + dx, self.top + dy),
            Point::new(self.right() - dx, self.top + dy),
            Point::new(self.left + dx, self.bottom() - dy),
            Point::new(self.right() - dx, self.bottom() - dy),
        ]
    }
}
