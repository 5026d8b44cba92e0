//! Axis-aligned query rectangles.
//!
//! Query rectangles are plain `geo::Rect<f64>` values; `geo` already keeps
//! `min <= max` on both axes. This module adds the operations the range
//! validator needs on top of that.

use geo::{Rect, coord};

/// Build a rectangle from its corner coordinates.
///
/// Corners may be passed in any order; the result is normalized.
pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect<f64> {
    Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y })
}

pub trait RectExt {
    /// The larger of width and height.
    fn greater_size(&self) -> f64;

    /// Split the rectangle in half across its larger extent.
    ///
    /// The two halves share the pivot line and their union is the original
    /// rectangle. Squares are split along x.
    fn divide_by_greater_size(&self) -> (Rect<f64>, Rect<f64>);

    /// Whether all four coordinates are finite.
    fn is_finite(&self) -> bool;
}

impl RectExt for Rect<f64> {
    fn greater_size(&self) -> f64 {
        self.width().max(self.height())
    }

    fn divide_by_greater_size(&self) -> (Rect<f64>, Rect<f64>) {
        let (min, max) = (self.min(), self.max());
        if self.width() >= self.height() {
            let pivot = (min.x + max.x) / 2.0;
            (
                rect(min.x, min.y, pivot, max.y),
                rect(pivot, min.y, max.x, max.y),
            )
        } else {
            let pivot = (min.y + max.y) / 2.0;
            (
                rect(min.x, min.y, max.x, pivot),
                rect(min.x, pivot, max.x, max.y),
            )
        }
    }

    fn is_finite(&self) -> bool {
        let (min, max) = (self.min(), self.max());
        [min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite())
    }
}
