//! Exact rectangle / polyline intersection.

use geo::{Coord, Intersects, Line, Rect};

/// Whether any segment of the open polyline `points` touches `rect`.
///
/// Consecutive points form the segments `(p0, p1), (p1, p2), ...`; the
/// polyline is not closed. Fewer than two points means there is no segment,
/// so the result is always `false`. Boundary contact counts as intersection.
pub fn segments_intersect_rect(rect: &Rect<f64>, points: &[Coord<f64>]) -> bool {
    points
        .windows(2)
        .any(|pair| rect.intersects(&Line::new(pair[0], pair[1])))
}
