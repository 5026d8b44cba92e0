//! Planar geometry helpers shared by the query paths.

pub mod intersect;
pub mod rect;

pub use intersect::segments_intersect_rect;
pub use rect::{RectExt, rect};
