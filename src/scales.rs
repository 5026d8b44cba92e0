//! Mapping between rectangle sizes and zoom levels.
//!
//! The scale level of a rectangle is `round(log2(world_size / greater_size))`,
//! clamped into the dataset's scale range. Halving the rectangle's greater
//! side therefore raises the level by one; doubling it lowers it by one.

use crate::error::{MapQueryError, Result};
use crate::geometry::RectExt;
use geo::Rect;
use serde::{Deserialize, Serialize};

/// Inclusive range of scale levels a dataset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub lower: u8,
    pub upper: u8,
}

impl ScaleRange {
    pub fn new(lower: u8, upper: u8) -> Result<Self> {
        if lower > upper {
            return Err(MapQueryError::InvalidInput(format!(
                "Scale range lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, scale: u8) -> bool {
        (self.lower..=self.upper).contains(&scale)
    }

    pub fn clamp(&self, scale: u8) -> u8 {
        scale.clamp(self.lower, self.upper)
    }
}

/// Pure rectangle-to-scale mapping shared by every query path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMapper {
    range: ScaleRange,
    world_size: f64,
}

impl ScaleMapper {
    pub fn new(range: ScaleRange, world_size: f64) -> Result<Self> {
        if !world_size.is_finite() || world_size <= 0.0 {
            return Err(MapQueryError::InvalidInput(format!(
                "World size must be finite and positive, got: {}",
                world_size
            )));
        }
        Ok(Self { range, world_size })
    }

    pub fn range(&self) -> ScaleRange {
        self.range
    }

    /// Finest scale level of the dataset.
    pub fn upper_bound(&self) -> u8 {
        self.range.upper
    }

    /// Coarsest scale level of the dataset.
    pub fn lower_bound(&self) -> u8 {
        self.range.lower
    }

    /// Scale level for a query rectangle.
    ///
    /// Degenerate rectangles (zero extent) map to the finest level, and
    /// non-finite ones to the coarsest.
    pub fn level_for(&self, rect: &Rect<f64>) -> u8 {
        let size = rect.greater_size();
        if !size.is_finite() {
            return self.range.lower;
        }
        if size <= 0.0 {
            return self.range.upper;
        }

        let level = (self.world_size / size).log2().round();
        if level <= f64::from(self.range.lower) {
            self.range.lower
        } else if level >= f64::from(self.range.upper) {
            self.range.upper
        } else {
            level as u8
        }
    }
}
