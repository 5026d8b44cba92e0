//! Query sources: the exhaustive scan and the scale-bucketed index.
//!
//! Both answer the same contract through [`FeatureSource`]: given a query
//! rectangle, call `visit` once per emitted feature, synchronously, in the
//! source's own enumeration order. Callers that need a stable order sort
//! the emitted features themselves.

pub mod indexed;
pub mod linear;

pub use indexed::IndexedSource;
pub use linear::LinearScanSource;

use crate::error::Result;
use crate::geometry::RectExt;
use crate::scales::ScaleMapper;
use crate::store::Feature;
use geo::Rect;

pub trait FeatureSource {
    /// Mapping used to pick the scale of each query.
    fn scale_mapper(&self) -> ScaleMapper;

    /// Address of the visibility filter the source evaluates, if it holds
    /// one. Two sources sharing a filter report the same address.
    fn filter_identity(&self) -> Option<*const ()> {
        None
    }

    /// Emit every candidate feature for `rect`. Stops at the first error
    /// returned by `visit`.
    fn for_each_feature<F>(&self, rect: &Rect<f64>, visit: F) -> Result<()>
    where
        F: FnMut(&Feature) -> Result<()>;
}

/// Scale of a query, or `None` for rectangles that cannot be queried.
pub(crate) fn query_scale(mapper: &ScaleMapper, rect: &Rect<f64>) -> Option<u8> {
    if !rect.is_finite() {
        log::warn!("Rejecting query with non-finite rectangle {:?}", rect);
        return None;
    }
    Some(mapper.level_for(rect))
}
