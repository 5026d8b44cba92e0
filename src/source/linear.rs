//! Exhaustive scan over the whole store; the ground truth for validation.

use crate::error::Result;
use crate::geometry::segments_intersect_rect;
use crate::classify::Classifier;
use crate::scales::ScaleMapper;
use crate::source::{FeatureSource, query_scale};
use crate::store::{Feature, FeatureStore};
use crate::visibility::VisibilityFilter;
use geo::Rect;

/// Visits every record in storage order and emits the drawable ones whose
/// geometry at the query scale touches the query rectangle.
///
/// Cost is linear in the store size for every query.
#[derive(Debug)]
pub struct LinearScanSource<'a, C> {
    store: &'a FeatureStore,
    filter: &'a VisibilityFilter<C>,
    mapper: ScaleMapper,
}

impl<'a, C: Classifier> LinearScanSource<'a, C> {
    pub fn new(store: &'a FeatureStore, filter: &'a VisibilityFilter<C>, mapper: ScaleMapper) -> Self {
        Self {
            store,
            filter,
            mapper,
        }
    }

    fn emits(&self, feature: &Feature, rect: &Rect<f64>, scale: u8) -> bool {
        if !self.filter.is_drawable(feature, scale) {
            return false;
        }
        feature
            .resolve_at_scale(scale)
            .is_some_and(|points| segments_intersect_rect(rect, &points))
    }
}

impl<C: Classifier> FeatureSource for LinearScanSource<'_, C> {
    fn scale_mapper(&self) -> ScaleMapper {
        self.mapper
    }

    fn filter_identity(&self) -> Option<*const ()> {
        Some(std::ptr::from_ref(self.filter).cast())
    }

    fn for_each_feature<F>(&self, rect: &Rect<f64>, mut visit: F) -> Result<()>
    where
        F: FnMut(&Feature) -> Result<()>,
    {
        let Some(scale) = query_scale(&self.mapper, rect) else {
            return Ok(());
        };

        self.store.for_each_raw(|feature, _offset| {
            if self.emits(feature, rect, scale) {
                visit(feature)?;
            }
            Ok(())
        })
    }
}
