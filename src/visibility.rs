//! The single drawability predicate shared by every query path.
//!
//! Both the indexed and the exhaustive source hold a reference to the same
//! [`VisibilityFilter`]; neither evaluates drawability on its own.

use crate::classify::Classifier;
use crate::store::Feature;

#[derive(Debug, Clone)]
pub struct VisibilityFilter<C> {
    classifier: C,
}

impl<C: Classifier> VisibilityFilter<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// A feature is drawable at `scale` when it has geometry there and its
    /// type is styled for that scale.
    pub fn is_drawable(&self, feature: &Feature, scale: u8) -> bool {
        feature.has_geometry_at(scale) && self.classifier.is_drawable(feature.type_id(), scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{StyleTable, VisibleRange};
    use crate::geometry::rect;
    use crate::scales::ScaleRange;
    use crate::store::{FeatureStore, StoreWriter};
    use geo::coord;

    fn store() -> FeatureStore {
        let mut w = StoreWriter::new(
            rect(0.0, 0.0, 10.0, 10.0),
            ScaleRange::new(0, 17).unwrap(),
        )
        .unwrap();
        let line = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }];
        w.add_feature(1, &[(6, line.clone())]).unwrap();
        w.add_feature(2, &[(0, line)]).unwrap();
        FeatureStore::from_bytes(w.finish()).unwrap()
    }

    #[test]
    fn test_requires_geometry() {
        let store = store();
        let filter = VisibilityFilter::new(|_: u32, _: u8| true);
        let road = store.iter().next().unwrap();
        assert!(!filter.is_drawable(road, 5));
        assert!(filter.is_drawable(road, 6));
    }

    #[test]
    fn test_requires_style() {
        let store = store();
        let styles = StyleTable::new().with_type(2, VisibleRange::new(3, 8));
        let filter = VisibilityFilter::new(styles);
        let features: Vec<_> = store.iter().collect();

        assert!(!filter.is_drawable(features[0], 7));
        assert!(!filter.is_drawable(features[1], 2));
        assert!(filter.is_drawable(features[1], 3));
        assert!(!filter.is_drawable(features[1], 9));
    }
}
