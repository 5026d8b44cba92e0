//! Candidate collection and canonical ordering.

use crate::error::{MapQueryError, Result};
use crate::source::FeatureSource;
use crate::store::Feature;
use geo::Rect;
use std::cmp::Ordering;

/// A feature emitted by a source, paired with its canonical key at the
/// query scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    pub feature: Feature,
    pub key: String,
}

impl CandidateEntry {
    /// Ordering by canonical key alone. Sorting and sequence comparison both
    /// go through this function.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Stable sort by canonical key.
pub fn sort_canonical(entries: &mut [CandidateEntry]) {
    entries.sort_by(CandidateEntry::canonical_cmp);
}

/// Accumulates the features one query emits.
#[derive(Debug)]
pub struct CandidateCollector {
    scale: u8,
    check_determinism: bool,
    entries: Vec<CandidateEntry>,
}

impl CandidateCollector {
    pub fn new(scale: u8) -> Self {
        Self {
            scale,
            check_determinism: true,
            entries: Vec::new(),
        }
    }

    pub fn with_check_determinism(mut self, check: bool) -> Self {
        self.check_determinism = check;
        self
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `feature` with its canonical key at the collector's scale.
    ///
    /// With the determinism check on, the key is rendered twice and a
    /// mismatch fails with [`MapQueryError::DeterminismViolation`]. The
    /// store-backed resolver is pure, so this only trips if geometry
    /// resolution ever starts depending on mutable state.
    pub fn add(&mut self, feature: &Feature) -> Result<()> {
        let key = feature.canonical_key(self.scale);
        if self.check_determinism && key != feature.canonical_key(self.scale) {
            return Err(MapQueryError::DeterminismViolation {
                offset: feature.offset(),
                scale: self.scale,
            });
        }
        self.entries.push(CandidateEntry {
            feature: feature.clone(),
            key,
        });
        Ok(())
    }

    pub fn into_sorted(mut self) -> Vec<CandidateEntry> {
        sort_canonical(&mut self.entries);
        self.entries
    }
}

/// Run one query against `source` and return its canonically sorted result.
pub fn collect_candidates<S: FeatureSource>(
    source: &S,
    rect: &Rect<f64>,
    check_determinism: bool,
) -> Result<Vec<CandidateEntry>> {
    let scale = source.scale_mapper().level_for(rect);
    let mut collector = CandidateCollector::new(scale).with_check_determinism(check_determinism);
    source.for_each_feature(rect, |feature| collector.add(feature))?;
    Ok(collector.into_sorted())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rect;
    use crate::scales::ScaleRange;
    use crate::source::LinearScanSource;
    use crate::store::{FeatureStore, StoreWriter};
    use crate::visibility::VisibilityFilter;
    use geo::coord;

    fn store() -> FeatureStore {
        let mut w = StoreWriter::new(
            rect(0.0, 0.0, 10.0, 10.0),
            ScaleRange::new(0, 17).unwrap(),
        )
        .unwrap();
        for (type_id, x) in [(9, 1.0), (3, 2.0), (3, 1.0), (9, 1.0)] {
            w.add_feature(
                type_id,
                &[(0, vec![coord! { x: x, y: 0.0 }, coord! { x: x, y: 10.0 }])],
            )
            .unwrap();
        }
        FeatureStore::from_bytes(w.finish()).unwrap()
    }

    #[test]
    fn test_entries_sorted_by_key() {
        let store = store();
        let mut collector = CandidateCollector::new(5);
        for feature in store.iter() {
            collector.add(feature).unwrap();
        }
        assert_eq!(collector.len(), 4);

        let keys: Vec<String> = collector.into_sorted().into_iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                "type=3 [(1 0), (1 10)]",
                "type=3 [(2 0), (2 10)]",
                "type=9 [(1 0), (1 10)]",
                "type=9 [(1 0), (1 10)]",
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let store = store();
        let mut collector = CandidateCollector::new(5);
        for feature in store.iter() {
            collector.add(feature).unwrap();
        }
        let sorted = collector.into_sorted();
        assert!(sorted[2].feature.offset() < sorted[3].feature.offset());
    }

    #[test]
    fn test_checked_keys_stable_at_every_scale() {
        let store = store();
        for scale in 0..=17 {
            let mut collector = CandidateCollector::new(scale);
            for feature in store.iter() {
                collector.add(feature).unwrap();
            }
            assert_eq!(collector.scale(), scale);
            assert_eq!(collector.len(), store.len());
        }
    }

    #[test]
    fn test_collect_candidates_from_source() {
        let store = store();
        let filter = VisibilityFilter::new(|type_id: u32, _: u8| type_id == 3);
        let mapper = crate::scales::ScaleMapper::new(store.header().scale_range(), 360.0).unwrap();
        let source = LinearScanSource::new(&store, &filter, mapper);

        let entries = collect_candidates(&source, &rect(0.0, 0.0, 10.0, 10.0), true).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.feature.type_id() == 3));
        assert!(entries[0].canonical_cmp(&entries[1]).is_lt());
    }
}
