//! Scale-bucketed R-tree index over a feature store.
//!
//! Features are grouped into scale buckets by the scale at which their
//! geometry first appears, and each bucket holds an R-tree of feature
//! envelopes. A query at scale `s` only visits buckets starting at or below
//! `s`, and within each bucket only features whose envelope intersects the
//! query rectangle.
//!
//! ## Conservative results
//!
//! The envelope of a feature covers every geometry layer, so it contains the
//! geometry at any scale. A feature whose geometry at `s` touches the query
//! rectangle therefore always has an intersecting envelope, and its bucket
//! always starts at or below `s`. The index never drops such a feature; it
//! may emit features whose envelope overlaps the rectangle while their
//! geometry does not.

use crate::classify::Classifier;
use crate::config::IndexConfig;
use crate::error::Result;
use crate::scales::{ScaleMapper, ScaleRange};
use crate::source::{FeatureSource, query_scale};
use crate::store::{Feature, FeatureStore};
use crate::visibility::VisibilityFilter;
use geo::Rect;
use rstar::{AABB, RTree, RTreeObject};
use smallvec::SmallVec;

/// Envelope of one feature, pointing back into the store.
#[derive(Debug, Clone, PartialEq)]
struct IndexedFeature {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

#[derive(Debug)]
struct ScaleBucket {
    lower: u8,
    upper: u8,
    tree: RTree<IndexedFeature>,
}

fn to_aabb(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Split the dataset's scale range at the configured bucket bounds.
fn bucket_bounds(config: &[u8], range: ScaleRange) -> SmallVec<[(u8, u8); 4]> {
    let mut bounds = SmallVec::new();
    let mut lower = range.lower;
    for &upper in config
        .iter()
        .filter(|&&upper| upper >= range.lower && upper < range.upper)
    {
        bounds.push((lower, upper));
        lower = upper + 1;
    }
    bounds.push((lower, range.upper));
    bounds
}

/// Bucket holding features that first appear at `scale`.
fn bucket_index(bounds: &[(u8, u8)], scale: u8) -> usize {
    bounds
        .iter()
        .position(|&(_, upper)| scale <= upper)
        .unwrap_or(bounds.len().saturating_sub(1))
}

/// Spatial index answering rectangle queries with a superset of the
/// exhaustive scan's result.
#[derive(Debug)]
pub struct IndexedSource<'a, C> {
    store: &'a FeatureStore,
    filter: &'a VisibilityFilter<C>,
    mapper: ScaleMapper,
    buckets: SmallVec<[ScaleBucket; 4]>,
}

impl<'a, C: Classifier> IndexedSource<'a, C> {
    /// Bulk-load the index for `store`.
    ///
    /// Features without geometry, or whose geometry only appears beyond the
    /// dataset's finest scale, are left out: no query can draw them.
    pub fn build(
        store: &'a FeatureStore,
        filter: &'a VisibilityFilter<C>,
        config: &IndexConfig,
    ) -> Result<Self> {
        config.validate()?;
        let range = store.header().scale_range();
        let mapper = config.scale_mapper(range)?;
        let bounds = bucket_bounds(&config.scale_buckets, range);

        let mut entries: SmallVec<[Vec<IndexedFeature>; 4]> =
            bounds.iter().map(|_| Vec::new()).collect();
        let mut skipped = 0usize;

        for (slot, feature) in store.features().iter().enumerate() {
            let (Some(first_scale), Some(envelope)) = (feature.first_scale(), feature.envelope())
            else {
                skipped += 1;
                continue;
            };
            if first_scale > range.upper {
                skipped += 1;
                continue;
            }
            entries[bucket_index(&bounds, first_scale)].push(IndexedFeature {
                slot,
                envelope: to_aabb(&envelope),
            });
        }

        let buckets: SmallVec<[ScaleBucket; 4]> = bounds
            .into_iter()
            .zip(entries)
            .map(|((lower, upper), items)| ScaleBucket {
                lower,
                upper,
                tree: RTree::bulk_load(items),
            })
            .collect();

        log::info!(
            "Built scale index: {} features in {} buckets, {} without drawable geometry",
            buckets.iter().map(|b| b.tree.size()).sum::<usize>(),
            buckets.len(),
            skipped
        );
        for bucket in &buckets {
            log::debug!(
                "  scales {}..={}: {} features",
                bucket.lower,
                bucket.upper,
                bucket.tree.size()
            );
        }

        Ok(Self {
            store,
            filter,
            mapper,
            buckets,
        })
    }

    /// Number of indexed features across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.tree.size()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(lower, upper, feature count)` for each bucket, coarsest first.
    pub fn bucket_sizes(&self) -> Vec<(u8, u8, usize)> {
        self.buckets
            .iter()
            .map(|b| (b.lower, b.upper, b.tree.size()))
            .collect()
    }
}

impl<C: Classifier> FeatureSource for IndexedSource<'_, C> {
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

        let envelope = to_aabb(rect);
        let features = self.store.features();

        for bucket in self.buckets.iter().take_while(|b| b.lower <= scale) {
            for entry in bucket.tree.locate_in_envelope_intersecting(&envelope) {
                let feature = &features[entry.slot];
                if self.filter.is_drawable(feature, scale) {
                    visit(feature)?;
                }
            }
        }
        Ok(())
    }
}
