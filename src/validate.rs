//! Range query validation.
//!
//! Starting from the dataset's bounding rectangle, every rectangle is queried
//! through both sources and the indexed result is checked to be a superset
//! of the exhaustive one. Rectangles with a non-empty exhaustive result are
//! split across their greater side and checked again, until either the
//! result empties or the finest scale is reached.
//!
//! ```rust,no_run
//! use mapquery::{IndexConfig, StyleTable, validate_store};
//!
//! let styles = StyleTable::from_path("styles.json")?;
//! let report = validate_store("world.mqfs", styles, &IndexConfig::default())?;
//! println!("{} rectangles checked", report.rectangles_checked);
//! # Ok::<(), mapquery::MapQueryError>(())
//! ```

use crate::classify::Classifier;
use crate::collect::collect_candidates;
use crate::compare::{Comparison, compare_sequences, first_missing};
use crate::config::IndexConfig;
use crate::error::{MapQueryError, Result};
use crate::geometry::RectExt;
use crate::scales::ScaleMapper;
use crate::source::{FeatureSource, IndexedSource, LinearScanSource};
use crate::store::FeatureStore;
use crate::visibility::VisibilityFilter;
use geo::Rect;
use serde::Serialize;
use std::path::Path;

/// Totals of a completed validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub rectangles_checked: usize,
    pub subdivisions: usize,
    /// Deepest subdivision level reached; the dataset bounds are depth 0.
    pub max_depth: usize,
    /// Finest scale any checked rectangle mapped to.
    pub finest_scale: Option<u8>,
    pub etalon_entries: usize,
    pub indexed_entries: usize,
    /// Indexed entries beyond the exhaustive result (false positives).
    pub tolerated_extra: usize,
}

impl ValidationReport {
    fn record(&mut self, check: &RectCheck, depth: usize) {
        self.rectangles_checked += 1;
        self.max_depth = self.max_depth.max(depth);
        self.finest_scale = Some(self.finest_scale.map_or(check.scale, |s| s.max(check.scale)));
        self.etalon_entries += check.etalon;
        self.indexed_entries += check.indexed;
        self.tolerated_extra += check.indexed.saturating_sub(check.etalon);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of a single passing rectangle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectCheck {
    pub scale: u8,
    pub etalon: usize,
    pub indexed: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingRect {
    rect: Rect<f64>,
    depth: usize,
}

/// Checks an indexed source against an exhaustive one over a whole store.
#[derive(Debug)]
pub struct RangeQueryValidator<'a, I, E> {
    store: &'a FeatureStore,
    indexed: &'a I,
    etalon: &'a E,
    mapper: ScaleMapper,
    check_determinism: bool,
}

impl<'a, I: FeatureSource, E: FeatureSource> RangeQueryValidator<'a, I, E> {
    /// Both sources must map rectangles to scales identically and, when
    /// both report one, evaluate the same [`VisibilityFilter`] instance.
    ///
    /// Filters over zero-sized classifiers (such as capture-free closures)
    /// have no distinct address, so a mismatch between two of them is not
    /// detected here; [`validate_store`] always shares a single filter.
    pub fn new(store: &'a FeatureStore, indexed: &'a I, etalon: &'a E) -> Result<Self> {
        let mapper = etalon.scale_mapper();
        if indexed.scale_mapper() != mapper {
            return Err(MapQueryError::InvalidInput(format!(
                "Sources use different scale mappings: {:?} vs {:?}",
                indexed.scale_mapper(),
                mapper
            )));
        }
        if let (Some(a), Some(b)) = (indexed.filter_identity(), etalon.filter_identity())
            && a != b
        {
            return Err(MapQueryError::InvalidInput(
                "Sources evaluate different visibility filters".to_string(),
            ));
        }
        Ok(Self {
            store,
            indexed,
            etalon,
            mapper,
            check_determinism: true,
        })
    }

    pub fn with_check_determinism(mut self, check: bool) -> Self {
        self.check_determinism = check;
        self
    }

    /// Query `rect` through both sources and compare the results.
    pub fn check_rect(&self, rect: &Rect<f64>) -> Result<RectCheck> {
        let scale = self.mapper.level_for(rect);
        let etalon = collect_candidates(self.etalon, rect, self.check_determinism)?;
        let indexed = collect_candidates(self.indexed, rect, self.check_determinism)?;

        let missing = match compare_sequences(&etalon, &indexed) {
            Comparison::Superset { .. } => None,
            Comparison::Missing { index } => Some(index),
            Comparison::TooShort => Some(first_missing(&etalon, &indexed).unwrap_or(0)),
        };

        if let Some(index) = missing {
            let key = etalon[index].key.clone();
            log::error!(
                "Superset check failed for {:?} at scale {}: etalon size = {}, index size = {}",
                rect,
                scale,
                etalon.len(),
                indexed.len()
            );
            let offsets = locate_offsets(self.store, scale, &key);
            return Err(MapQueryError::SupersetViolation {
                rect: *rect,
                scale,
                expected: etalon.len(),
                actual: indexed.len(),
                missing_key: key,
                offset: offsets.first().copied(),
            });
        }

        log::debug!(
            "{:?} at scale {}: {} etalon, {} indexed",
            rect,
            scale,
            etalon.len(),
            indexed.len()
        );
        Ok(RectCheck {
            scale,
            etalon: etalon.len(),
            indexed: indexed.len(),
        })
    }

    /// Validate every rectangle reachable from the store's bounds.
    pub fn run(&self) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        let mut pending = vec![PendingRect {
            rect: self.store.header().bounds(),
            depth: 0,
        }];

        while let Some(PendingRect { rect, depth }) = pending.pop() {
            let check = self.check_rect(&rect)?;
            report.record(&check, depth);

            if check.etalon > 0 && check.scale < self.mapper.upper_bound() {
                let (first, second) = rect.divide_by_greater_size();
                pending.push(PendingRect {
                    rect: second,
                    depth: depth + 1,
                });
                pending.push(PendingRect {
                    rect: first,
                    depth: depth + 1,
                });
                report.subdivisions += 1;
            }
        }

        log::info!(
            "Validated {} rectangles (max depth {}, {} etalon entries, {} tolerated extra)",
            report.rectangles_checked,
            report.max_depth,
            report.etalon_entries,
            report.tolerated_extra
        );
        Ok(report)
    }
}

/// Storage offsets of every feature whose canonical key at `scale` is `key`.
pub fn locate_offsets(store: &FeatureStore, scale: u8, key: &str) -> Vec<u64> {
    let mut offsets = Vec::new();
    for feature in store.iter() {
        if feature.canonical_key(scale) == key {
            log::error!("Missing feature at offset {}: {}", feature.offset(), key);
            offsets.push(feature.offset());
        }
    }
    offsets
}

/// Open the store at `path` and validate its index end to end.
pub fn validate_store<P, C>(path: P, classifier: C, config: &IndexConfig) -> Result<ValidationReport>
where
    P: AsRef<Path>,
    C: Classifier,
{
    config.validate()?;
    let store = FeatureStore::open(path)?;
    let filter = VisibilityFilter::new(classifier);
    let indexed = IndexedSource::build(&store, &filter, config)?;
    let linear = LinearScanSource::new(&store, &filter, indexed.scale_mapper());

    RangeQueryValidator::new(&store, &indexed, &linear)?
        .with_check_determinism(config.check_determinism)
        .run()
}
