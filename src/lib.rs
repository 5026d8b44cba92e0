//! Scale-aware range queries over an immutable map feature store, and a
//! validator proving the spatial index never drops a feature the exhaustive
//! scan finds.
//!
//! ```rust
//! use mapquery::prelude::*;
//!
//! let mut writer = StoreWriter::new(rect(0.0, 0.0, 10.0, 10.0), ScaleRange::new(0, 17)?)?;
//! writer.add_feature(1, &[(0, vec![coord! { x: -1.0, y: 5.0 }, coord! { x: 11.0, y: 5.0 }])])?;
//! let store = FeatureStore::from_bytes(writer.finish())?;
//!
//! let filter = VisibilityFilter::new(StyleTable::new().with_type(1, VisibleRange::new(0, 17)));
//! let index = IndexedSource::build(&store, &filter, &IndexConfig::default())?;
//! let linear = LinearScanSource::new(&store, &filter, index.scale_mapper());
//!
//! let report = RangeQueryValidator::new(&store, &index, &linear)?.run()?;
//! assert!(report.rectangles_checked > 1);
//! # Ok::<(), mapquery::MapQueryError>(())
//! ```

pub mod classify;
pub mod collect;
pub mod compare;
pub mod config;
pub mod error;
pub mod geometry;
pub mod scales;
pub mod source;
pub mod store;
pub mod validate;
pub mod visibility;

pub use error::{MapQueryError, Result};

pub use config::IndexConfig;

pub use classify::{Classifier, StyleTable, VisibleRange};
pub use visibility::VisibilityFilter;

pub use geometry::{RectExt, rect, segments_intersect_rect};
pub use scales::{ScaleMapper, ScaleRange};

pub use store::{DataHeader, Feature, FeatureStore, GeometryLayer, StoreWriter, read_data_header};

pub use source::{FeatureSource, IndexedSource, LinearScanSource};

pub use collect::{CandidateCollector, CandidateEntry, collect_candidates, sort_canonical};
pub use compare::{Comparison, compare_sequences, first_missing};
pub use validate::{RangeQueryValidator, RectCheck, ValidationReport, locate_offsets, validate_store};

pub use geo::{Coord, Rect, coord};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{MapQueryError, Result};

    pub use geo::{Coord, Rect, coord};

    pub use crate::{IndexConfig, StyleTable, VisibilityFilter, VisibleRange};

    pub use crate::{FeatureStore, ScaleRange, StoreWriter, rect};

    pub use crate::{FeatureSource, IndexedSource, LinearScanSource};

    pub use crate::{RangeQueryValidator, ValidationReport, validate_store};
}
