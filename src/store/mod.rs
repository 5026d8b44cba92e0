//! Compact binary feature store.
//!
//! A store is a [`DataHeader`] followed by length-prefixed feature records,
//! all big-endian. The byte position of a record is the feature's identity.

pub mod feature;
pub mod header;
pub mod reader;
pub mod writer;

pub use feature::{Feature, GeometryLayer};
pub use header::{DataHeader, FORMAT_VERSION, HEADER_LEN, read_data_header};
pub use reader::FeatureStore;
pub use writer::StoreWriter;
