//! Error types for store access, querying and index validation.

use geo::Rect;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapQueryError>;

#[derive(Error, Debug)]
pub enum MapQueryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store header could not be parsed. `size` is the number of bytes
    /// consumed before the failure; zero or less means nothing was readable.
    #[error("Failed to read data header ({size} bytes read): {reason}")]
    HeaderRead { size: i64, reason: String },

    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Index missed a feature in rect {rect:?} at scale {scale}: etalon size = {expected}, index size = {actual}, missing = {missing_key:?}, offset = {offset:?}"
    )]
    SupersetViolation {
        rect: Rect<f64>,
        scale: u8,
        expected: usize,
        actual: usize,
        missing_key: String,
        offset: Option<u64>,
    },

    #[error("Canonical key of feature at offset {offset} is not stable at scale {scale}")]
    DeterminismViolation { offset: u64, scale: u8 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
