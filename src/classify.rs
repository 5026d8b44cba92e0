//! Classification oracle deciding which feature types are drawn at a scale.
//!
//! The oracle is loaded once, before any query runs, from a style table:
//!
//! ```rust
//! use mapquery::{Classifier, StyleTable};
//!
//! let json = r#"{
//!     "types": {
//!         "1": { "min_scale": 0, "max_scale": 17 },
//!         "2": { "min_scale": 12, "max_scale": 17 }
//!     }
//! }"#;
//! let styles = StyleTable::from_json(json).unwrap();
//! assert!(styles.is_drawable(1, 3));
//! assert!(!styles.is_drawable(2, 11));
//! assert!(!styles.is_drawable(99, 11));
//! ```

use crate::error::{MapQueryError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-type drawability verdicts.
pub trait Classifier {
    fn is_drawable(&self, type_id: u32, scale: u8) -> bool;
}

impl<F> Classifier for F
where
    F: Fn(u32, u8) -> bool,
{
    fn is_drawable(&self, type_id: u32, scale: u8) -> bool {
        self(type_id, scale)
    }
}

/// Inclusive scale range in which a type is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub min_scale: u8,
    pub max_scale: u8,
}

impl VisibleRange {
    pub fn new(min_scale: u8, max_scale: u8) -> Self {
        Self {
            min_scale,
            max_scale,
        }
    }

    pub fn contains(&self, scale: u8) -> bool {
        (self.min_scale..=self.max_scale).contains(&scale)
    }
}

/// Style table mapping type ids to their visible scale ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    #[serde(default)]
    types: FxHashMap<u32, VisibleRange>,

    /// Range used for types missing from `types`; `None` hides them.
    #[serde(default)]
    default: Option<VisibleRange>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, type_id: u32, range: VisibleRange) -> Self {
        self.types.insert(type_id, range);
        self
    }

    pub fn with_default(mut self, range: VisibleRange) -> Self {
        self.default = Some(range);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn range_for(&self, type_id: u32) -> Option<VisibleRange> {
        self.types.get(&type_id).copied().or(self.default)
    }

    pub fn validate(&self) -> Result<()> {
        let inverted = self
            .types
            .iter()
            .map(|(id, range)| (Some(*id), range))
            .chain(self.default.iter().map(|range| (None, range)))
            .find(|(_, range)| range.min_scale > range.max_scale);

        match inverted {
            Some((Some(id), range)) => Err(MapQueryError::InvalidInput(format!(
                "Style for type {} has min_scale {} above max_scale {}",
                id, range.min_scale, range.max_scale
            ))),
            Some((None, range)) => Err(MapQueryError::InvalidInput(format!(
                "Default style has min_scale {} above max_scale {}",
                range.min_scale, range.max_scale
            ))),
            None => Ok(()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let table: StyleTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON style table from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json(&content)?;
        log::info!(
            "Loaded {} feature type styles from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }
}

impl Classifier for StyleTable {
    fn is_drawable(&self, type_id: u32, scale: u8) -> bool {
        self.range_for(type_id)
            .is_some_and(|range| range.contains(scale))
    }
}
