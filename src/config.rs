//! Query engine configuration.
//!
//! ```rust
//! use mapquery::IndexConfig;
//!
//! let json = r#"{
//!     "scale_buckets": [4, 9, 13, 17],
//!     "check_determinism": false
//! }"#;
//! let config = IndexConfig::from_json(json).unwrap();
//! assert_eq!(config.world_size, 360.0);
//! ```

use crate::error::{MapQueryError, Result};
use crate::scales::{ScaleMapper, ScaleRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Inclusive upper bounds of the index's scale buckets, strictly
    /// ascending. Scales above the last bound share the last bucket.
    #[serde(default = "IndexConfig::default_scale_buckets")]
    pub scale_buckets: Vec<u8>,

    /// Extent of the coordinate space a level-0 rectangle spans.
    #[serde(default = "IndexConfig::default_world_size")]
    pub world_size: f64,

    /// Recompute every canonical key and fail if the two renderings differ.
    #[serde(default = "IndexConfig::default_check_determinism")]
    pub check_determinism: bool,
}

impl IndexConfig {
    fn default_scale_buckets() -> Vec<u8> {
        vec![5, 10, 14, 17]
    }

    const fn default_world_size() -> f64 {
        360.0
    }

    const fn default_check_determinism() -> bool {
        true
    }

    pub fn with_scale_buckets(mut self, buckets: Vec<u8>) -> Self {
        self.scale_buckets = buckets;
        self
    }

    pub fn with_world_size(mut self, world_size: f64) -> Self {
        self.world_size = world_size;
        self
    }

    pub fn with_check_determinism(mut self, check: bool) -> Self {
        self.check_determinism = check;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale_buckets.is_empty() {
            return Err(MapQueryError::InvalidInput(
                "At least one scale bucket is required".to_string(),
            ));
        }
        if self.scale_buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MapQueryError::InvalidInput(format!(
                "Scale buckets must be strictly ascending, got: {:?}",
                self.scale_buckets
            )));
        }
        if !self.world_size.is_finite() || self.world_size <= 0.0 {
            return Err(MapQueryError::InvalidInput(format!(
                "World size must be finite and positive, got: {}",
                self.world_size
            )));
        }
        Ok(())
    }

    /// Scale mapper for a dataset with the given scale range.
    pub fn scale_mapper(&self, range: ScaleRange) -> Result<ScaleMapper> {
        ScaleMapper::new(range, self.world_size)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: IndexConfig = toml::from_str(toml_str)
            .map_err(|e| MapQueryError::InvalidInput(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MapQueryError::InvalidInput(format!("Cannot encode TOML: {}", e)))
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            scale_buckets: Self::default_scale_buckets(),
            world_size: Self::default_world_size(),
            check_determinism: Self::default_check_determinism(),
        }
    }
}
