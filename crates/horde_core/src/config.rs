//! # Collections Configuration
//!
//! Container sizing loaded once at startup from TOML.
//!
//! ```toml
//! sparse_capacity = 100000
//! ring_capacity = 128
//! cell_size = 24.0
//! promotion_threshold = 16
//! ```
//!
//! Every field is optional and falls back to [`CollectionsConfig::default`].
//! Containers can always be built directly instead; nothing here is global.

use crate::collections::{
    CompactMap, RingBuffer, SparseArray, SpatialHashMap, DEFAULT_PROMOTION_THRESHOLD,
};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Constructor parameters for every container kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionsConfig {
    /// Index range of sparse arrays.
    pub sparse_capacity: usize,
    /// Slots per ring buffer.
    pub ring_capacity: usize,
    /// Spatial grid cell edge length, in world units.
    pub cell_size: f32,
    /// Entry count at which compact maps promote.
    pub promotion_threshold: usize,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            sparse_capacity: 1024,
            ring_capacity: 64,
            cell_size: 16.0,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
        }
    }
}

impl CollectionsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] on malformed TOML or unknown
    /// keys, or the relevant validation error.
    pub fn from_toml_str(source: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| CoreError::InvalidConfig(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        tracing::debug!(?config, "collections config loaded");
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the file cannot be read, plus
    /// everything [`from_toml_str`](Self::from_toml_str) reports.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every parameter.
    ///
    /// A sparse capacity of zero is legal: it yields an array that ignores
    /// every write.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> CoreResult<()> {
        if self.ring_capacity == 0 {
            return Err(CoreError::ZeroCapacity { container: "RingBuffer" });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(CoreError::InvalidCellSize(self.cell_size));
        }
        if self.promotion_threshold == 0 {
            return Err(CoreError::InvalidThreshold(self.promotion_threshold));
        }
        Ok(())
    }

    /// Builds a sparse array over `0..sparse_capacity`.
    #[must_use]
    pub fn sparse_array<T>(&self) -> SparseArray<T> {
        SparseArray::new(self.sparse_capacity)
    }

    /// Builds a ring buffer with `ring_capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if `ring_capacity` is zero.
    pub fn ring_buffer<T>(&self) -> CoreResult<RingBuffer<T>> {
        RingBuffer::try_new(self.ring_capacity)
    }

    /// Builds a spatial hash map with `cell_size` cells.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCellSize`] for a non-positive or
    /// non-finite cell size.
    pub fn spatial_hash<T>(&self) -> CoreResult<SpatialHashMap<T>> {
        SpatialHashMap::try_new(self.cell_size)
    }

    /// Builds a compact map promoting at `promotion_threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidThreshold`] if the threshold is zero.
    pub fn compact_map<K, V>(&self) -> CoreResult<CompactMap<K, V>> {
        CompactMap::try_with_threshold(self.promotion_threshold)
    }
}
