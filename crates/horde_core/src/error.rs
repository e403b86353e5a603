//! # Core Error Types
//!
//! Container operations never fail. Only construction and configuration
//! loading can be rejected.

use thiserror::Error;

/// Errors raised while building containers or loading their configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A fixed-capacity container was asked for zero slots.
    #[error("{container} capacity must be greater than zero")]
    ZeroCapacity {
        /// Name of the container being built.
        container: &'static str,
    },

    /// Spatial grid cell size was not a finite, positive number.
    #[error("invalid cell size: {0} (must be finite and > 0)")]
    InvalidCellSize(f32),

    /// Compact map promotion threshold of zero.
    #[error("invalid promotion threshold: {0} (must be > 0)")]
    InvalidThreshold(usize),

    /// Invalid or unreadable configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for container construction.
pub type CoreResult<T> = Result<T, CoreError>;
