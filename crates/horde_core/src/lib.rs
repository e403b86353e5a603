//! # HORDE Core
//!
//! Concurrency-safe, memory-efficient containers for simulations tracking
//! 10,000+ entities with minimal allocations.
//!
//! ## Containers
//!
//! 1. **[`SparseArray`]** - fixed index range, only non-default slots stored
//! 2. **[`RingBuffer`]** - fixed-capacity history, overwrites the oldest
//! 3. **[`SpatialHashMap`]** - uniform 3D grid with range queries
//! 4. **[`CompactMap`]** - linear array that promotes once to a hash table
//!
//! The containers are independent; a simulation composes them. Each guards
//! its own state, so cross-container consistency is the caller's job.
//!
//! ## Example
//!
//! ```rust
//! use horde_core::{CompactMap, RingBuffer, SpatialHashMap};
//!
//! let positions: SpatialHashMap<u32> = SpatialHashMap::new(8.0);
//! let effects: CompactMap<u32, f32> = CompactMap::new();
//! let events: RingBuffer<(u32, u32)> = RingBuffer::new(256);
//!
//! positions.insert(1.0, 0.0, 2.0, 42);
//! for id in positions.query_radius(0.0, 0.0, 0.0, 4.0) {
//!     effects.set(id, 0.5);
//!     events.push((id, 1));
//! }
//! assert_eq!(effects.get(&42), Some(0.5));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collections;
pub mod config;
pub mod error;

pub use collections::{
    CompactMap, RingBuffer, SparseArray, SpatialHashMap, DEFAULT_PROMOTION_THRESHOLD,
};
pub use config::CollectionsConfig;
pub use error::{CoreError, CoreResult};
