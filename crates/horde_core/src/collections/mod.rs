//! # Collections
//!
//! Four independent containers for large simulations.
//!
//! ## Design Philosophy
//!
//! - Each instance owns exactly one lock; instances never contend
//! - Every operation is total: bad input degrades to a no-op or a miss
//! - No background work, no I/O, no global state
//!
//! | Container | Lock | Typical use |
//! |---|---|---|
//! | [`SparseArray`] | `RwLock` | mostly-default per-slot attributes |
//! | [`RingBuffer`] | `Mutex` | last N samples or events |
//! | [`SpatialHashMap`] | `RwLock` | proximity / range queries |
//! | [`CompactMap`] | `Mutex` | small per-entity component sets |

mod compact_map;
mod ring_buffer;
mod sparse_array;
mod spatial_hash;

pub use compact_map::{CompactMap, DEFAULT_PROMOTION_THRESHOLD};
pub use ring_buffer::RingBuffer;
pub use sparse_array::SparseArray;
pub use spatial_hash::SpatialHashMap;

// Compile-time assertion: containers of thread-safe values are shareable.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SparseArray<u64>>();
    assert::<RingBuffer<u64>>();
    assert::<SpatialHashMap<u64>>();
    assert::<CompactMap<u64, u64>>();
};
