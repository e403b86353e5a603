//! # Sparse Array
//!
//! Fixed-range array that only materializes non-default slots.
//!
//! The zero value of `T` is `T::default()`. Writing it to a slot removes the
//! slot, so memory stays proportional to occupancy rather than capacity:
//! - 100k potential slots with 1% occupancy costs ~1k entries
//! - Access is average-case O(1)
//! - Out-of-range indices are silent no-ops / default reads

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Largest initial reservation taken from the capacity hint.
const MAX_INITIAL_RESERVE: usize = 1024;

/// A sparse, zero-elided array over `0..capacity`.
///
/// # Thread Safety
///
/// Guarded by a reader/writer lock. Concurrent reads proceed in parallel;
/// writes are exclusive. Every method takes `&self`.
///
/// # Example
///
/// ```rust
/// use horde_core::SparseArray;
///
/// let flags: SparseArray<u8> = SparseArray::new(100_000);
/// flags.set(42, 7);
/// assert_eq!(flags.get(42), 7);
///
/// flags.set(42, 0); // writing the default removes the slot
/// assert!(!flags.has(42));
/// assert_eq!(flags.len(), 0);
/// ```
pub struct SparseArray<T> {
    /// Materialized non-default slots.
    slots: RwLock<FxHashMap<usize, T>>,
    /// Logical capacity (exclusive upper bound on indices).
    capacity: usize,
}

impl<T> SparseArray<T> {
    /// Creates an empty sparse array accepting indices in `0..capacity`.
    ///
    /// The capacity bounds the index range only; the initial reservation is
    /// a small fraction of it, never the whole range.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let reserve = (capacity / 16).min(MAX_INITIAL_RESERVE);
        Self {
            slots: RwLock::new(FxHashMap::with_capacity_and_hasher(reserve, Default::default())),
            capacity,
        }
    }

    /// Returns the logical capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of materialized (non-default) slots. O(1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns true if no slot is materialized.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Returns true iff a non-default value is stored at `index`.
    #[inline]
    #[must_use]
    pub fn has(&self, index: usize) -> bool {
        index < self.capacity && self.slots.read().contains_key(&index)
    }

    /// Removes the slot at `index`, returning its value if it was present.
    pub fn remove(&self, index: usize) -> Option<T> {
        if index >= self.capacity {
            return None;
        }
        self.slots.write().remove(&index)
    }

    /// Drops every slot. Capacity is unchanged.
    pub fn clear(&self) {
        self.slots.write().clear();
    }
}

impl<T: Default + PartialEq> SparseArray<T> {
    /// Stores `value` at `index`.
    ///
    /// Writing `T::default()` removes the slot. Out-of-range indices are
    /// ignored.
    pub fn set(&self, index: usize, value: T) {
        if index >= self.capacity {
            return;
        }

        let mut slots = self.slots.write();
        if value == T::default() {
            slots.remove(&index);
        } else {
            slots.insert(index, value);
        }
    }
}

impl<T: Clone + Default> SparseArray<T> {
    /// Returns the value at `index`, or `T::default()` when absent or out
    /// of range.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        if index >= self.capacity {
            return T::default();
        }
        self.slots.read().get(&index).cloned().unwrap_or_default()
    }
}

impl<T: Clone> SparseArray<T> {
    /// Copies out every materialized slot, sorted by index.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(usize, T)> {
        let mut out: Vec<(usize, T)> = self
            .slots
            .read()
            .iter()
            .map(|(&index, value)| (index, value.clone()))
            .collect();
        out.sort_unstable_by_key(|&(index, _)| index);
        out
    }
}

impl<T> std::fmt::Debug for SparseArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseArray")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
