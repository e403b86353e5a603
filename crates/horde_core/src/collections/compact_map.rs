//! # Compact Map
//!
//! Size-adaptive map: a linear array while small, a hash table once large.
//!
//! Most per-entity component sets hold a handful of entries. A short linear
//! scan beats hashing on both memory and cache locality there, but a set
//! that grows must not stay linear.
//!
//! ```text
//! len < threshold:   [(k, v), (k, v), ...]   linear scan
//! len == threshold:  promote ONCE ──────────► FxHashMap<K, V>
//! ```
//!
//! Promotion never reverses on `delete`, so churn near the threshold cannot
//! oscillate between representations. `clear` is a full reset and returns
//! the map to linear mode.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Entry count at which a map converts to a hash table.
pub const DEFAULT_PROMOTION_THRESHOLD: usize = 16;

/// Backing representation.
enum Storage<K, V> {
    /// Unique keys, scanned linearly. Order is not preserved.
    Small(Vec<(K, V)>),
    /// Promoted hash table.
    Large(FxHashMap<K, V>),
}

impl<K, V> Storage<K, V> {
    #[inline]
    fn len(&self) -> usize {
        match self {
            Self::Small(entries) => entries.len(),
            Self::Large(table) => table.len(),
        }
    }
}

/// An associative container that starts linear and promotes to a hash
/// table.
///
/// # Thread Safety
///
/// Guarded by a single mutex. Every method takes `&self`.
///
/// # Example
///
/// ```rust
/// use horde_core::CompactMap;
///
/// let effects: CompactMap<&str, u32> = CompactMap::new();
/// effects.set("burning", 3);
/// effects.set("slowed", 1);
///
/// assert_eq!(effects.get(&"burning"), Some(3));
/// assert_eq!(effects.delete(&"slowed"), Some(1));
/// assert!(!effects.is_promoted());
/// ```
pub struct CompactMap<K, V> {
    storage: Mutex<Storage<K, V>>,
    promotion_threshold: usize,
}

impl<K, V> CompactMap<K, V> {
    /// Creates an empty map with the default promotion threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_PROMOTION_THRESHOLD)
    }

    /// Creates an empty map that promotes once it holds `threshold` entries.
    ///
    /// # Panics
    ///
    /// Panics if threshold is zero.
    #[must_use]
    pub fn with_threshold(threshold: usize) -> Self {
        assert!(threshold > 0, "Promotion threshold must be greater than zero");
        Self {
            storage: Mutex::new(Storage::Small(Vec::new())),
            promotion_threshold: threshold,
        }
    }

    /// Creates an empty map, rejecting a zero threshold.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidThreshold`] if `threshold` is zero.
    pub fn try_with_threshold(threshold: usize) -> CoreResult<Self> {
        if threshold == 0 {
            return Err(CoreError::InvalidThreshold(threshold));
        }
        Ok(Self::with_threshold(threshold))
    }

    /// Returns the entry count that triggers promotion.
    #[inline]
    #[must_use]
    pub const fn promotion_threshold(&self) -> usize {
        self.promotion_threshold
    }

    /// Returns the number of entries. O(1) in both modes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    /// Returns true if the map holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the map has converted to a hash table.
    #[inline]
    #[must_use]
    pub fn is_promoted(&self) -> bool {
        matches!(*self.storage.lock(), Storage::Large(_))
    }

    /// Removes every entry and returns to linear mode.
    pub fn clear(&self) {
        *self.storage.lock() = Storage::Small(Vec::new());
    }
}

impl<K: Eq + Hash, V> CompactMap<K, V> {
    /// Inserts or overwrites `key`.
    ///
    /// Reaching the promotion threshold converts the map to a hash table.
    ///
    /// # Returns
    ///
    /// The previous value for `key`, if any.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        let mut storage = self.storage.lock();
        let entries = match &mut *storage {
            Storage::Large(table) => return table.insert(key, value),
            Storage::Small(entries) => entries,
        };

        if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }

        entries.push((key, value));
        if entries.len() >= self.promotion_threshold {
            let mut table =
                FxHashMap::with_capacity_and_hasher(entries.len() * 2, Default::default());
            table.extend(entries.drain(..));
            tracing::debug!(
                entries = table.len(),
                threshold = self.promotion_threshold,
                "compact map promoted to hash table"
            );
            *storage = Storage::Large(table);
        }
        None
    }

    /// Removes `key`, returning its value. Never demotes.
    pub fn delete(&self, key: &K) -> Option<V> {
        match &mut *self.storage.lock() {
            Storage::Small(entries) => {
                let slot = entries.iter().position(|(k, _)| k == key)?;
                Some(entries.swap_remove(slot).1)
            }
            Storage::Large(table) => table.remove(key),
        }
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        match &*self.storage.lock() {
            Storage::Small(entries) => entries.iter().any(|(k, _)| k == key),
            Storage::Large(table) => table.contains_key(key),
        }
    }
}

impl<K: Eq + Hash, V: Clone> CompactMap<K, V> {
    /// Returns a copy of the value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        match &*self.storage.lock() {
            Storage::Small(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            Storage::Large(table) => table.get(key).cloned(),
        }
    }
}

impl<K: Clone, V: Clone> CompactMap<K, V> {
    /// Copies out every entry. Order is unspecified.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(K, V)> {
        match &*self.storage.lock() {
            Storage::Small(entries) => entries.clone(),
            Storage::Large(table) => table
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl<K, V> Default for CompactMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for CompactMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.lock();
        let mode = match *storage {
            Storage::Small(_) => "small",
            Storage::Large(_) => "large",
        };
        f.debug_struct("CompactMap")
            .field("mode", &mode)
            .field("len", &storage.len())
            .field("promotion_threshold", &self.promotion_threshold)
            .finish()
    }
}
