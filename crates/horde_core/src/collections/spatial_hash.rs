//! # Spatial Hash Map
//!
//! Uniform 3D grid index for proximity queries over entity positions.
//!
//! ## Query Algorithm
//!
//! ```text
//! 1. Coarse: map the query box to the inclusive range of cell keys
//! 2. Exact:  test every entry of those cells against the box itself
//! ```
//!
//! Cells overlapping the box edge yield false positives in step 1; step 2
//! removes them. Nothing inside the box is missed.
//!
//! ## Staleness
//!
//! An entry's cell is computed once, at insertion. The map never tracks
//! movement: callers `remove` and re-`insert` (or rebuild per tick) when a
//! tracked entity moves.

use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Integer grid coordinates of a cell.
type CellKey = (i32, i32, i32);

/// One stored value with the exact position it was inserted at.
struct SpatialEntry<T> {
    value: T,
    position: [f32; 3],
}

/// Grid contents, guarded together so `len` stays consistent with cells.
struct Grid<T> {
    cells: FxHashMap<CellKey, Vec<SpatialEntry<T>>>,
    len: usize,
}

/// A uniform-grid spatial index.
///
/// Choose `cell_size` close to the typical query radius: too small and
/// queries walk many empty cells, too large and the exact test rejects most
/// of what it examines.
///
/// # Thread Safety
///
/// Guarded by a reader/writer lock; queries run in parallel.
///
/// # Example
///
/// ```rust
/// use horde_core::SpatialHashMap;
///
/// let grid: SpatialHashMap<u32> = SpatialHashMap::new(10.0);
/// grid.insert(1.0, 2.0, 3.0, 7);
/// grid.insert(55.0, 0.0, 0.0, 8);
///
/// let near = grid.query_range(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
/// assert_eq!(near, vec![7]);
/// ```
pub struct SpatialHashMap<T> {
    grid: RwLock<Grid<T>>,
    cell_size: f32,
}

impl<T> SpatialHashMap<T> {
    /// Creates an empty map with the given cell edge length.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not finite and positive.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "Cell size must be finite and greater than zero"
        );
        Self::with_cell_size(cell_size)
    }

    /// Creates an empty map, rejecting an invalid cell size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCellSize`] if `cell_size` is not finite
    /// or not greater than zero.
    pub fn try_new(cell_size: f32) -> CoreResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(CoreError::InvalidCellSize(cell_size));
        }
        Ok(Self::with_cell_size(cell_size))
    }

    fn with_cell_size(cell_size: f32) -> Self {
        Self {
            grid: RwLock::new(Grid {
                cells: FxHashMap::default(),
                len: 0,
            }),
            cell_size,
        }
    }

    /// Returns the cell edge length.
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns the total number of stored entries. O(1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.grid.read().len
    }

    /// Returns true if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of non-empty cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.grid.read().cells.len()
    }

    /// Maps one coordinate to its cell index.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn axis_cell(&self, coordinate: f32) -> i32 {
        // `as` saturates at the i32 bounds and maps NaN to 0.
        (coordinate / self.cell_size).floor() as i32
    }

    #[inline]
    fn cell_key(&self, x: f32, y: f32, z: f32) -> CellKey {
        (self.axis_cell(x), self.axis_cell(y), self.axis_cell(z))
    }

    /// Stores `value` at `(x, y, z)`.
    ///
    /// O(1) amortized. Duplicates are not detected.
    pub fn insert(&self, x: f32, y: f32, z: f32, value: T) {
        let key = self.cell_key(x, y, z);
        let mut grid = self.grid.write();
        grid.cells.entry(key).or_default().push(SpatialEntry {
            value,
            position: [x, y, z],
        });
        grid.len += 1;
    }

    /// Discards every cell and entry.
    pub fn clear(&self) {
        let mut grid = self.grid.write();
        grid.cells.clear();
        grid.len = 0;
    }

    /// Walks every entry inside the inclusive box `min..=max`.
    fn visit_range_entries(
        &self,
        grid: &Grid<T>,
        min: [f32; 3],
        max: [f32; 3],
        mut visit: impl FnMut(&SpatialEntry<T>),
    ) {
        // False for NaN bounds as well as inverted ones.
        let ordered = min[0] <= max[0] && min[1] <= max[1] && min[2] <= max[2];
        if !ordered {
            return;
        }

        let lo = self.cell_key(min[0], min[1], min[2]);
        let hi = self.cell_key(max[0], max[1], max[2]);

        let mut check = |entries: &Vec<SpatialEntry<T>>| {
            for entry in entries {
                if contains(min, max, entry.position) {
                    visit(entry);
                }
            }
        };

        let span = |a: i32, b: i32| u64::from(b.abs_diff(a)) + 1;
        let box_cells = span(lo.0, hi.0)
            .saturating_mul(span(lo.1, hi.1))
            .saturating_mul(span(lo.2, hi.2));

        if box_cells > grid.cells.len() as u64 {
            // Fewer occupied cells than candidates: scan what exists.
            for (key, entries) in &grid.cells {
                let inside = (lo.0..=hi.0).contains(&key.0)
                    && (lo.1..=hi.1).contains(&key.1)
                    && (lo.2..=hi.2).contains(&key.2);
                if inside {
                    check(entries);
                }
            }
            return;
        }

        for cx in lo.0..=hi.0 {
            for cy in lo.1..=hi.1 {
                for cz in lo.2..=hi.2 {
                    if let Some(entries) = grid.cells.get(&(cx, cy, cz)) {
                        check(entries);
                    }
                }
            }
        }
    }
}

impl<T: PartialEq> SpatialHashMap<T> {
    /// Removes one entry equal to `value` from the cell `(x, y, z)` maps to.
    ///
    /// Pass the position the value was inserted at. A cell left empty is
    /// dropped.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed.
    pub fn remove(&self, x: f32, y: f32, z: f32, value: &T) -> bool {
        let key = self.cell_key(x, y, z);
        let mut grid = self.grid.write();

        let Some(entries) = grid.cells.get_mut(&key) else {
            return false;
        };
        let Some(slot) = entries.iter().position(|entry| entry.value == *value) else {
            return false;
        };

        entries.swap_remove(slot);
        if entries.is_empty() {
            grid.cells.remove(&key);
        }
        grid.len -= 1;
        true
    }
}

impl<T: Clone> SpatialHashMap<T> {
    /// Returns every value whose position lies in the inclusive box
    /// `[min_x, max_x] x [min_y, max_y] x [min_z, max_z]`.
    ///
    /// Result order is unspecified.
    #[must_use]
    pub fn query_range(
        &self,
        min_x: f32,
        min_y: f32,
        min_z: f32,
        max_x: f32,
        max_y: f32,
        max_z: f32,
    ) -> Vec<T> {
        let mut out = Vec::new();
        self.query_range_into([min_x, min_y, min_z], [max_x, max_y, max_z], &mut out);
        out
    }

    /// Allocation-free [`query_range`](Self::query_range): clears `out` and
    /// fills it with the matches.
    pub fn query_range_into(&self, min: [f32; 3], max: [f32; 3], out: &mut Vec<T>) {
        out.clear();
        let grid = self.grid.read();
        self.visit_range_entries(&grid, min, max, |entry| out.push(entry.value.clone()));
    }

    /// Returns every value within `radius` of `(x, y, z)` (inclusive).
    #[must_use]
    pub fn query_radius(&self, x: f32, y: f32, z: f32, radius: f32) -> Vec<T> {
        let mut out = Vec::new();
        if radius.is_nan() || radius < 0.0 {
            return out;
        }

        let min = [x - radius, y - radius, z - radius];
        let max = [x + radius, y + radius, z + radius];
        let radius_sq = radius * radius;

        let grid = self.grid.read();
        self.visit_range_entries(&grid, min, max, |entry| {
            let [px, py, pz] = entry.position;
            let (dx, dy, dz) = (px - x, py - y, pz - z);
            if dx * dx + dy * dy + dz * dz <= radius_sq {
                out.push(entry.value.clone());
            }
        });
        out
    }
}

/// Inclusive AABB containment.
#[inline]
fn contains(min: [f32; 3], max: [f32; 3], p: [f32; 3]) -> bool {
    (min[0]..=max[0]).contains(&p[0])
        && (min[1]..=max[1]).contains(&p[1])
        && (min[2]..=max[2]).contains(&p[2])
}

impl<T> std::fmt::Debug for SpatialHashMap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let grid = self.grid.read();
        f.debug_struct("SpatialHashMap")
            .field("cell_size", &self.cell_size)
            .field("len", &grid.len)
            .field("cells", &grid.cells.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut values: Vec<u32>) -> Vec<u32> {
        values.sort_unstable();
        values
    }

    #[test]
    fn test_spatial_insert_and_query() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(10.0);
        grid.insert(1.0, 1.0, 1.0, 1);
        grid.insert(9.0, 9.0, 9.0, 2);
        grid.insert(25.0, 0.0, 0.0, 3);

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(sorted(grid.query_range(0.0, 0.0, 0.0, 10.0, 10.0, 10.0)), vec![1, 2]);
        assert_eq!(grid.query_range(20.0, -1.0, -1.0, 30.0, 1.0, 1.0), vec![3]);
    }

    #[test]
    fn test_spatial_exact_filter() {
        // Same cell, only one inside the box.
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(100.0);
        grid.insert(10.0, 10.0, 10.0, 1);
        grid.insert(90.0, 90.0, 90.0, 2);

        assert_eq!(grid.query_range(0.0, 0.0, 0.0, 50.0, 50.0, 50.0), vec![1]);
    }

    #[test]
    fn test_spatial_bounds_inclusive() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(5.0);
        grid.insert(5.0, 5.0, 5.0, 1);
        assert_eq!(grid.query_range(5.0, 5.0, 5.0, 5.0, 5.0, 5.0), vec![1]);
        assert_eq!(grid.query_range(0.0, 0.0, 0.0, 4.99, 5.0, 5.0), Vec::<u32>::new());
    }

    #[test]
    fn test_spatial_negative_coordinates() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(4.0);
        grid.insert(-0.5, -0.5, -0.5, 1);
        grid.insert(0.5, 0.5, 0.5, 2);

        // floor(-0.5 / 4) = -1, a different cell from the positive point.
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(grid.query_range(-1.0, -1.0, -1.0, 0.0, 0.0, 0.0), vec![1]);
        assert_eq!(sorted(grid.query_range(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0)), vec![1, 2]);
    }

    #[test]
    fn test_spatial_full_bounding_box() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(3.0);
        let mut n = 0;
        for x in -5..5 {
            for y in -5..5 {
                grid.insert(x as f32 * 1.7, y as f32 * 2.3, 0.5, n);
                n += 1;
            }
        }
        // Duplicate of an existing entry is kept.
        grid.insert(0.0, 0.0, 0.5, 0);

        let all = grid.query_range(-100.0, -100.0, -100.0, 100.0, 100.0, 100.0);
        assert_eq!(all.len(), n as usize + 1);
        assert!(grid.query_range(500.0, 500.0, 500.0, 600.0, 600.0, 600.0).is_empty());
    }

    #[test]
    fn test_spatial_inverted_and_nan_box() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(1.0);
        grid.insert(0.0, 0.0, 0.0, 1);
        assert!(grid.query_range(1.0, 0.0, 0.0, -1.0, 0.0, 0.0).is_empty());
        assert!(grid.query_range(f32::NAN, 0.0, 0.0, 1.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_spatial_huge_box_scans_occupied_cells() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(0.01);
        grid.insert(1.0e6, -1.0e6, 3.0, 1);
        grid.insert(-2.0e6, 4.0, 1.0e6, 2);

        let all = grid.query_range(-1.0e7, -1.0e7, -1.0e7, 1.0e7, 1.0e7, 1.0e7);
        assert_eq!(sorted(all), vec![1, 2]);
    }

    #[test]
    fn test_spatial_remove_then_reinsert() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(10.0);
        grid.insert(1.0, 1.0, 1.0, 7);
        grid.insert(2.0, 2.0, 2.0, 8);

        // Entity 7 moves: the stale entry stays until removed.
        assert!(grid.remove(1.0, 1.0, 1.0, &7));
        grid.insert(51.0, 1.0, 1.0, 7);
        assert!(!grid.remove(1.0, 1.0, 1.0, &7));

        assert_eq!(grid.query_range(0.0, 0.0, 0.0, 10.0, 10.0, 10.0), vec![8]);
        assert_eq!(grid.query_range(50.0, 0.0, 0.0, 60.0, 10.0, 10.0), vec![7]);

        assert!(grid.remove(2.0, 2.0, 2.0, &8));
        // The emptied cell is dropped.
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_spatial_query_into_reuses_buffer() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(2.0);
        grid.insert(1.0, 1.0, 1.0, 1);

        let mut out = vec![99, 98];
        grid.query_range_into([0.0; 3], [2.0; 3], &mut out);
        assert_eq!(out, vec![1]);

        grid.query_range_into([10.0; 3], [12.0; 3], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_spatial_query_radius() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(5.0);
        grid.insert(0.0, 0.0, 0.0, 1);
        grid.insert(3.0, 4.0, 0.0, 2); // distance 5
        grid.insert(4.0, 4.0, 4.0, 3); // in the box, outside the sphere

        assert_eq!(sorted(grid.query_radius(0.0, 0.0, 0.0, 5.0)), vec![1, 2]);
        assert_eq!(grid.query_radius(0.0, 0.0, 0.0, 0.0), vec![1]);
        assert!(grid.query_radius(0.0, 0.0, 0.0, -1.0).is_empty());
    }

    #[test]
    fn test_spatial_clear() {
        let grid: SpatialHashMap<u32> = SpatialHashMap::new(1.0);
        for i in 0..10 {
            grid.insert(i as f32, 0.0, 0.0, i);
        }
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
        assert!(grid.query_range(0.0, 0.0, 0.0, 10.0, 10.0, 10.0).is_empty());
    }

    #[test]
    fn test_spatial_invalid_cell_size() {
        assert_eq!(
            SpatialHashMap::<u8>::try_new(0.0).unwrap_err(),
            CoreError::InvalidCellSize(0.0)
        );
        assert!(SpatialHashMap::<u8>::try_new(f32::INFINITY).is_err());
        assert!(SpatialHashMap::<u8>::try_new(f32::NAN).is_err());
        assert_eq!(SpatialHashMap::<u8>::try_new(2.5).unwrap().cell_size(), 2.5);
    }

    #[test]
    #[should_panic(expected = "Cell size must be finite and greater than zero")]
    fn test_spatial_negative_cell_size_panics() {
        let _ = SpatialHashMap::<u8>::new(-1.0);
    }
}
