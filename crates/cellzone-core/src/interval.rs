//! Ordered sets of disjoint cell-number ranges.
//!
//! An [`IntervalSet`] stores the cells of one region as sorted closed ranges
//! `[low, high]`. After every public mutation the ranges are normalized: no two
//! ranges overlap or touch, so `{1, 2, 3, 5}` is stored as `1-3 5`.
//!
//! # Example
//!
//! ```
//! use cellzone_core::IntervalSet;
//!
//! let mut cells = IntervalSet::new();
//! cells.add_range(5, 9);
//! cells.add_item(1);
//! cells.add_item(3);
//! cells.add_item(12);
//! assert_eq!(cells.to_string(), "1 3 5-9 12");
//!
//! cells.add_item(2);
//! assert_eq!(cells.to_string(), "1-3 5-9 12");
//! ```

use std::fmt;

use crate::error::{RegistryError, Result};
use crate::CellId;

/// A closed range of cell numbers, `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// First cell in the range.
    pub low: CellId,
    /// Last cell in the range (inclusive).
    pub high: CellId,
}

impl CellRange {
    /// Create a range from two bounds in either order.
    pub fn new(a: CellId, b: CellId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// A range holding one cell.
    pub fn single(cell: CellId) -> Self {
        Self {
            low: cell,
            high: cell,
        }
    }

    /// Number of cells in the range.
    #[inline]
    pub fn len(&self) -> usize {
        (i64::from(self.high) - i64::from(self.low) + 1) as usize
    }

    /// Always false; a range holds at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True if `cell` lies inside the range.
    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        self.low <= cell && cell <= self.high
    }

    /// True if the two ranges overlap or are directly adjacent.
    #[inline]
    fn touches(&self, next: &CellRange) -> bool {
        i64::from(self.high) + 1 >= i64::from(next.low)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// Sorted, normalized set of cell numbers stored as disjoint ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    ranges: Vec<CellRange>,
}

impl IntervalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding the closed range `[a, b]` (bounds in either order).
    pub fn from_range(a: CellId, b: CellId) -> Self {
        Self {
            ranges: vec![CellRange::new(a, b)],
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert one cell.
    pub fn add_item(&mut self, cell: CellId) {
        self.add_range(cell, cell);
    }

    /// Insert the closed range `[a, b]`, merging with any neighbours it touches.
    pub fn add_range(&mut self, a: CellId, b: CellId) {
        let new = CellRange::new(a, b);
        let start = self
            .ranges
            .partition_point(|r| i64::from(r.high) + 1 < i64::from(new.low));
        let end = self
            .ranges
            .partition_point(|r| i64::from(r.low) <= i64::from(new.high) + 1);

        if start >= end {
            self.ranges.insert(start, new);
            return;
        }

        let merged = CellRange {
            low: new.low.min(self.ranges[start].low),
            high: new.high.max(self.ranges[end - 1].high),
        };
        self.ranges.splice(start..end, std::iter::once(merged));
    }

    /// Insert many cells, normalizing once at the end.
    pub fn add_items<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = CellId>,
    {
        self.ranges
            .extend(cells.into_iter().map(CellRange::single));
        self.merge();
    }

    /// Sort and coalesce ranges that overlap or touch.
    ///
    /// Public mutators already leave the set normalized; this is the batch
    /// step behind [`add_items`](Self::add_items) and is idempotent.
    pub fn merge(&mut self) {
        if self.ranges.len() < 2 {
            return;
        }
        self.ranges.sort_unstable_by_key(|r| (r.low, r.high));

        let mut merged: Vec<CellRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if last.touches(&range) => {
                    last.high = last.high.max(range.high);
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }

    /// Remove one cell, splitting the range that holds it.
    ///
    /// Returns `false` and leaves the set untouched if the cell is absent.
    pub fn remove_item(&mut self, cell: CellId) -> bool {
        let idx = self.ranges.partition_point(|r| r.high < cell);
        let Some(range) = self.ranges.get_mut(idx) else {
            return false;
        };
        if range.low > cell {
            return false;
        }

        match (range.low == cell, range.high == cell) {
            (true, true) => {
                self.ranges.remove(idx);
            }
            (true, false) => range.low = cell + 1,
            (false, true) => range.high = cell - 1,
            (false, false) => {
                let upper = CellRange {
                    low: cell + 1,
                    high: range.high,
                };
                range.high = cell - 1;
                self.ranges.insert(idx + 1, upper);
            }
        }
        true
    }

    /// Replace `old` with `new`.
    ///
    /// Fails with [`RegistryError::NotPresent`] and leaves the set untouched if
    /// `old` is not a member.
    pub fn move_item(&mut self, old: CellId, new: CellId) -> Result<()> {
        if !self.remove_item(old) {
            return Err(RegistryError::NotPresent { cell: old });
        }
        self.add_item(new);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Union of two sets as a new normalized set.
    pub fn combine(&self, other: &IntervalSet) -> IntervalSet {
        let mut ranges = Vec::with_capacity(self.ranges.len() + other.ranges.len());
        ranges.extend_from_slice(&self.ranges);
        ranges.extend_from_slice(&other.ranges);
        let mut out = IntervalSet { ranges };
        out.merge();
        out
    }

    /// Membership test by binary search.
    pub fn contains(&self, cell: CellId) -> bool {
        let idx = self.ranges.partition_point(|r| r.high < cell);
        self.ranges.get(idx).is_some_and(|r| r.low <= cell)
    }

    /// Smallest cell, if any.
    pub fn first(&self) -> Option<CellId> {
        self.ranges.first().map(|r| r.low)
    }

    /// Largest cell, if any.
    pub fn last(&self) -> Option<CellId> {
        self.ranges.last().map(|r| r.high)
    }

    /// Smallest member strictly greater than `cell`.
    pub fn next_after(&self, cell: CellId) -> Option<CellId> {
        let target = cell.checked_add(1)?;
        let idx = self.ranges.partition_point(|r| r.high < target);
        self.ranges.get(idx).map(|r| r.low.max(target))
    }

    /// The `index`-th cell in ascending order (0-based).
    pub fn nth(&self, index: usize) -> Option<CellId> {
        let mut remaining = index;
        for range in &self.ranges {
            let len = range.len();
            if remaining < len {
                return Some((i64::from(range.low) + remaining as i64) as CellId);
            }
            remaining -= len;
        }
        None
    }

    /// Number of cells in the set.
    pub fn len(&self) -> usize {
        self.ranges.iter().map(CellRange::len).sum()
    }

    /// True if the set holds no cells.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of stored ranges.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// The normalized ranges.
    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    /// Lazy ascending iterator over every cell.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = CellId> + '_ {
        self.ranges.iter().flat_map(|r| r.low..=r.high)
    }

    /// Every cell in ascending order.
    pub fn all_cells(&self) -> Vec<CellId> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.iter());
        out
    }
}

impl FromIterator<CellId> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = CellId>>(iter: I) -> Self {
        let mut set = IntervalSet::new();
        set.add_items(iter);
        set
    }
}

impl Extend<CellId> for IntervalSet {
    fn extend<I: IntoIterator<Item = CellId>>(&mut self, iter: I) {
        self.add_items(iter);
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}
