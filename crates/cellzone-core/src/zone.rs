//! Zone-based allocation of cell-number space.
//!
//! Capacity is handed out in fixed-size blocks ("zones"). A region reserving
//! `size` cells consumes `ceil(size / zone_size)` consecutive zones, and any
//! cell number maps back to its zone with `cell / zone_size`, giving an O(1)
//! owner lookup for cells placed inside reserved space.

use std::collections::HashMap;

use crate::error::{RegistryError, Result};
use crate::logging::targets;
use crate::CellId;

/// Cell-number span claimed by one reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneSpan {
    /// First cell number of the first zone.
    pub start: CellId,
    /// Number of consecutive zones consumed.
    pub zones: usize,
    /// Size of one zone at the time of reservation.
    pub zone_size: CellId,
}

impl ZoneSpan {
    /// One past the last cell number of the span.
    pub fn end(&self) -> i64 {
        i64::from(self.start) + self.capacity() as i64
    }

    /// Total number of cell numbers in the span.
    pub fn capacity(&self) -> usize {
        self.zones * self.zone_size as usize
    }

    /// True if `cell` lies inside the span.
    pub fn contains(&self, cell: CellId) -> bool {
        cell >= self.start && i64::from(cell) < self.end()
    }
}

/// Hands out zones from a monotonically increasing counter.
///
/// The zone map is hashed by zone index, so an owner lookup is one division
/// and one probe.
#[derive(Debug, Clone)]
pub struct ZoneAllocator {
    zone_size: CellId,
    next_cell: i64,
    zone_map: HashMap<i64, String>,
}

impl ZoneAllocator {
    /// Create an allocator whose first reservation starts at `first_cell`.
    ///
    /// Callers pass validated values (see
    /// [`SessionConfig::validate`](crate::SessionConfig::validate)):
    /// `zone_size > 0` and `first_cell` a non-negative multiple of it.
    pub fn new(zone_size: CellId, first_cell: CellId) -> Self {
        debug_assert!(zone_size > 0, "zone size must be positive");
        Self {
            zone_size,
            next_cell: i64::from(first_cell),
            zone_map: HashMap::new(),
        }
    }

    /// Size of one zone.
    pub fn zone_size(&self) -> CellId {
        self.zone_size
    }

    /// Cell number the next reservation will start at.
    ///
    /// May sit one past `CellId::MAX` once the cell space is used up.
    pub fn next_cell(&self) -> i64 {
        self.next_cell
    }

    /// Zone index holding `cell`.
    #[inline]
    pub fn zone_of(&self, cell: CellId) -> i64 {
        i64::from(cell).div_euclid(i64::from(self.zone_size))
    }

    /// Claim enough zones for `size` cells on behalf of `name`.
    ///
    /// Returns the first cell number of the first zone. The name is not checked
    /// for duplicates here; the registry owns that rule.
    pub fn reserve(&mut self, name: &str, size: usize) -> Result<ZoneSpan> {
        if size == 0 {
            return Err(RegistryError::ZeroSize { name: name.into() });
        }

        let zone_size = self.zone_size as usize;
        let zones = size.div_ceil(zone_size);
        let exhausted = || RegistryError::CapacityExhausted {
            name: name.into(),
            size,
        };
        let start = CellId::try_from(self.next_cell).map_err(|_| exhausted())?;
        let capacity = i64::try_from(zones * zone_size).map_err(|_| exhausted())?;
        let next = self
            .next_cell
            .checked_add(capacity)
            .filter(|&end| end <= i64::from(CellId::MAX) + 1)
            .ok_or_else(exhausted)?;

        let span = ZoneSpan {
            start,
            zones,
            zone_size: self.zone_size,
        };
        let first_zone = self.zone_of(span.start);
        for zone in first_zone..first_zone + zones as i64 {
            self.zone_map.insert(zone, name.to_string());
        }
        self.next_cell = next;

        tracing::debug!(
            target: targets::ZONE,
            name,
            size,
            zones,
            start = span.start,
            "reserved zones"
        );
        Ok(span)
    }

    /// Region name recorded for the zone holding `cell`, if any.
    pub fn owner_of_zone(&self, cell: CellId) -> Option<&str> {
        self.zone_map.get(&self.zone_of(cell)).map(String::as_str)
    }

    /// Forget every zone recorded against `name`. Zones are not reused.
    pub fn release(&mut self, name: &str) -> usize {
        let before = self.zone_map.len();
        self.zone_map.retain(|_, owner| owner != name);
        let released = before - self.zone_map.len();
        tracing::trace!(target: targets::ZONE, name, released, "released zones");
        released
    }

    /// Number of zones currently mapped to a region.
    pub fn mapped_zones(&self) -> usize {
        self.zone_map.len()
    }
}
