//! The named resource-range registry.
//!
//! [`ComponentRegistry`] owns, per region name:
//! - the [`IntervalSet`] of cells committed to the region
//! - the [`ZoneSpan`] reserved for it
//! - zero or one attached [`Component`]
//!
//! It also keeps the global set of active cells, so existence checks and the
//! `All` query never walk the regions.
//!
//! # Region lifecycle
//!
//! ```text
//! reserve_region -> Reserved (no object)
//!   attach_object -> Populated
//!     add_active_cell / remove_active_cell / renumber_cell ...
//! remove_region -> gone (cells, zones and object together)
//! ```
//!
//! # Example
//!
//! ```
//! use cellzone_core::{CellMap, ComponentRegistry};
//!
//! let mut registry = ComponentRegistry::new(10_000, 1_000_000);
//! let start = registry.reserve_region("Foo", 7).unwrap();
//! registry.attach_object("Foo", Box::new(CellMap::new())).unwrap();
//!
//! let owner = registry.add_active_cell(start + 5).unwrap();
//! assert_eq!(owner, "Foo");
//! assert!(registry.has_cell("Foo", start + 5));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Bound;

use slotmap::SlotMap;

use crate::component::{
    Capabilities, CellGroups, Component, ComponentEntry, ComponentGroup, ComponentKey,
};
use crate::error::{RegistryError, Result};
use crate::interval::IntervalSet;
use crate::logging::targets;
use crate::zone::{ZoneAllocator, ZoneSpan};
use crate::CellId;

/// Whether a region has an object attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionStatus {
    /// Capacity is reserved but no object is attached.
    Void,
    /// An object is attached.
    Fixed,
}

impl fmt::Display for RegionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Fixed => f.write_str("fixed"),
        }
    }
}

/// Borrowed view of one region.
#[derive(Debug, Clone, Copy)]
pub struct RegionInfo<'a> {
    /// Region name.
    pub name: &'a str,
    /// Committed cells.
    pub cells: &'a IntervalSet,
    /// Reserved capacity.
    pub span: ZoneSpan,
    /// Attachment status.
    pub status: RegionStatus,
}

/// Internal data stored for each region.
#[derive(Debug, Clone)]
struct Region {
    cells: IntervalSet,
    span: ZoneSpan,
    component: Option<ComponentKey>,
}

impl Region {
    fn status(&self) -> RegionStatus {
        if self.component.is_some() {
            RegionStatus::Fixed
        } else {
            RegionStatus::Void
        }
    }
}

/// Registry of regions, their cells and their attached components.
pub struct ComponentRegistry {
    zones: ZoneAllocator,
    regions: BTreeMap<String, Region>,
    components: SlotMap<ComponentKey, ComponentEntry>,
    active: BTreeSet<CellId>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    ///
    /// `zone_size` must be positive and `first_cell` a non-negative multiple
    /// of it; [`Session::init`](crate::Session::init) validates both.
    pub fn new(zone_size: CellId, first_cell: CellId) -> Self {
        Self {
            zones: ZoneAllocator::new(zone_size, first_cell),
            regions: BTreeMap::new(),
            components: SlotMap::with_key(),
            active: BTreeSet::new(),
        }
    }

    // =========================================================================
    // Region lifecycle
    // =========================================================================

    /// Reserve capacity for `size` cells under `name`.
    ///
    /// Returns the first cell number of the reserved span. This is the only way
    /// a region comes into existence.
    pub fn reserve_region(&mut self, name: &str, size: usize) -> Result<CellId> {
        if self.regions.contains_key(name) {
            return Err(RegistryError::DuplicateRegion { name: name.into() });
        }
        let span = self.zones.reserve(name, size)?;
        self.regions.insert(
            name.to_string(),
            Region {
                cells: IntervalSet::new(),
                span,
                component: None,
            },
        );
        tracing::debug!(target: targets::REGISTRY, name, start = span.start, "reserved region");
        Ok(span.start)
    }

    /// Attach the component object for an existing region.
    pub fn attach_object(&mut self, name: &str, component: Box<dyn Component>) -> Result<()> {
        let region = self
            .regions
            .get_mut(name)
            .ok_or_else(|| RegistryError::region_not_found(name))?;
        if region.component.is_some() {
            return Err(RegistryError::DuplicateComponent { name: name.into() });
        }

        let entry = ComponentEntry::new(name.to_string(), component);
        let capabilities = entry.capabilities();
        let kind = entry.object().kind().to_string();
        region.component = Some(self.components.insert(entry));
        tracing::debug!(
            target: targets::REGISTRY,
            name,
            kind = %kind,
            ?capabilities,
            "attached component"
        );
        Ok(())
    }

    /// Delete a region together with its zones, its object and its active cells.
    pub fn remove_region(&mut self, name: &str) -> Result<()> {
        let region = self
            .regions
            .remove(name)
            .ok_or_else(|| RegistryError::region_not_found(name))?;

        for cell in region.cells.iter() {
            self.active.remove(&cell);
        }
        self.zones.release(name);
        if let Some(key) = region.component {
            self.components.remove(key);
        }
        tracing::debug!(
            target: targets::REGISTRY,
            name,
            cells = region.cells.len(),
            "removed region"
        );
        Ok(())
    }

    // =========================================================================
    // Active cells
    // =========================================================================

    /// Commit `cell` to the region that owns its zone.
    ///
    /// Returns the owning region's name.
    pub fn add_active_cell(&mut self, cell: CellId) -> Result<String> {
        self.ensure_inactive(cell)?;
        let owner = self
            .owner_of(cell)
            .ok_or(RegistryError::NoOwner { cell })?
            .to_string();
        self.commit(&owner, cell)?;
        Ok(owner)
    }

    /// Commit `cell` to the named region regardless of its zone.
    ///
    /// Used for sentinel cells (such as the outer world cell) that fall
    /// outside every reserved zone.
    pub fn add_active_cell_to(&mut self, name: &str, cell: CellId) -> Result<()> {
        self.ensure_inactive(cell)?;
        self.commit(name, cell)
    }

    /// Remove `cell` from the active set and from its owning region.
    ///
    /// Returns the name of the region it was removed from.
    pub fn remove_active_cell(&mut self, cell: CellId) -> Result<String> {
        if !self.active.contains(&cell) {
            return Err(RegistryError::CellNotActive { cell });
        }
        let owner = self
            .owner_of(cell)
            .ok_or(RegistryError::NoOwner { cell })?
            .to_string();
        let region = self
            .regions
            .get_mut(&owner)
            .ok_or_else(|| RegistryError::region_not_found(&owner))?;

        region.cells.remove_item(cell);
        self.active.remove(&cell);
        tracing::trace!(target: targets::REGISTRY, cell, owner = %owner, "removed active cell");
        Ok(owner)
    }

    /// Move an active cell to a new number, keeping its owner.
    ///
    /// The owning region, the active set and the attached component (if it
    /// supports renumbering) are updated together. Validation happens before
    /// any mutation, so a failed call leaves the registry unchanged.
    pub fn renumber_cell(&mut self, old: CellId, new: CellId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if !self.active.contains(&old) {
            return Err(RegistryError::CellNotActive { cell: old });
        }
        self.ensure_inactive(new)?;

        let owner = self
            .owner_of(old)
            .ok_or(RegistryError::NoOwner { cell: old })?
            .to_string();
        let region = self
            .regions
            .get_mut(&owner)
            .ok_or_else(|| RegistryError::region_not_found(&owner))?;

        region.cells.move_item(old, new)?;
        self.active.remove(&old);
        self.active.insert(new);

        let notified = region
            .component
            .and_then(|key| self.components.get_mut(key))
            .is_some_and(|entry| entry.renumber(old, new));
        tracing::trace!(
            target: targets::REGISTRY,
            old,
            new,
            owner = %owner,
            notified,
            "renumbered cell"
        );
        Ok(())
    }

    fn ensure_inactive(&self, cell: CellId) -> Result<()> {
        if self.active.contains(&cell) {
            let owner = self.owner_of(cell).unwrap_or_default().to_string();
            return Err(RegistryError::CellAlreadyActive { cell, owner });
        }
        Ok(())
    }

    fn commit(&mut self, name: &str, cell: CellId) -> Result<()> {
        let region = self
            .regions
            .get_mut(name)
            .ok_or_else(|| RegistryError::region_not_found(name))?;
        region.cells.add_item(cell);
        self.active.insert(cell);
        tracing::trace!(target: targets::REGISTRY, cell, owner = name, "added active cell");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Name of the region that owns `cell`.
    ///
    /// The zone map answers first. Its answer is only trusted when the cell is
    /// not active or the zone's region actually holds it; otherwise every
    /// region is scanned.
    pub fn owner_of(&self, cell: CellId) -> Option<&str> {
        if let Some(name) = self.zones.owner_of_zone(cell) {
            let trusted = !self.active.contains(&cell)
                || self
                    .regions
                    .get(name)
                    .is_some_and(|region| region.cells.contains(cell));
            if trusted {
                return Some(name);
            }
        }

        let found = self
            .regions
            .iter()
            .find(|(_, region)| region.cells.contains(cell))
            .map(|(name, _)| name.as_str());
        if found.is_some() {
            tracing::trace!(target: targets::REGISTRY, cell, "owner found by exhaustive scan");
        }
        found
    }

    /// True if a region is registered under `name`.
    pub fn has_region(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    /// True if `cell` is committed to region `name`.
    pub fn has_cell(&self, name: &str, cell: CellId) -> bool {
        self.regions
            .get(name)
            .is_some_and(|region| region.cells.contains(cell))
    }

    /// True if `cell` is committed to any region.
    pub fn is_active(&self, cell: CellId) -> bool {
        self.active.contains(&cell)
    }

    /// Union of the cells of every region whose name starts with `prefix`.
    pub fn zone_group(&self, prefix: &str) -> Result<IntervalSet> {
        let mut matched = false;
        let mut out = IntervalSet::new();
        for (_, region) in self
            .regions
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(name, _)| name.as_bytes().starts_with(prefix.as_bytes()))
        {
            matched = true;
            out = out.combine(&region.cells);
        }
        if !matched {
            return Err(RegistryError::PrefixNotFound {
                prefix: prefix.into(),
            });
        }
        Ok(out)
    }

    /// Cells committed to region `name`.
    pub fn region_cells(&self, name: &str) -> Result<&IntervalSet> {
        self.region(name).map(|region| &region.cells)
    }

    /// Capacity span reserved for region `name`.
    pub fn region_span(&self, name: &str) -> Result<ZoneSpan> {
        self.region(name).map(|region| region.span)
    }

    /// Attachment status of region `name`.
    pub fn region_status(&self, name: &str) -> Result<RegionStatus> {
        self.region(name).map(Region::status)
    }

    /// Smallest committed cell of region `name`.
    pub fn first_cell(&self, name: &str) -> Result<Option<CellId>> {
        self.region_cells(name).map(IntervalSet::first)
    }

    /// Largest committed cell of region `name`.
    pub fn last_cell(&self, name: &str) -> Result<Option<CellId>> {
        self.region_cells(name).map(IntervalSet::last)
    }

    /// Lowest cell number inside the region's reserved span that is not active.
    pub fn next_free_cell(&self, name: &str) -> Result<CellId> {
        let span = self.region_span(name)?;
        let last = CellId::try_from(span.end() - 1).unwrap_or(CellId::MAX);
        let mut candidate = i64::from(span.start);
        for &cell in self.active.range(span.start..=last) {
            if i64::from(cell) != candidate {
                break;
            }
            candidate += 1;
        }
        match CellId::try_from(candidate) {
            Ok(cell) if span.contains(cell) => Ok(cell),
            _ => Err(RegistryError::CapacityExhausted {
                name: name.into(),
                size: span.capacity() + 1,
            }),
        }
    }

    /// The component attached to region `name`.
    pub fn component(&self, name: &str) -> Result<&dyn Component> {
        self.entry(name).map(ComponentEntry::object)
    }

    /// Mutable access to the component attached to region `name`.
    pub fn component_mut(&mut self, name: &str) -> Result<&mut dyn Component> {
        let key = self
            .region(name)?
            .component
            .ok_or_else(|| RegistryError::ComponentNotFound { name: name.into() })?;
        self.components
            .get_mut(key)
            .map(ComponentEntry::object_mut)
            .ok_or_else(|| RegistryError::ComponentNotFound { name: name.into() })
    }

    /// Capability table of the component attached to region `name`.
    pub fn capabilities(&self, name: &str) -> Result<Capabilities> {
        self.entry(name).map(ComponentEntry::capabilities)
    }

    /// Named cell groups of region `name`, if its component exposes them.
    pub fn cell_groups(&self, name: &str) -> Option<&dyn CellGroups> {
        self.entry(name).ok()?.cell_groups()
    }

    /// Sub-component members of region `name`, if its component exposes them.
    pub fn members(&self, name: &str) -> Option<&dyn ComponentGroup> {
        self.entry(name).ok()?.members()
    }

    /// Region names in ascending order.
    pub fn region_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.regions.keys().map(String::as_str)
    }

    /// Every region in name order.
    pub fn regions(&self) -> impl Iterator<Item = RegionInfo<'_>> + '_ {
        self.regions.iter().map(|(name, region)| RegionInfo {
            name,
            cells: &region.cells,
            span: region.span,
            status: region.status(),
        })
    }

    /// Every active cell in ascending order.
    pub fn active_cells(&self) -> &BTreeSet<CellId> {
        &self.active
    }

    /// Active cells in the half-open range `[low, high)`.
    pub fn active_in(&self, low: CellId, high: CellId) -> impl Iterator<Item = CellId> + '_ {
        let (low, high) = if high < low { (high, low) } else { (low, high) };
        self.active.range(low..high).copied()
    }

    /// Number of regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of active cells.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// The zone allocator.
    pub fn zones(&self) -> &ZoneAllocator {
        &self.zones
    }

    fn region(&self, name: &str) -> Result<&Region> {
        self.regions
            .get(name)
            .ok_or_else(|| RegistryError::region_not_found(name))
    }

    fn entry(&self, name: &str) -> Result<&ComponentEntry> {
        self.region(name)?
            .component
            .and_then(|key| self.components.get(key))
            .ok_or_else(|| RegistryError::ComponentNotFound { name: name.into() })
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("zones", &self.zones)
            .field("regions", &self.regions.len())
            .field("components", &self.components.values().collect::<Vec<_>>())
            .field("active", &self.active.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Assembly, CellMap};
    use crate::error::ErrorKind;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::new(10_000, 1_000_000)
    }

    struct Plain;

    impl Component for Plain {}

    #[test]
    fn test_reserve_returns_zone_start() {
        let mut reg = registry();
        assert_eq!(reg.reserve_region("Foo", 7).unwrap(), 1_000_000);
        assert_eq!(reg.reserve_region("Bar", 12_000).unwrap(), 1_010_000);
        assert!(reg.has_region("Foo"));
        assert_eq!(reg.region_status("Foo").unwrap(), RegionStatus::Void);
    }

    #[test]
    fn test_reserve_duplicate() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        let err = reg.reserve_region("Foo", 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        // Failed reservations consume no zones.
        assert_eq!(reg.reserve_region("Bar", 1).unwrap(), 1_010_000);
    }

    #[test]
    fn test_reserve_commits_nothing() {
        let mut reg = registry();
        let start = reg.reserve_region("Foo", 7).unwrap();
        for cell in start..start + 10_000 {
            assert!(!reg.has_cell("Foo", cell));
        }
        assert_eq!(reg.active_count(), 0);
    }

    #[test]
    fn test_attach_object() {
        let mut reg = registry();
        let err = reg.attach_object("Foo", Box::new(Plain)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);

        reg.reserve_region("Foo", 7).unwrap();
        reg.attach_object("Foo", Box::new(Plain)).unwrap();
        assert_eq!(reg.region_status("Foo").unwrap(), RegionStatus::Fixed);
        assert!(reg.capabilities("Foo").unwrap().is_empty());

        let err = reg.attach_object("Foo", Box::new(Plain)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateComponent { .. }));
        assert_eq!(reg.component_count(), 1);
    }

    #[test]
    fn test_add_and_remove_active_cell() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();

        assert_eq!(reg.add_active_cell(1_000_005).unwrap(), "Foo");
        assert!(reg.has_cell("Foo", 1_000_005));
        assert!(reg.is_active(1_000_005));

        let err = reg.add_active_cell(1_000_005).unwrap_err();
        assert!(matches!(err, RegistryError::CellAlreadyActive { ref owner, .. } if owner == "Foo"));

        assert_eq!(reg.remove_active_cell(1_000_005).unwrap(), "Foo");
        assert!(!reg.is_active(1_000_005));
        assert!(!reg.has_cell("Foo", 1_000_005));
        assert!(reg.region_cells("Foo").unwrap().is_empty());

        let err = reg.remove_active_cell(1_000_005).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);
    }

    #[test]
    fn test_add_outside_any_zone() {
        let mut reg = registry();
        reg.reserve_region("World", 1).unwrap();
        let err = reg.add_active_cell(1).unwrap_err();
        assert_eq!(err, RegistryError::NoOwner { cell: 1 });

        reg.add_active_cell_to("World", 1).unwrap();
        assert_eq!(reg.owner_of(1), Some("World"));
        assert_eq!(reg.remove_active_cell(1).unwrap(), "World");
    }

    #[test]
    fn test_renumber_cell() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        let mut map = CellMap::new();
        map.add_cell("inner", 1_000_005);
        reg.attach_object("Foo", Box::new(map)).unwrap();
        reg.add_active_cell(1_000_005).unwrap();

        reg.renumber_cell(1_000_005, 1_000_006).unwrap();
        assert!(!reg.has_cell("Foo", 1_000_005));
        assert!(reg.has_cell("Foo", 1_000_006));
        assert!(!reg.is_active(1_000_005));
        assert!(reg.is_active(1_000_006));
        assert_eq!(reg.active_count(), 1);
        assert_eq!(reg.owner_of(1_000_005), reg.owner_of(1_000_006));

        let inner = reg.cell_groups("Foo").and_then(|g| g.group("inner"));
        assert_eq!(inner, Some(&[1_000_006][..]));
    }

    #[test]
    fn test_renumber_same_number_is_noop() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        reg.add_active_cell(1_000_001).unwrap();
        reg.renumber_cell(1_000_001, 1_000_001).unwrap();
        assert!(reg.has_cell("Foo", 1_000_001));
    }

    #[test]
    fn test_renumber_failures_leave_state() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        reg.add_active_cell(1_000_001).unwrap();
        reg.add_active_cell(1_000_002).unwrap();

        let err = reg.renumber_cell(1_000_003, 1_000_004).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);

        let err = reg.renumber_cell(1_000_001, 1_000_002).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        assert!(reg.has_cell("Foo", 1_000_001));
        assert!(reg.has_cell("Foo", 1_000_002));
        assert_eq!(reg.active_count(), 2);
    }

    #[test]
    fn test_renumber_into_foreign_zone_keeps_owner() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        reg.reserve_region("Bar", 7).unwrap();
        reg.add_active_cell(1_000_001).unwrap();

        reg.renumber_cell(1_000_001, 1_010_001).unwrap();
        assert!(reg.has_cell("Foo", 1_010_001));
        assert!(!reg.has_cell("Bar", 1_010_001));
        assert_eq!(reg.owner_of(1_010_001), Some("Foo"));
        assert_eq!(reg.remove_active_cell(1_010_001).unwrap(), "Foo");
    }

    #[test]
    fn test_remove_region() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        reg.attach_object("Foo", Box::new(Assembly::new("pipe"))).unwrap();
        reg.add_active_cell(1_000_001).unwrap();

        reg.remove_region("Foo").unwrap();
        assert!(!reg.has_region("Foo"));
        assert!(!reg.is_active(1_000_001));
        assert_eq!(reg.component_count(), 0);
        assert_eq!(reg.owner_of(1_000_001), None);

        let err = reg.remove_region("Foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);
    }

    #[test]
    fn test_zone_group_prefix() {
        let mut reg = registry();
        let a = reg.reserve_region("Foo1", 7).unwrap();
        let b = reg.reserve_region("Foo2", 7).unwrap();
        let c = reg.reserve_region("Bar", 7).unwrap();
        reg.add_active_cell(a).unwrap();
        reg.add_active_cell(b + 1).unwrap();
        reg.add_active_cell(c).unwrap();

        let group = reg.zone_group("Foo").unwrap();
        assert_eq!(group.all_cells(), vec![a, b + 1]);

        let err = reg.zone_group("Baz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);

        // A region that exists but is empty still matches.
        assert!(reg.zone_group("Foo1").is_ok());
    }

    #[test]
    fn test_next_free_cell() {
        let mut reg = ComponentRegistry::new(4, 0);
        reg.reserve_region("Foo", 4).unwrap();
        assert_eq!(reg.next_free_cell("Foo").unwrap(), 0);
        reg.add_active_cell(0).unwrap();
        reg.add_active_cell(1).unwrap();
        reg.add_active_cell(3).unwrap();
        assert_eq!(reg.next_free_cell("Foo").unwrap(), 2);
        reg.add_active_cell(2).unwrap();
        let err = reg.next_free_cell("Foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeError);
    }

    #[test]
    fn test_component_lookup() {
        let mut reg = registry();
        reg.reserve_region("Foo", 7).unwrap();
        let Err(err) = reg.component("Foo") else {
            panic!("region without an object has no component");
        };
        assert!(matches!(err, RegistryError::ComponentNotFound { .. }));

        reg.attach_object("Foo", Box::new(Assembly::new("pipe"))).unwrap();
        assert_eq!(reg.component("Foo").unwrap().kind(), "pipe");
        assert!(reg.members("Foo").is_some());

        let groups = reg
            .component_mut("Foo")
            .unwrap()
            .renumber_target()
            .is_some();
        assert!(groups);
    }

    #[test]
    fn test_active_in_half_open() {
        let mut reg = ComponentRegistry::new(100, 0);
        reg.reserve_region("Foo", 100).unwrap();
        for cell in [1, 5, 9, 10] {
            reg.add_active_cell(cell).unwrap();
        }
        assert_eq!(reg.active_in(5, 10).collect::<Vec<_>>(), vec![5, 9]);
        assert_eq!(reg.active_in(10, 5).collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn test_zone_group_prefix_is_bytewise() {
        let mut reg = registry();
        let foo = reg.reserve_region("Foo", 1).unwrap();
        let foo1 = reg.reserve_region("Foo1", 1).unwrap();
        let foo_nul = reg.reserve_region("Foo\0", 1).unwrap();
        let fop = reg.reserve_region("Fop", 1).unwrap();
        let fo = reg.reserve_region("Fo", 1).unwrap();
        for cell in [foo, foo1, foo_nul, fop, fo] {
            reg.add_active_cell(cell).unwrap();
        }

        let group = reg.zone_group("Foo").unwrap();
        assert_eq!(group.to_string(), "1000000 1010000 1020000");
        assert_eq!(reg.zone_group("Fo").unwrap().len(), 5);
    }

    #[test]
    fn test_first_and_last_cell() {
        let mut reg = registry();
        let start = reg.reserve_region("Foo", 20).unwrap();
        assert_eq!(reg.first_cell("Foo").unwrap(), None);
        assert_eq!(reg.last_cell("Foo").unwrap(), None);

        for offset in [7, 3, 12] {
            reg.add_active_cell(start + offset).unwrap();
        }
        assert_eq!(reg.first_cell("Foo").unwrap(), Some(start + 3));
        assert_eq!(reg.last_cell("Foo").unwrap(), Some(start + 12));

        reg.remove_active_cell(start + 12).unwrap();
        assert_eq!(reg.last_cell("Foo").unwrap(), Some(start + 7));

        let err = reg.first_cell("Nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);
    }

    #[test]
    fn test_next_free_cell_at_top_of_cell_space() {
        let top = CellId::MAX - 3;
        let mut reg = ComponentRegistry::new(4, top);
        assert_eq!(reg.reserve_region("Top", 4).unwrap(), top);
        for cell in top..CellId::MAX {
            reg.add_active_cell(cell).unwrap();
        }
        assert_eq!(reg.next_free_cell("Top").unwrap(), CellId::MAX);

        reg.add_active_cell(CellId::MAX).unwrap();
        let err = reg.next_free_cell("Top").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeError);
    }
}
