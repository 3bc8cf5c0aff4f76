//! Component model for the registry.
//!
//! A component is the object a builder attaches to its region once it exists.
//! The registry owns it and never inspects its concrete type. Instead a
//! component advertises optional secondary roles through the capability
//! accessors on [`Component`]; the registry probes them once at attach time
//! and records the result as a [`Capabilities`] flag set stored next to the
//! boxed object.
//!
//! # Key Types
//!
//! - [`Component`] - Base trait every attached object implements
//! - [`CellGroups`] - Capability: named sub-groups of cells
//! - [`ComponentGroup`] - Capability: named members that are regions themselves
//! - [`CellRenumber`] - Capability: keeps internal cell-indexed state in sync
//! - [`CellMap`], [`MemberMap`], [`Assembly`] - Ready-made implementations
//!
//! # Example
//!
//! ```
//! use cellzone_core::{Assembly, Capabilities};
//!
//! let mut shield = Assembly::new("shield");
//! shield.cells_mut().add_cell("inner", 1_000_001);
//! shield.members_mut().insert("door", "ShieldDoor");
//!
//! let caps = Capabilities::probe(&mut shield);
//! assert!(caps.contains(Capabilities::CELL_GROUPS | Capabilities::MEMBERS));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use slotmap::new_key_type;

use crate::CellId;

new_key_type! {
    /// Arena key of an attached component.
    ///
    /// Keys stay internal to the registry; callers address components by
    /// region name.
    pub struct ComponentKey;
}

/// Capability: the component exposes named groups of cells.
pub trait CellGroups {
    /// Cells of the group, in insertion order.
    fn group(&self, name: &str) -> Option<&[CellId]>;

    /// Names of every group.
    fn group_names(&self) -> Vec<&str>;
}

/// Capability: the component is a hierarchical group of sub-components.
///
/// Each member is a region registered in the same session.
pub trait ComponentGroup {
    /// Region name registered for `member`.
    fn member_region(&self, member: &str) -> Option<&str>;

    /// Names of every member.
    fn member_names(&self) -> Vec<&str>;
}

/// Capability: the component keeps cell-indexed state that must follow renumbering.
pub trait CellRenumber {
    /// Replace every internal reference to `old` with `new`.
    fn renumber_cell(&mut self, old: CellId, new: CellId);
}

/// Base trait for objects attached to a region.
///
/// All capability accessors default to `None`; implementors override the ones
/// they support.
pub trait Component: Send {
    /// Short human-readable description used in diagnostics.
    fn kind(&self) -> &str {
        "component"
    }

    /// Named cell groups, if supported.
    fn cell_groups(&self) -> Option<&dyn CellGroups> {
        None
    }

    /// Sub-component members, if supported.
    fn members(&self) -> Option<&dyn ComponentGroup> {
        None
    }

    /// Renumbering hook, if supported.
    fn renumber_target(&mut self) -> Option<&mut dyn CellRenumber> {
        None
    }
}

bitflags::bitflags! {
    /// Capability table recorded for an attached component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Exposes [`CellGroups`].
        const CELL_GROUPS = 1 << 0;
        /// Exposes [`ComponentGroup`].
        const MEMBERS = 1 << 1;
        /// Exposes [`CellRenumber`].
        const RENUMBER = 1 << 2;
    }
}

impl Capabilities {
    /// Probe every capability accessor of `component`.
    pub fn probe(component: &mut dyn Component) -> Self {
        let mut caps = Capabilities::empty();
        caps.set(Self::CELL_GROUPS, component.cell_groups().is_some());
        caps.set(Self::MEMBERS, component.members().is_some());
        caps.set(Self::RENUMBER, component.renumber_target().is_some());
        caps
    }
}

/// Arena slot holding an attached component.
pub(crate) struct ComponentEntry {
    /// Region the component is attached to.
    pub(crate) region: String,
    object: Box<dyn Component>,
    capabilities: Capabilities,
}

impl ComponentEntry {
    pub(crate) fn new(region: String, mut object: Box<dyn Component>) -> Self {
        let capabilities = Capabilities::probe(object.as_mut());
        Self {
            region,
            object,
            capabilities,
        }
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub(crate) fn object(&self) -> &dyn Component {
        self.object.as_ref()
    }

    pub(crate) fn object_mut(&mut self) -> &mut dyn Component {
        self.object.as_mut()
    }

    pub(crate) fn cell_groups(&self) -> Option<&dyn CellGroups> {
        if self.capabilities.contains(Capabilities::CELL_GROUPS) {
            self.object.cell_groups()
        } else {
            None
        }
    }

    pub(crate) fn members(&self) -> Option<&dyn ComponentGroup> {
        if self.capabilities.contains(Capabilities::MEMBERS) {
            self.object.members()
        } else {
            None
        }
    }

    /// Forward a renumbering to the component. Returns `true` if it was notified.
    pub(crate) fn renumber(&mut self, old: CellId, new: CellId) -> bool {
        if !self.capabilities.contains(Capabilities::RENUMBER) {
            return false;
        }
        match self.object.renumber_target() {
            Some(target) => {
                target.renumber_cell(old, new);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("region", &self.region)
            .field("kind", &self.object.kind())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

// =========================================================================
// Ready-made capability implementations
// =========================================================================

/// Named groups of cells, e.g. `"inner"`, `"outer"`, `"void"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellMap {
    groups: BTreeMap<String, Vec<CellId>>,
}

impl CellMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell to a group, creating the group if needed.
    pub fn add_cell(&mut self, group: impl Into<String>, cell: CellId) {
        self.groups.entry(group.into()).or_default().push(cell);
    }

    /// Replace the cells of a group.
    pub fn set_cells(&mut self, group: impl Into<String>, cells: Vec<CellId>) {
        self.groups.insert(group.into(), cells);
    }

    /// Cells of a group.
    pub fn cells(&self, group: &str) -> Option<&[CellId]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// The `index`-th cell of a group.
    pub fn cell(&self, group: &str, index: usize) -> Option<CellId> {
        self.groups.get(group)?.get(index).copied()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl CellGroups for CellMap {
    fn group(&self, name: &str) -> Option<&[CellId]> {
        self.cells(name)
    }

    fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }
}

impl CellRenumber for CellMap {
    fn renumber_cell(&mut self, old: CellId, new: CellId) {
        for cell in self.groups.values_mut().flatten() {
            if *cell == old {
                *cell = new;
            }
        }
    }
}

impl Component for CellMap {
    fn kind(&self) -> &str {
        "cell-map"
    }

    fn cell_groups(&self) -> Option<&dyn CellGroups> {
        Some(self)
    }

    fn renumber_target(&mut self) -> Option<&mut dyn CellRenumber> {
        Some(self)
    }
}

/// Member name to region name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberMap {
    members: BTreeMap<String, String>,
}

impl MemberMap {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `member` as the region `region`. Returns the previous region, if any.
    pub fn insert(&mut self, member: impl Into<String>, region: impl Into<String>) -> Option<String> {
        self.members.insert(member.into(), region.into())
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if there are no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl ComponentGroup for MemberMap {
    fn member_region(&self, member: &str) -> Option<&str> {
        self.members.get(member).map(String::as_str)
    }

    fn member_names(&self) -> Vec<&str> {
        self.members.keys().map(String::as_str).collect()
    }
}

impl Component for MemberMap {
    fn kind(&self) -> &str {
        "member-map"
    }

    fn members(&self) -> Option<&dyn ComponentGroup> {
        Some(self)
    }
}

/// A component with named cell groups and named members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    kind: String,
    cells: CellMap,
    members: MemberMap,
}

impl Assembly {
    /// Create an empty assembly described by `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// The cell groups.
    pub fn cells(&self) -> &CellMap {
        &self.cells
    }

    /// Mutable access to the cell groups.
    pub fn cells_mut(&mut self) -> &mut CellMap {
        &mut self.cells
    }

    /// The member table.
    pub fn member_map(&self) -> &MemberMap {
        &self.members
    }

    /// Mutable access to the member table.
    pub fn members_mut(&mut self) -> &mut MemberMap {
        &mut self.members
    }
}

impl Component for Assembly {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn cell_groups(&self) -> Option<&dyn CellGroups> {
        Some(&self.cells)
    }

    fn members(&self) -> Option<&dyn ComponentGroup> {
        Some(&self.members)
    }

    fn renumber_target(&mut self) -> Option<&mut dyn CellRenumber> {
        Some(&mut self.cells)
    }
}
