//! Core systems for Cellzone.
//!
//! This crate provides the bookkeeping behind a geometry model build: which
//! named region owns which cell numbers, and how symbolic names resolve to
//! concrete cells.
//!
//! - **Interval Sets**: Normalized sets of cell-number ranges
//! - **Zone Allocation**: Fixed-size blocks of cell numbers with O(1) owner lookup
//! - **Component Registry**: Regions, their attached objects and the active-cell set
//! - **Query Resolution**: Symbolic expressions like `Shield:inner:2` or `Foo:ZONE`
//! - **Session**: Explicit build-scoped state with init/reset lifecycle
//!
//! # Example
//!
//! ```
//! use cellzone_core::{Assembly, Session};
//!
//! let mut session = Session::new();
//! let foo = session.reserve_region("Foo", 7).unwrap();
//! let bar = session.reserve_region("Bar", 12_000).unwrap();
//! assert_eq!((foo, bar), (1_000_000, 1_010_000));
//!
//! let mut shield = Assembly::new("shield");
//! shield.cells_mut().set_cells("inner", vec![foo + 1, foo + 2]);
//! session.attach_object("Foo", Box::new(shield)).unwrap();
//!
//! for cell in foo..foo + 4 {
//!     session.add_active_cell(cell).unwrap();
//! }
//!
//! assert_eq!(session.object_range("Foo:inner:1").unwrap(), vec![foo + 2]);
//! assert_eq!(session.object_range("Foo").unwrap().len(), 4);
//! ```

pub mod component;
pub mod config;
mod error;
pub mod interval;
pub mod logging;
pub mod query;
pub mod registry;
pub mod session;
pub mod zone;

/// A cell number.
pub type CellId = i32;

pub use component::{
    Assembly, Capabilities, CellGroups, CellMap, CellRenumber, Component, ComponentGroup,
    ComponentKey, MemberMap,
};
pub use config::{ConfigError, SessionConfig};
pub use error::{ErrorKind, RegistryError, Result};
pub use interval::{CellRange, IntervalSet};
pub use logging::{DumpOptions, PerfSpan, RegionDump};
pub use query::{parse_query, Query, QueryResolver, Segment};
pub use registry::{ComponentRegistry, RegionInfo, RegionStatus};
pub use session::Session;
pub use zone::{ZoneAllocator, ZoneSpan};

/// Parse and evaluate `expr` against `registry`.
///
/// Shorthand for [`QueryResolver::resolve`].
pub fn resolve(registry: &ComponentRegistry, expr: &str) -> Result<Vec<CellId>> {
    QueryResolver::new(registry).resolve(expr)
}
