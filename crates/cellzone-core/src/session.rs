//! Build session.
//!
//! A [`Session`] owns one [`ComponentRegistry`] for the lifetime of a model
//! build. It is passed around explicitly; [`Session::reset`] consumes it and
//! hands back an empty one with the same configuration.
//!
//! # Example
//!
//! ```
//! use cellzone_core::Session;
//!
//! let mut session = Session::new();
//! let foo = session.reserve_region("Foo", 7).unwrap();
//! session.add_active_cell(foo + 2).unwrap();
//!
//! assert_eq!(session.object_range("Foo").unwrap(), vec![foo + 2]);
//! assert_eq!(session.dump(), "Foo (void) :: 1000002\n");
//!
//! let session = session.reset();
//! assert_eq!(session.registry().region_count(), 0);
//! ```

use std::path::Path;

use crate::component::Component;
use crate::config::{ConfigError, SessionConfig};
use crate::error::Result;
use crate::interval::IntervalSet;
use crate::logging::{targets, DumpOptions, PerfSpan, RegionDump};
use crate::query::QueryResolver;
use crate::registry::ComponentRegistry;
use crate::CellId;

/// The registry for one model build.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    registry: ComponentRegistry,
}

static_assertions::assert_impl_all!(Session: Send);

impl Session {
    /// Start a session with a validated configuration.
    pub fn init(config: SessionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            target: targets::SESSION,
            zone_size = config.zone_size,
            first_cell = config.first_cell,
            "session started"
        );
        Ok(Self {
            registry: ComponentRegistry::new(config.zone_size, config.first_cell),
            config,
        })
    }

    /// Start a session with the default configuration.
    pub fn new() -> Self {
        let config = SessionConfig::default();
        Self {
            registry: ComponentRegistry::new(config.zone_size, config.first_cell),
            config,
        }
    }

    /// Drop all state and start over with the same configuration.
    pub fn reset(self) -> Self {
        tracing::debug!(
            target: targets::SESSION,
            regions = self.registry.region_count(),
            active = self.registry.active_count(),
            "session reset"
        );
        Self {
            registry: ComponentRegistry::new(self.config.zone_size, self.config.first_cell),
            config: self.config,
        }
    }

    /// The configuration this session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable access to the underlying registry.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    // =========================================================================
    // Registry operations
    // =========================================================================

    /// See [`ComponentRegistry::reserve_region`].
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub fn reserve_region(&mut self, name: &str, size: usize) -> Result<CellId> {
        self.registry.reserve_region(name, size)
    }

    /// See [`ComponentRegistry::attach_object`].
    #[tracing::instrument(level = "debug", skip(self, component), err)]
    pub fn attach_object(&mut self, name: &str, component: Box<dyn Component>) -> Result<()> {
        self.registry.attach_object(name, component)
    }

    /// See [`ComponentRegistry::remove_region`].
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub fn remove_region(&mut self, name: &str) -> Result<()> {
        self.registry.remove_region(name)
    }

    /// See [`ComponentRegistry::add_active_cell`].
    pub fn add_active_cell(&mut self, cell: CellId) -> Result<String> {
        self.registry.add_active_cell(cell)
    }

    /// See [`ComponentRegistry::add_active_cell_to`].
    pub fn add_active_cell_to(&mut self, name: &str, cell: CellId) -> Result<()> {
        self.registry.add_active_cell_to(name, cell)
    }

    /// See [`ComponentRegistry::remove_active_cell`].
    pub fn remove_active_cell(&mut self, cell: CellId) -> Result<String> {
        self.registry.remove_active_cell(cell)
    }

    /// See [`ComponentRegistry::renumber_cell`].
    pub fn renumber_cell(&mut self, old: CellId, new: CellId) -> Result<()> {
        self.registry.renumber_cell(old, new)
    }

    /// See [`ComponentRegistry::owner_of`].
    pub fn owner_of(&self, cell: CellId) -> Option<&str> {
        self.registry.owner_of(cell)
    }

    /// See [`ComponentRegistry::has_region`].
    pub fn has_region(&self, name: &str) -> bool {
        self.registry.has_region(name)
    }

    /// See [`ComponentRegistry::has_cell`].
    pub fn has_cell(&self, name: &str, cell: CellId) -> bool {
        self.registry.has_cell(name, cell)
    }

    /// See [`ComponentRegistry::is_active`].
    pub fn is_active(&self, cell: CellId) -> bool {
        self.registry.is_active(cell)
    }

    /// See [`ComponentRegistry::zone_group`].
    pub fn zone_group(&self, prefix: &str) -> Result<IntervalSet> {
        self.registry.zone_group(prefix)
    }

    // =========================================================================
    // Queries and diagnostics
    // =========================================================================

    /// Resolve a symbolic expression to its cell numbers.
    ///
    /// See [`crate::query`] for the accepted forms.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub fn object_range(&self, expr: &str) -> Result<Vec<CellId>> {
        QueryResolver::new(&self.registry).resolve(expr)
    }

    /// One line per region, in name order.
    pub fn dump(&self) -> String {
        self.dump_with(DumpOptions::default())
    }

    /// The region dump with custom options.
    pub fn dump_with(&self, options: DumpOptions) -> String {
        RegionDump::with_options(&self.registry, options).to_string()
    }

    /// Write the default region dump to `path`.
    pub fn write_dump(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.write_dump_with(path, DumpOptions::default())
    }

    /// Write the region dump with custom options to `path`.
    pub fn write_dump_with(&self, path: impl AsRef<Path>, options: DumpOptions) -> std::io::Result<()> {
        let _perf = PerfSpan::new("write_dump");
        let path = path.as_ref();
        std::fs::write(path, self.dump_with(options))?;
        tracing::info!(
            target: targets::SESSION,
            path = %path.display(),
            regions = self.registry.region_count(),
            "wrote region dump"
        );
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::CellMap;

    #[test]
    fn test_init_rejects_bad_config() {
        let config = SessionConfig {
            zone_size: 0,
            first_cell: 0,
        };
        assert!(Session::init(config).is_err());
    }

    #[test]
    fn test_init_custom_geometry() {
        let config = SessionConfig {
            zone_size: 100,
            first_cell: 500,
        };
        let mut session = Session::init(config).unwrap();
        assert_eq!(session.reserve_region("A", 150).unwrap(), 500);
        assert_eq!(session.reserve_region("B", 1).unwrap(), 700);
    }

    #[test]
    fn test_reset_keeps_config() {
        let config = SessionConfig {
            zone_size: 100,
            first_cell: 500,
        };
        let mut session = Session::init(config).unwrap();
        session.reserve_region("A", 1).unwrap();
        session.add_active_cell(500).unwrap();

        let mut session = session.reset();
        assert_eq!(session.config(), &config);
        assert!(!session.has_region("A"));
        assert!(!session.is_active(500));
        assert_eq!(session.reserve_region("A", 1).unwrap(), 500);
    }

    #[test]
    fn test_object_range_and_dump() {
        let mut session = Session::new();
        let foo = session.reserve_region("Foo", 10).unwrap();
        let mut cells = CellMap::new();
        cells.set_cells("edge", vec![foo + 4, foo]);
        session.attach_object("Foo", Box::new(cells)).unwrap();
        for cell in [foo, foo + 1, foo + 2, foo + 4] {
            session.add_active_cell(cell).unwrap();
        }

        assert_eq!(session.object_range("Foo:edge").unwrap(), vec![foo + 4, foo]);
        assert_eq!(session.object_range("Foo:edge:1").unwrap(), vec![foo]);
        assert_eq!(session.dump(), "Foo (fixed) :: 1000000-1000002 1000004\n");
    }

    #[test]
    fn test_write_dump() {
        let mut session = Session::new();
        session.reserve_region("Foo", 1).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.txt");

        session.write_dump(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Foo (void) :: \n");
    }
}
