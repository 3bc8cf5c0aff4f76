//! Logging and debugging facilities for Cellzone.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output by subsystem
//! - The region dump, a text view of every region and its cells
//! - A timing guard for profiling
//!
//! # Tracing Integration
//!
//! Cellzone only emits events; install a subscriber to see them:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(EnvFilter::new("cellzone_core::query=debug"))
//!     .init();
//! ```
//!
//! # Region Dump
//!
//! ```
//! use cellzone_core::{ComponentRegistry, RegionDump};
//!
//! let mut registry = ComponentRegistry::new(10_000, 1_000_000);
//! let start = registry.reserve_region("Foo", 5).unwrap();
//! registry.add_active_cell(start).unwrap();
//!
//! let text = RegionDump::new(&registry).to_string();
//! assert_eq!(text, "Foo (void) :: 1000000\n");
//! ```

use std::fmt;

use crate::registry::{ComponentRegistry, RegionInfo};

/// Span names used throughout Cellzone for tracing.
pub mod span_names {
    /// Query resolution span.
    pub const QUERY: &str = "cellzone::query";
    /// Region dump rendering span.
    pub const DUMP: &str = "cellzone::dump";
    /// Timed operation span opened by [`PerfSpan`](super::PerfSpan).
    pub const PERF: &str = "cellzone::perf";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "cellzone_core";
    /// Region and active-cell bookkeeping.
    pub const REGISTRY: &str = "cellzone_core::registry";
    /// Zone allocation.
    pub const ZONE: &str = "cellzone_core::zone";
    /// Query parsing and evaluation.
    pub const QUERY: &str = "cellzone_core::query";
    /// Session lifecycle.
    pub const SESSION: &str = "cellzone_core::session";
}

/// Configuration for region dump output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Whether to list regions with no committed cells.
    pub include_empty: bool,
    /// Whether to append the reserved span `[start, end)` to each line.
    pub show_capacity: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_empty: true,
            show_capacity: false,
        }
    }
}

impl DumpOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_capacity: true,
            ..Default::default()
        }
    }

    /// Options that list only populated regions.
    pub fn populated() -> Self {
        Self {
            include_empty: false,
            ..Default::default()
        }
    }
}

/// Text view of every region in name order.
///
/// Each line reads `<name> (<void|fixed>) :: <cells>`, where `void` means no
/// component is attached.
#[derive(Debug, Clone, Copy)]
pub struct RegionDump<'a> {
    registry: &'a ComponentRegistry,
    options: DumpOptions,
}

impl<'a> RegionDump<'a> {
    /// Create a dump with default options.
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self::with_options(registry, DumpOptions::default())
    }

    /// Create a dump with custom options.
    pub fn with_options(registry: &'a ComponentRegistry, options: DumpOptions) -> Self {
        Self { registry, options }
    }

    fn write_region(&self, f: &mut fmt::Formatter<'_>, region: &RegionInfo<'_>) -> fmt::Result {
        write!(f, "{} ({}) :: {}", region.name, region.status, region.cells)?;
        if self.options.show_capacity {
            write!(f, " [{}, {})", region.span.start, region.span.end())?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RegionDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _span = tracing::trace_span!(target: targets::CORE, span_names::DUMP).entered();
        for region in self.registry.regions() {
            if !self.options.include_empty && region.cells.is_empty() {
                continue;
            }
            self.write_region(f, &region)?;
        }
        Ok(())
    }
}

/// Keeps a timing span entered for as long as it lives.
///
/// Subscribers that record span close events see the operation's duration.
#[derive(Debug)]
pub struct PerfSpan {
    _entered: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a span named [`span_names::PERF`] tagged with `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::CORE, span_names::PERF, operation);
        Self {
            _entered: span.entered(),
        }
    }
}
