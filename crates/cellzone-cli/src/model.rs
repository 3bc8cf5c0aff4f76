//! TOML model description loaded into a [`Session`].
//!
//! ```toml
//! [session]
//! zone_size = 10000
//!
//! [[region]]
//! name = "Shield"
//! size = 20
//! cells = [0, 1, 2, 3]
//! groups = { inner = [1, 2] }
//! members = { door = "ShieldDoor" }
//!
//! [[region]]
//! name = "ShieldDoor"
//! size = 4
//! cells = [0, 1]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use cellzone_core::{Assembly, CellId, Session, SessionConfig};
use serde::Deserialize;

/// Top-level model file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionDecl>,
}

/// One `[[region]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionDecl {
    pub name: String,
    /// Number of cells to reserve capacity for.
    pub size: usize,
    /// Cells to commit, as offsets from the region start.
    #[serde(default)]
    pub cells: Vec<usize>,
    /// Absolute cell numbers committed to this region regardless of zone.
    #[serde(default)]
    pub sentinel_cells: Vec<CellId>,
    /// Named cell groups, as offsets from the region start.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<usize>>,
    /// Member name -> region name.
    #[serde(default)]
    pub members: BTreeMap<String, String>,
    /// Attach an empty assembly even without groups or members.
    #[serde(default)]
    pub attach: bool,
    /// Assembly kind shown in logs.
    #[serde(default)]
    pub kind: Option<String>,
}

impl RegionDecl {
    fn wants_object(&self) -> bool {
        self.attach || !self.groups.is_empty() || !self.members.is_empty()
    }

    fn cell_at(&self, start: CellId, offset: usize) -> anyhow::Result<CellId> {
        if offset >= self.size {
            bail!(
                "region '{}': offset {offset} is outside its size {}",
                self.name,
                self.size
            );
        }
        CellId::try_from(offset)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .with_context(|| format!("region '{}': offset {offset} overflows", self.name))
    }

    fn assembly(&self, start: CellId) -> anyhow::Result<Assembly> {
        let mut assembly = Assembly::new(self.kind.as_deref().unwrap_or("assembly"));
        for (group, offsets) in &self.groups {
            let cells = offsets
                .iter()
                .map(|&offset| self.cell_at(start, offset))
                .collect::<anyhow::Result<Vec<_>>>()?;
            assembly.cells_mut().set_cells(group.clone(), cells);
        }
        for (member, region) in &self.members {
            assembly.members_mut().insert(member.clone(), region.clone());
        }
        Ok(assembly)
    }
}

impl ModelFile {
    /// Parse a model from TOML text.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let model: Self = toml::from_str(text).context("invalid model TOML")?;
        model.session.validate()?;
        Ok(model)
    }

    /// Read and parse a model file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model '{}'", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in model '{}'", path.display()))
    }

    /// Build a session: reserve every region, attach objects, then commit cells.
    pub fn build(&self) -> anyhow::Result<Session> {
        let mut session = Session::init(self.session)?;

        let mut starts = Vec::with_capacity(self.regions.len());
        for region in &self.regions {
            let start = session
                .reserve_region(&region.name, region.size)
                .with_context(|| format!("reserving region '{}'", region.name))?;
            starts.push(start);
        }

        for (region, &start) in self.regions.iter().zip(&starts) {
            for member in region.members.values() {
                if !session.has_region(member) {
                    bail!(
                        "region '{}': member region '{member}' is not declared",
                        region.name
                    );
                }
            }
            if region.wants_object() {
                session.attach_object(&region.name, Box::new(region.assembly(start)?))?;
            }
            for &offset in &region.cells {
                let cell = region.cell_at(start, offset)?;
                session
                    .add_active_cell(cell)
                    .with_context(|| format!("region '{}': adding cell {cell}", region.name))?;
            }
            for &cell in &region.sentinel_cells {
                session
                    .add_active_cell_to(&region.name, cell)
                    .with_context(|| format!("region '{}': adding sentinel {cell}", region.name))?;
            }
        }

        tracing::info!(
            regions = session.registry().region_count(),
            active = session.registry().active_count(),
            "model built"
        );
        Ok(session)
    }
}
