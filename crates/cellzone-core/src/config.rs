//! Session configuration.
//!
//! The zone geometry is read from a TOML table:
//!
//! ```toml
//! zone_size = 10000
//! first_cell = 1000000
//! ```
//!
//! Missing keys fall back to the defaults shown above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CellId;

/// Default number of cell numbers per zone.
pub const DEFAULT_ZONE_SIZE: CellId = 10_000;
/// Default first cell number handed out.
pub const DEFAULT_FIRST_CELL: CellId = 1_000_000;

/// Errors raised while loading or validating a [`SessionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid TOML for a session config.
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The values parsed but break a geometry rule.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Zone geometry for a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Cell numbers per zone.
    pub zone_size: CellId,
    /// First cell number of the first zone.
    pub first_cell: CellId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            zone_size: DEFAULT_ZONE_SIZE,
            first_cell: DEFAULT_FIRST_CELL,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the geometry rules.
    ///
    /// Zones must be non-empty and the first cell must sit on a zone boundary
    /// so that `cell / zone_size` names the zone a reservation started in.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zone_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "zone_size must be positive, got {}",
                self.zone_size
            )));
        }
        if self.first_cell < 0 {
            return Err(ConfigError::Invalid(format!(
                "first_cell must not be negative, got {}",
                self.first_cell
            )));
        }
        if self.first_cell % self.zone_size != 0 {
            return Err(ConfigError::Invalid(format!(
                "first_cell {} is not a multiple of zone_size {}",
                self.first_cell, self.zone_size
            )));
        }
        Ok(())
    }
}
