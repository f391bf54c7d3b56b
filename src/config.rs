//! Projector configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! [rounding]
//! required_breaches = "none"     # none | half_up | half_even
//! trajectory = "half_up"
//!
//! [table]
//! separator = ","
//! date_formats = ["%Y-%m-%d", "%d/%m/%Y"]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProjectorError;
use crate::rates::Rounding;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    #[serde(default)]
    pub rounding: RoundingSettings,
    #[serde(default)]
    pub table: TableSettings,
}

/// Rounding applied to breach counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingSettings {
    /// Applied to `type1_breaches_required` in overall-target mode.
    #[serde(default = "default_required_rounding")]
    pub required_breaches: Rounding,
    /// Applied to projected Type 1 breaches. Must not be `none`.
    #[serde(default = "default_trajectory_rounding")]
    pub trajectory: Rounding,
}

impl Default for RoundingSettings {
    fn default() -> Self {
        Self {
            required_breaches: default_required_rounding(),
            trajectory: default_trajectory_rounding(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_separator")]
    pub separator: char,
    /// chrono formats tried in order when reading a period label as a date.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            date_formats: default_date_formats(),
        }
    }
}

fn default_required_rounding() -> Rounding {
    Rounding::None
}

fn default_trajectory_rounding() -> Rounding {
    Rounding::HalfUp
}

fn default_separator() -> char {
    ','
}

fn default_date_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d".to_string(),
        "%d/%m/%Y".to_string(),
        "%Y-%m-%d %H:%M:%S".to_string(),
    ]
}

impl ProjectorConfig {
    /// Parse and validate a TOML config document.
    pub fn from_toml_str(content: &str) -> Result<Self, ProjectorError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ProjectorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProjectorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::info!("Loaded projector config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ProjectorError> {
        if self.rounding.trajectory == Rounding::None {
            return Err(ProjectorError::Config(
                "rounding.trajectory must be half_up or half_even".to_string(),
            ));
        }
        if !self.table.separator.is_ascii() {
            return Err(ProjectorError::Config(format!(
                "table.separator must be an ASCII character, got '{}'",
                self.table.separator
            )));
        }
        if self.table.date_formats.is_empty() {
            return Err(ProjectorError::Config(
                "table.date_formats must list at least one format".to_string(),
            ));
        }
        Ok(())
    }

    /// Field separator as a byte, as the CSV reader and writer expect it.
    pub fn separator_byte(&self) -> Result<u8, ProjectorError> {
        u8::try_from(self.table.separator)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ProjectorError::Config(format!(
                    "table.separator must be an ASCII character, got '{}'",
                    self.table.separator
                ))
            })
    }
}
