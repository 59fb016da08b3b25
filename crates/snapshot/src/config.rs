//! Snapshot configuration.
//!
//! Read from the `[package.metadata.snappiershot]` table of the nearest
//! `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.snappiershot]
//! file_format = "json"
//! float_absolute_tolerance = 1e-6
//! float_relative_tolerance = 0.001
//! full_diff = false
//! json_indentation = 4
//! ```
//!
//! Every key is optional and unknown keys are ignored. A manifest that cannot
//! be read or is not valid TOML yields the defaults.

use std::path::Path;

use serde::Deserialize;
use snappiershot_compare::{ReportOptions, Tolerances};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_FILE_FORMAT: &str = "JSON";
pub const DEFAULT_ABS_TOL: f64 = 1e-6;
pub const DEFAULT_REL_TOL: f64 = 0.001;
pub const DEFAULT_FULL_DIFF: bool = false;
pub const DEFAULT_JSON_INDENT: usize = 4;

const MANIFEST_NAME: &str = "Cargo.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot file format. Only `JSON` is supported (case-insensitive).
    pub file_format: String,
    pub float_absolute_tolerance: f64,
    pub float_relative_tolerance: f64,
    /// Show every line of the diff on failure, not only the changed ones.
    pub full_diff: bool,
    pub json_indentation: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_format: DEFAULT_FILE_FORMAT.to_string(),
            float_absolute_tolerance: DEFAULT_ABS_TOL,
            float_relative_tolerance: DEFAULT_REL_TOL,
            full_diff: DEFAULT_FULL_DIFF,
            json_indentation: DEFAULT_JSON_INDENT,
        }
    }
}

impl Config {
    /// Normalize and check the configuration.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.file_format = self.file_format.to_uppercase();
        if self.file_format != DEFAULT_FILE_FORMAT {
            return Err(ConfigError::UnsupportedFormat(self.file_format));
        }
        if self.float_absolute_tolerance < 0.0 {
            return Err(ConfigError::NegativeTolerance {
                name: "float_absolute_tolerance",
                value: self.float_absolute_tolerance,
            });
        }
        if self.float_relative_tolerance < 0.0 {
            return Err(ConfigError::NegativeTolerance {
                name: "float_relative_tolerance",
                value: self.float_relative_tolerance,
            });
        }
        Ok(self)
    }

    /// Parse the snappiershot table out of manifest text.
    pub fn from_manifest_str(text: &str) -> Result<Self, ConfigError> {
        let manifest = match text.parse::<toml::Table>() {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!(error = %e, "manifest is not valid TOML, using default configuration");
                return Ok(Config::default());
            }
        };
        let section = manifest
            .get("package")
            .and_then(|package| package.get("metadata"))
            .and_then(|metadata| metadata.get("snappiershot"));
        match section {
            None => Ok(Config::default()),
            Some(section) => section
                .clone()
                .try_into::<Config>()
                .map_err(|e| ConfigError::Invalid(e.message().to_string()))?
                .validate(),
        }
    }

    /// Read the configuration from the manifest at `path`.
    pub fn from_manifest(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Config::from_manifest_str(&text),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "could not read manifest, using default configuration");
                Ok(Config::default())
            }
        }
    }

    /// Configuration from the nearest `Cargo.toml` at or above `start`.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match start
            .ancestors()
            .map(|dir| dir.join(MANIFEST_NAME))
            .find(|candidate| candidate.is_file())
        {
            Some(manifest) => Config::from_manifest(&manifest),
            None => Ok(Config::default()),
        }
    }

    pub fn tolerances(&self) -> Tolerances {
        Tolerances::new(self.float_relative_tolerance, self.float_absolute_tolerance)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            full_diff: self.full_diff,
            indent: self.json_indentation,
        }
    }
}
