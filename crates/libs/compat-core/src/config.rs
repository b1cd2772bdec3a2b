use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};
use crate::matrix::VersionOrdering;
use crate::schema::SchemaRules;

pub const DEFAULT_CONFIG_FILE: &str = "compat.toml";

/// Locations and rules for one docs tree. Paths are relative to the tree root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompatConfig {
    pub reports_dir: PathBuf,
    pub reports_glob: String,
    pub progress_path: PathBuf,
    pub index_path: PathBuf,
    pub version_order: VersionOrdering,
    pub schema: SchemaRules,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("docs/compatibility/clients"),
            reports_glob: "*.md".into(),
            progress_path: PathBuf::from("docs/compatibility/progress.md"),
            index_path: PathBuf::from("docs/compatibility/index.md"),
            version_order: VersionOrdering::default(),
            schema: SchemaRules::default(),
        }
    }
}

/// Config paths joined onto a concrete root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPaths {
    pub reports_dir: PathBuf,
    pub progress_path: PathBuf,
    pub index_path: PathBuf,
}

impl CompatConfig {
    pub fn from_toml(input: &str, origin: &Path) -> Result<Self> {
        toml::from_str(input).map_err(|err| CompatError::Config {
            path: origin.to_path_buf(),
            detail: err.to_string(),
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| CompatError::io(path, err))?;
        Self::from_toml(&raw, path)
    }

    /// Loads `explicit` when given, else `<root>/compat.toml` if present,
    /// else defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        let candidate = root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("loading config from {}", candidate.display());
            return Self::load_from_path(&candidate);
        }
        Ok(Self::default())
    }

    pub fn example_toml() -> String {
        toml::to_string_pretty(&Self::default()).expect("valid compat config template")
    }

    pub fn paths(&self, root: &Path) -> DocPaths {
        DocPaths {
            reports_dir: root.join(&self.reports_dir),
            progress_path: root.join(&self.progress_path),
            index_path: root.join(&self.index_path),
        }
    }
}
