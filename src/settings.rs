//! Calculator settings, read from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use crate::errors::{Error, Result};
use crate::history::FileStorage;

pub const DEFAULT_STORAGE_DIR: &str = ".financial-calculator";
pub const DEFAULT_HOME_LOAN_HISTORY: &str = "homeloan";
pub const DEFAULT_INVESTMENT_HISTORY: &str = "investment";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding one JSON file per history collection.
    pub storage_dir: PathBuf,
    /// Collection name of saved home loans.
    pub home_loan_history: String,
    /// Collection name of saved investments.
    pub investment_history: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            home_loan_history: DEFAULT_HOME_LOAN_HISTORY.to_string(),
            investment_history: DEFAULT_INVESTMENT_HISTORY.to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`, or returns the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn file_storage(&self) -> Arc<FileStorage> {
        Arc::new(FileStorage::new(&self.storage_dir))
    }

    fn validate(&self) -> Result<()> {
        for name in [&self.home_loan_history, &self.investment_history] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(Error::Config(format!("invalid history name '{name}'")));
            }
        }
        if self.home_loan_history == self.investment_history {
            return Err(Error::Config("history names must differ".to_string()));
        }
        Ok(())
    }
}
