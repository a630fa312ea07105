use crate::model::Priority;
use crate::storage::project_dirs;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional `config.yml` in the user config directory.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the global board lives when no `.daybook` directory is found.
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub default_priority: Priority,
}

impl Config {
    pub fn load() -> Result<Config> {
        let path = project_dirs()?.config_dir().join("config.yml");
        Config::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&data).with_context(|| format!("parsing {:?}", path))
    }

    /// Directory for log files: next to the global board.
    pub fn log_dir(&self) -> Result<PathBuf> {
        let base = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()?.data_dir().to_path_buf(),
        };
        Ok(base.join("logs"))
    }
}
