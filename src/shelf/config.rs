//! # Configuration
//!
//! Stored as `shelf.json` in the data directory. A missing file means
//! defaults; missing keys fall back one by one.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `items_file` | `items.json` | Item snapshot, relative to the data dir unless absolute |
//! | `patrons_file` | `patrons.json` | Patron snapshot, same rule |
//! | `default_quota` | `5` | Quota given to newly registered patrons |

use crate::error::{Result, ShelfError};
use crate::model::DEFAULT_QUOTA;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "shelf.json";
const DEFAULT_ITEMS_FILE: &str = "items.json";
const DEFAULT_PATRONS_FILE: &str = "patrons.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelfConfig {
    #[serde(default = "default_items_file")]
    pub items_file: PathBuf,

    #[serde(default = "default_patrons_file")]
    pub patrons_file: PathBuf,

    #[serde(default = "default_quota")]
    pub default_quota: usize,
}

fn default_items_file() -> PathBuf {
    PathBuf::from(DEFAULT_ITEMS_FILE)
}

fn default_patrons_file() -> PathBuf {
    PathBuf::from(DEFAULT_PATRONS_FILE)
}

fn default_quota() -> usize {
    DEFAULT_QUOTA
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            items_file: default_items_file(),
            patrons_file: default_patrons_file(),
            default_quota: DEFAULT_QUOTA,
        }
    }
}

impl ShelfConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let config_path = data_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ShelfError::Io)?;
        let config: ShelfConfig =
            serde_json::from_str(&content).map_err(ShelfError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, data_dir: P) -> Result<()> {
        let data_dir = data_dir.as_ref();

        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(ShelfError::Io)?;
        }

        let config_path = data_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ShelfError::Serialization)?;
        fs::write(config_path, content).map_err(ShelfError::Io)?;
        Ok(())
    }

    pub fn items_path<P: AsRef<Path>>(&self, data_dir: P) -> PathBuf {
        data_dir.as_ref().join(&self.items_file)
    }

    pub fn patrons_path<P: AsRef<Path>>(&self, data_dir: P) -> PathBuf {
        data_dir.as_ref().join(&self.patrons_file)
    }
}
