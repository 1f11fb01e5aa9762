use super::backend::SnapshotBackend;
use crate::error::{Result, ShelfError};
use crate::model::{Item, Patron};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed snapshots: one JSON array per collection.
pub struct FsBackend {
    items_path: PathBuf,
    patrons_path: PathBuf,
}

impl FsBackend {
    pub fn new(items_path: impl Into<PathBuf>, patrons_path: impl Into<PathBuf>) -> Self {
        Self {
            items_path: items_path.into(),
            patrons_path: patrons_path.into(),
        }
    }

    pub fn items_path(&self) -> &Path {
        &self.items_path
    }

    pub fn patrons_path(&self) -> &Path {
        &self.patrons_path
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(ShelfError::Io)?;
            }
        }
        Ok(())
    }

    fn load_records<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(ShelfError::Io)?;
        let records: Vec<T> = serde_json::from_str(&content).map_err(ShelfError::Serialization)?;
        Ok(records)
    }

    fn save_records<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<()> {
        self.ensure_parent(path)?;
        let content = serde_json::to_string_pretty(records).map_err(ShelfError::Serialization)?;

        // Atomic write: a crash leaves either the old or the new snapshot.
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ShelfError::Store(format!("invalid snapshot path: {}", path.display())))?;
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&tmp_path, content).map_err(ShelfError::Io)?;
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            ShelfError::Io(e)
        })?;

        Ok(())
    }
}

impl SnapshotBackend for FsBackend {
    fn load_items(&self) -> Result<Vec<Item>> {
        self.load_records(&self.items_path)
    }

    fn save_items(&self, items: &[&Item]) -> Result<()> {
        self.save_records(&self.items_path, items)
    }

    fn load_patrons(&self) -> Result<Vec<Patron>> {
        self.load_records(&self.patrons_path)
    }

    fn save_patrons(&self, patrons: &[&Patron]) -> Result<()> {
        self.save_records(&self.patrons_path, patrons)
    }
}
