use super::backend::SnapshotBackend;
use crate::error::{Result, ShelfError};
use crate::model::{Item, Patron};
use std::cell::RefCell;

/// In-memory snapshot backend for testing.
///
/// Snapshots are kept as serialized JSON text so that the same encoding
/// path as `FsBackend` is exercised, and so tests can plant malformed
/// content. Uses `RefCell` because the store is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    items: RefCell<Option<String>>,
    patrons: RefCell<Option<String>>,
    simulate_write_error: RefCell<bool>,
    writes: RefCell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds raw item snapshot content, valid or not.
    pub fn with_raw_items(self, raw: impl Into<String>) -> Self {
        *self.items.borrow_mut() = Some(raw.into());
        self
    }

    /// Seeds raw patron snapshot content, valid or not.
    pub fn with_raw_patrons(self, raw: impl Into<String>) -> Self {
        *self.patrons.borrow_mut() = Some(raw.into());
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    pub fn raw_items(&self) -> Option<String> {
        self.items.borrow().clone()
    }

    pub fn raw_patrons(&self) -> Option<String> {
        self.patrons.borrow().clone()
    }

    /// Number of successful snapshot writes (items and patrons counted apart).
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    fn write(&self, slot: &RefCell<Option<String>>, content: String) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(ShelfError::Store("Simulated write error".to_string()));
        }
        *slot.borrow_mut() = Some(content);
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

impl SnapshotBackend for MemBackend {
    fn load_items(&self) -> Result<Vec<Item>> {
        match self.items.borrow().as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(ShelfError::Serialization),
            None => Ok(Vec::new()),
        }
    }

    fn save_items(&self, items: &[&Item]) -> Result<()> {
        let content = serde_json::to_string(items).map_err(ShelfError::Serialization)?;
        self.write(&self.items, content)
    }

    fn load_patrons(&self) -> Result<Vec<Patron>> {
        match self.patrons.borrow().as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(ShelfError::Serialization),
            None => Ok(Vec::new()),
        }
    }

    fn save_patrons(&self, patrons: &[&Patron]) -> Result<()> {
        let content = serde_json::to_string(patrons).map_err(ShelfError::Serialization)?;
        self.write(&self.patrons, content)
    }
}
