//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for callers, whatever UI they present.
//!
//! The API:
//! - **Dispatches** to the appropriate command function
//! - **Carries settings** commands need (the quota given to new patrons)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic, no I/O and no formatting.
//!
//! ## Generic Over SnapshotBackend
//!
//! `ShelfApi<B: SnapshotBackend>` is generic over the snapshot backend:
//! - Production: `ShelfApi<FsBackend>`
//! - Testing: `ShelfApi<MemBackend>`

use crate::commands::{
    self, catalog::SearchField, items::NewItem, patrons::NewPatron, CmdResult,
};
use crate::error::Result;
use crate::model::DEFAULT_QUOTA;
use crate::store::backend::SnapshotBackend;
use crate::store::{CatalogStore, Gateway};

pub struct ShelfApi<B: SnapshotBackend> {
    store: CatalogStore<B>,
    default_quota: usize,
}

impl<B: SnapshotBackend> ShelfApi<B> {
    /// Opens the catalog, hydrating it from the backend's snapshots.
    pub fn new(backend: B) -> Self {
        Self {
            store: CatalogStore::open(Gateway::new(backend)),
            default_quota: DEFAULT_QUOTA,
        }
    }

    pub fn with_default_quota(mut self, quota: usize) -> Self {
        self.default_quota = quota;
        self
    }

    pub fn store(&self) -> &CatalogStore<B> {
        &self.store
    }

    /// Warnings raised while loading the snapshots.
    pub fn load_warnings(&self) -> &[String] {
        self.store.load_warnings()
    }

    pub fn add_item(&mut self, item: NewItem) -> Result<CmdResult> {
        commands::items::add(&mut self.store, item)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<CmdResult> {
        commands::items::remove(&mut self.store, key)
    }

    pub fn show_item(&self, key: &str) -> Result<CmdResult> {
        commands::catalog::show(&self.store, key)
    }

    pub fn list_items(&self, sort_by: &str) -> Result<CmdResult> {
        commands::catalog::list(&self.store, sort_by)
    }

    pub fn search_items(&self, field: SearchField, term: &str) -> Result<CmdResult> {
        commands::catalog::search(&self.store, field, term)
    }

    pub fn register_patron(&mut self, patron: NewPatron) -> Result<CmdResult> {
        commands::patrons::register(&mut self.store, patron, self.default_quota)
    }

    pub fn show_patron(&self, key: &str) -> Result<CmdResult> {
        commands::patrons::show(&self.store, key)
    }

    pub fn set_quota(&mut self, key: &str, quota: usize) -> Result<CmdResult> {
        commands::patrons::set_quota(&mut self.store, key, quota)
    }

    pub fn borrow(&mut self, patron_key: &str, item_key: &str) -> Result<CmdResult> {
        commands::loans::borrow(&mut self.store, patron_key, item_key)
    }

    pub fn return_item(&mut self, patron_key: &str, item_key: &str) -> Result<CmdResult> {
        commands::loans::return_item(&mut self.store, patron_key, item_key)
    }

    pub fn wait(&mut self, patron_key: &str, item_key: &str) -> Result<CmdResult> {
        commands::loans::wait(&mut self.store, patron_key, item_key)
    }

    pub fn next_waiter(&mut self, item_key: &str) -> Result<CmdResult> {
        commands::loans::next(&mut self.store, item_key)
    }

    pub fn stats(&self) -> Result<CmdResult> {
        commands::stats::run(&self.store)
    }
}
