//! # Storage Layer
//!
//! Two layers sit here:
//!
//! 1. **Snapshots**: [`backend::SnapshotBackend`] reads and writes the two
//!    whole-collection snapshots (items, patrons). [`gateway::Gateway`] wraps
//!    a backend and decides what a missing or broken snapshot means.
//! 2. **Catalog**: [`catalog::CatalogStore`] owns every item and patron in
//!    memory, applies borrow/return transitions, and flushes both snapshots
//!    after each successful mutation.
//!
//! ## Snapshot Semantics
//!
//! - **Absent** snapshot: not an error, the collection starts empty.
//! - **Malformed** snapshot: a warning, the collection starts empty. A single
//!   bad record discards the whole collection.
//! - **Save**: the entire collection is rewritten. Each file is replaced
//!   atomically, but the pair is not: a failure after the item write leaves
//!   the patron file one step behind.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: JSON files at two explicitly configured paths.
//! - [`mem_backend::MemBackend`]: In-memory JSON for tests, with write-failure
//!   simulation.
//!
//! ## Storage Layout
//!
//! With the default configuration:
//!
//! ```text
//! <data dir>/
//! ├── shelf.json      # Configuration
//! ├── items.json      # Item snapshot (JSON array)
//! └── patrons.json    # Patron snapshot (JSON array)
//! ```
//!
//! ## Concurrency
//!
//! None. The store is used by one caller at a time and holds no locks. Code
//! that adds concurrent access must put the whole borrow/return plus flush
//! sequence behind one lock over the store, since a loan changes an item and
//! a patron together.

pub mod backend;
pub mod catalog;
pub mod fs_backend;
pub mod gateway;
pub mod mem_backend;

pub use catalog::{CatalogStore, LoanFailure, SortKey};
pub use gateway::{Gateway, Snapshot};
