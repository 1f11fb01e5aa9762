use crate::error::Result;
use crate::model::{Item, Patron};

/// Abstract interface for raw snapshot I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `Gateway` decides what a missing or unreadable snapshot means.
pub trait SnapshotBackend {
    // --- Items ---

    /// Load the item snapshot.
    /// Returns an empty list if the snapshot does not exist yet.
    /// Returns Err on I/O failure or malformed content.
    fn load_items(&self) -> Result<Vec<Item>>;

    /// Overwrite the item snapshot with the given records.
    fn save_items(&self, items: &[&Item]) -> Result<()>;

    // --- Patrons ---

    /// Load the patron snapshot. Same contract as `load_items`.
    fn load_patrons(&self) -> Result<Vec<Patron>>;

    /// Overwrite the patron snapshot with the given records.
    fn save_patrons(&self, patrons: &[&Patron]) -> Result<()>;
}
