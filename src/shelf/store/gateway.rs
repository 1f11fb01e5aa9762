use super::backend::SnapshotBackend;
use crate::error::Result;
use crate::model::{Item, Patron};

/// What `Gateway::load` recovered, plus anything it had to skip.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub patrons: Vec<Patron>,
    pub warnings: Vec<String>,
}

/// Loads and saves the two whole-collection snapshots.
///
/// There is no partial recovery: a snapshot that fails to read or parse
/// contributes nothing and is reported as a warning. The two snapshots are
/// written one after the other, so a failure between them can leave them
/// out of step with each other.
pub struct Gateway<B: SnapshotBackend> {
    backend: B,
}

impl<B: SnapshotBackend> Gateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();

        match self.backend.load_items() {
            Ok(items) => snapshot.items = items,
            Err(e) => {
                tracing::warn!(error = %e, "item snapshot unreadable, starting with no items");
                snapshot.warnings.push(format!("items not loaded: {}", e));
            }
        }

        match self.backend.load_patrons() {
            Ok(patrons) => snapshot.patrons = patrons,
            Err(e) => {
                tracing::warn!(error = %e, "patron snapshot unreadable, starting with no patrons");
                snapshot.warnings.push(format!("patrons not loaded: {}", e));
            }
        }

        tracing::debug!(
            items = snapshot.items.len(),
            patrons = snapshot.patrons.len(),
            "snapshots loaded"
        );
        snapshot
    }

    /// Overwrites both snapshots. Items are written first; if that fails the
    /// patron snapshot is left as it was.
    pub fn save(&self, items: &[&Item], patrons: &[&Patron]) -> Result<()> {
        self.backend.save_items(items)?;
        self.backend.save_patrons(patrons)?;
        Ok(())
    }
}
