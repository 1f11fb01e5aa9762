use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::{Item, Patron};
use crate::store::backend::SnapshotBackend;
use crate::store::CatalogStore;

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub most_borrowed: Option<Item>,
    pub most_active: Option<Patron>,
    pub total_items: usize,
    pub total_patrons: usize,
    pub copies_out: u64,
}

pub fn run<B: SnapshotBackend>(store: &CatalogStore<B>) -> Result<CmdResult> {
    let stats = Stats {
        most_borrowed: store.most_borrowed_item().cloned(),
        most_active: store.most_active_patron().cloned(),
        total_items: store.item_count(),
        total_patrons: store.patron_count(),
        copies_out: store
            .items()
            .iter()
            .map(|i| u64::from(i.borrowed_copies()))
            .sum(),
    };

    Ok(CmdResult {
        stats: Some(stats),
        ..Default::default()
    })
}
