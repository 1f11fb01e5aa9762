use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Item;
use crate::store::backend::SnapshotBackend;
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct NewItem {
    pub key: String,
    pub title: String,
    pub creator: String,
    pub category: String,
    pub year: i32,
    pub copies: i64,
}

pub fn add<B: SnapshotBackend>(store: &mut CatalogStore<B>, new: NewItem) -> Result<CmdResult> {
    let item = Item::new(
        new.key,
        new.title,
        new.creator,
        new.category,
        new.year,
        new.copies,
    )?;

    let listed = item.clone();
    if !store.add_item(item) {
        return Ok(CmdResult::refused(format!(
            "An item with key {} already exists",
            listed.key()
        )));
    }

    let mut result = CmdResult::succeeded(format!("Item added: {}", listed.title));
    if !store.is_persisted() {
        result.add_message(CmdMessage::warning("Catalog could not be saved"));
    }
    Ok(result.with_listed_items(vec![listed]))
}

pub fn remove<B: SnapshotBackend>(store: &mut CatalogStore<B>, key: &str) -> Result<CmdResult> {
    let title = store
        .find_item(key)
        .map(|item| item.title.clone())
        .unwrap_or_default();
    let holders = store
        .patrons()
        .iter()
        .filter(|p| p.has_borrowed(key))
        .count();

    if !store.remove_item(key) {
        return Ok(CmdResult::refused(format!("No item with key {}", key)));
    }
    let mut result = CmdResult::succeeded(format!("Item removed: {}", title));
    if holders > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} outstanding loan(s) of this item were cleared",
            holders
        )));
    }
    if !store.is_persisted() {
        result.add_message(CmdMessage::warning("Catalog could not be saved"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShelfError;
    use crate::model::Patron;
    use crate::store::mem_backend::MemBackend;

    fn new_item(key: &str, copies: i64) -> NewItem {
        NewItem {
            key: key.to_string(),
            title: format!("Title {}", key),
            creator: "Author".to_string(),
            category: "Fiction".to_string(),
            year: 2000,
            copies,
        }
    }

    #[test]
    fn add_lists_the_new_item() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        let result = add(&mut store, new_item("k1", 2)).unwrap();
        assert!(result.is_success());
        assert_eq!(result.listed_items.len(), 1);
        assert_eq!(result.listed_items[0].available_copies(), 2);
        assert!(store.find_item("k1").is_some());
    }

    #[test]
    fn add_with_negative_copies_is_an_error() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        let result = add(&mut store, new_item("k1", -3));
        assert!(matches!(result, Err(ShelfError::Validation(_))));
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn add_duplicate_is_refused() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        add(&mut store, new_item("k1", 1)).unwrap();
        let writes = store.gateway().backend().write_count();
        let result = add(&mut store, new_item("k1", 4)).unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("already exists"));
        assert!(result.listed_items.is_empty());
        assert_eq!(store.find_item("k1").unwrap().total_copies(), 1);
        assert_eq!(store.gateway().backend().write_count(), writes);
    }

    #[test]
    fn add_warns_when_save_fails() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        store.gateway().backend().set_simulate_write_error(true);
        let result = add(&mut store, new_item("k1", 1)).unwrap();
        assert!(result.is_success());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("could not be saved")));
    }

    #[test]
    fn remove_reports_cleared_loans() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        add(&mut store, new_item("k1", 2)).unwrap();
        store.add_patron(Patron::new("p1", "ada", "pw", "Ada", "a@example.com"));
        assert!(store.borrow("p1", "k1"));

        let result = remove(&mut store, "k1").unwrap();
        assert!(result.is_success());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("1 outstanding loan")));
        assert!(store.find_patron("p1").unwrap().active_loans().is_empty());
    }

    #[test]
    fn remove_unknown_is_refused() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        let result = remove(&mut store, "nope").unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("No item with key nope"));
        assert_eq!(store.gateway().backend().write_count(), 0);
    }
}
