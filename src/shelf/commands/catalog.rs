use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ShelfError};
use crate::model::Item;
use crate::store::backend::SnapshotBackend;
use crate::store::{CatalogStore, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Creator,
    Category,
}

pub fn show<B: SnapshotBackend>(store: &CatalogStore<B>, key: &str) -> Result<CmdResult> {
    let item = store
        .find_item(key)
        .cloned()
        .ok_or_else(|| ShelfError::ItemNotFound(key.to_string()))?;
    Ok(CmdResult::default().with_listed_items(vec![item]))
}

/// Lists the whole catalog sorted by `sort_by` ("title", "creator", "year";
/// anything else sorts by key).
pub fn list<B: SnapshotBackend>(store: &CatalogStore<B>, sort_by: &str) -> Result<CmdResult> {
    let items = owned(store.sorted_items(SortKey::parse(sort_by)));
    let mut result = CmdResult::default();
    if items.is_empty() {
        result.add_message(CmdMessage::info("The catalog is empty."));
    }
    Ok(result.with_listed_items(items))
}

pub fn search<B: SnapshotBackend>(
    store: &CatalogStore<B>,
    field: SearchField,
    term: &str,
) -> Result<CmdResult> {
    let mut found = match field {
        SearchField::Title => store.find_by_title(term),
        SearchField::Creator => store.find_by_creator(term),
        SearchField::Category => store.find_by_category(term),
    };
    found.sort_by(|a, b| a.key().cmp(b.key()));

    let items = owned(found);
    let mut result = CmdResult::default();
    if items.is_empty() {
        result.add_message(CmdMessage::info(format!("No items match \"{}\".", term)));
    }
    Ok(result.with_listed_items(items))
}

fn owned(items: Vec<&Item>) -> Vec<Item> {
    items.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn store() -> CatalogStore<MemBackend> {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        store.add_item(Item::new("b", "The Hobbit", "Tolkien", "Fantasy", 1937, 1).unwrap());
        store.add_item(Item::new("a", "Hyperion", "Dan Simmons", "SciFi", 1989, 2).unwrap());
        store.add_item(Item::new("c", "The Silmarillion", "Tolkien", "Fantasy", 1977, 1).unwrap());
        store
    }

    fn keys(result: &CmdResult) -> Vec<&str> {
        result.listed_items.iter().map(|i| i.key()).collect()
    }

    #[test]
    fn list_sorts_by_requested_field() {
        let store = store();
        assert_eq!(keys(&list(&store, "title").unwrap()), vec!["a", "b", "c"]);
        assert_eq!(keys(&list(&store, "year").unwrap()), vec!["b", "c", "a"]);
        assert_eq!(keys(&list(&store, "whatever").unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn list_empty_catalog_says_so() {
        let store = CatalogStore::with_backend(MemBackend::new());
        let result = list(&store, "key").unwrap();
        assert!(result.listed_items.is_empty());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn search_by_each_field() {
        let store = store();
        assert_eq!(
            keys(&search(&store, SearchField::Title, "the").unwrap()),
            vec!["b", "c"]
        );
        assert_eq!(
            keys(&search(&store, SearchField::Creator, "TOLKIEN").unwrap()),
            vec!["b", "c"]
        );
        assert_eq!(
            keys(&search(&store, SearchField::Category, "scifi").unwrap()),
            vec!["a"]
        );
    }

    #[test]
    fn search_without_matches_has_message() {
        let store = store();
        let result = search(&store, SearchField::Category, "Fan").unwrap();
        assert!(result.listed_items.is_empty());
        assert!(result.messages[0].content.contains("No items match"));
    }

    #[test]
    fn show_unknown_item_is_an_error() {
        let store = store();
        assert!(matches!(
            show(&store, "zz"),
            Err(ShelfError::ItemNotFound(_))
        ));
        assert_eq!(keys(&show(&store, "a").unwrap()), vec!["a"]);
    }
}
