use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ShelfError};
use crate::model::{Patron, Role};
use crate::store::backend::SnapshotBackend;
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct NewPatron {
    pub key: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn register<B: SnapshotBackend>(
    store: &mut CatalogStore<B>,
    new: NewPatron,
    default_quota: usize,
) -> Result<CmdResult> {
    if new.key.trim().is_empty() {
        return Err(ShelfError::Validation("patron key cannot be empty".into()));
    }
    if new.username.trim().is_empty() {
        return Err(ShelfError::Validation("username cannot be empty".into()));
    }

    let patron = match new.role {
        Role::Administrator => {
            Patron::administrator(new.key, new.username, new.password, new.name, new.email)
        }
        Role::Patron => Patron::new(new.key, new.username, new.password, new.name, new.email),
    }
    .with_quota(default_quota);

    let listed = patron.clone();
    if !store.add_patron(patron) {
        let reason = if store.find_patron(listed.key()).is_some() {
            format!("A patron with key {} already exists", listed.key())
        } else {
            format!("Username {} is already taken", listed.username)
        };
        return Ok(CmdResult::refused(reason));
    }
    let mut result = CmdResult::succeeded(format!("Registered {} ({})", listed.name, listed.role()));
    if !store.is_persisted() {
        result.add_message(CmdMessage::warning("Catalog could not be saved"));
    }
    Ok(result.with_listed_patrons(vec![listed]))
}

pub fn show<B: SnapshotBackend>(store: &CatalogStore<B>, key: &str) -> Result<CmdResult> {
    let patron = store
        .find_patron(key)
        .cloned()
        .ok_or_else(|| ShelfError::PatronNotFound(key.to_string()))?;

    // Loans of missing items are cleared on removal and on load.
    let borrowed: Vec<_> = patron
        .active_loans()
        .iter()
        .filter_map(|k| store.find_item(k).cloned())
        .collect();

    Ok(CmdResult::default()
        .with_listed_patrons(vec![patron])
        .with_listed_items(borrowed))
}

pub fn set_quota<B: SnapshotBackend>(
    store: &mut CatalogStore<B>,
    key: &str,
    quota: usize,
) -> Result<CmdResult> {
    if !store.set_quota(key, quota) {
        return Err(ShelfError::PatronNotFound(key.to_string()));
    }

    let mut result = CmdResult::succeeded(format!("Quota for {} set to {}", key, quota));
    if let Some(patron) = store.find_patron(key) {
        let held = patron.active_loans().len();
        if held > quota {
            result.add_message(CmdMessage::info(format!(
                "{} loans are kept; new loans wait until fewer than {} are held",
                held, quota
            )));
        }
    }
    if !store.is_persisted() {
        result.add_message(CmdMessage::warning("Catalog could not be saved"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use crate::store::mem_backend::MemBackend;

    fn new_patron(key: &str, username: &str) -> NewPatron {
        NewPatron {
            key: key.to_string(),
            username: username.to_string(),
            password: "pw".to_string(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            role: Role::Patron,
        }
    }

    #[test]
    fn register_applies_default_quota() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        let result = register(&mut store, new_patron("p1", "grace"), 3).unwrap();
        assert!(result.is_success());
        assert_eq!(store.find_patron("p1").unwrap().quota(), 3);
    }

    #[test]
    fn register_admin() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        let new = NewPatron {
            role: Role::Administrator,
            ..new_patron("a1", "root")
        };
        register(&mut store, new, 5).unwrap();
        assert_eq!(store.find_patron("a1").unwrap().role(), Role::Administrator);
    }

    #[test]
    fn register_taken_username_is_refused() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        register(&mut store, new_patron("p1", "grace"), 5).unwrap();
        let result = register(&mut store, new_patron("p2", "grace"), 5).unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("already taken"));
        assert_eq!(store.patron_count(), 1);
    }

    #[test]
    fn register_taken_key_is_refused() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        register(&mut store, new_patron("p1", "grace"), 5).unwrap();
        let result = register(&mut store, new_patron("p1", "ada"), 5).unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("key p1 already exists"));
        assert!(result.listed_patrons.is_empty());
        assert_eq!(store.find_patron("p1").unwrap().username, "grace");
    }

    #[test]
    fn register_empty_key_is_an_error() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        let result = register(&mut store, new_patron("", "grace"), 5);
        assert!(matches!(result, Err(ShelfError::Validation(_))));
    }

    #[test]
    fn show_lists_borrowed_items() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        register(&mut store, new_patron("p1", "grace"), 5).unwrap();
        store.add_item(Item::new("k1", "Cosmos", "Sagan", "Science", 1980, 1).unwrap());
        store.add_item(Item::new("k2", "Contact", "Sagan", "Fiction", 1985, 1).unwrap());
        assert!(store.borrow("p1", "k2"));

        let result = show(&store, "p1").unwrap();
        assert_eq!(result.listed_patrons.len(), 1);
        assert_eq!(result.listed_items.len(), 1);
        assert_eq!(result.listed_items[0].key(), "k2");
    }

    #[test]
    fn set_quota_below_held_loans_explains() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        register(&mut store, new_patron("p1", "grace"), 5).unwrap();
        store.add_item(Item::new("k1", "A", "x", "y", 1, 1).unwrap());
        store.add_item(Item::new("k2", "B", "x", "y", 1, 1).unwrap());
        assert!(store.borrow("p1", "k1"));
        assert!(store.borrow("p1", "k2"));

        let result = set_quota(&mut store, "p1", 1).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert_eq!(store.find_patron("p1").unwrap().active_loans().len(), 2);
    }

    #[test]
    fn set_quota_unknown_patron_is_an_error() {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        assert!(matches!(
            set_quota(&mut store, "ghost", 1),
            Err(ShelfError::PatronNotFound(_))
        ));
    }
}
