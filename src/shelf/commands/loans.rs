use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Capability, LoanRefusal};
use crate::store::backend::SnapshotBackend;
use crate::store::{CatalogStore, LoanFailure};

pub fn borrow<B: SnapshotBackend>(
    store: &mut CatalogStore<B>,
    patron_key: &str,
    item_key: &str,
) -> Result<CmdResult> {
    match store.try_borrow(patron_key, item_key) {
        Ok(()) => {
            let mut result = loan_result(store, item_key, "Borrowed");
            if let Some(patron) = store.find_patron(patron_key) {
                result.add_message(CmdMessage::info(format!(
                    "{} of {} loans in use",
                    patron.active_loans().len(),
                    patron.quota()
                )));
            }
            Ok(with_save_warning(store, result))
        }
        Err(LoanFailure::Refused(LoanRefusal::NoCopiesAvailable)) => {
            let mut result = CmdResult::refused(format!("Cannot borrow {}: no copies available", item_key));
            result.add_message(CmdMessage::info(format!(
                "Use `shelf wait {} {}` to join the waitlist",
                patron_key, item_key
            )));
            Ok(result)
        }
        Err(failure) => Ok(CmdResult::refused(format!(
            "Cannot borrow {}: {}",
            item_key, failure
        ))),
    }
}

pub fn return_item<B: SnapshotBackend>(
    store: &mut CatalogStore<B>,
    patron_key: &str,
    item_key: &str,
) -> Result<CmdResult> {
    match store.try_return(patron_key, item_key) {
        Ok(()) => {
            let mut result = loan_result(store, item_key, "Returned");
            if let Some(next) = store.find_item(item_key).and_then(|i| i.waitlist().next()) {
                result.add_message(CmdMessage::info(format!(
                    "{} is next on the waitlist",
                    next
                )));
            }
            Ok(with_save_warning(store, result))
        }
        Err(failure) => Ok(CmdResult::refused(format!(
            "Cannot return {}: {}",
            item_key, failure
        ))),
    }
}

/// Adds a patron to an item's waitlist.
pub fn wait<B: SnapshotBackend>(
    store: &mut CatalogStore<B>,
    patron_key: &str,
    item_key: &str,
) -> Result<CmdResult> {
    let Some(patron) = store.find_patron(patron_key) else {
        return Ok(CmdResult::refused(format!("No patron with key {}", patron_key)));
    };
    if !patron.has_capability(Capability::Borrow) {
        return Ok(CmdResult::refused(format!(
            "{} is not allowed to borrow",
            patron_key
        )));
    }
    if store.find_item(item_key).is_none() {
        return Ok(CmdResult::refused(format!("No item with key {}", item_key)));
    }

    if !store.enqueue_waiter(item_key, patron_key) {
        return Ok(CmdResult::refused(format!(
            "{} is already waiting for {}",
            patron_key, item_key
        )));
    }

    let position = store
        .waitlist(item_key)
        .map(|w| w.len())
        .unwrap_or_default();
    let result = CmdResult::succeeded(format!(
        "{} joined the waitlist for {} at position {}",
        patron_key, item_key, position
    ));
    Ok(with_save_warning(store, result))
}

/// Takes the next patron off an item's waitlist.
pub fn next<B: SnapshotBackend>(store: &mut CatalogStore<B>, item_key: &str) -> Result<CmdResult> {
    if store.find_item(item_key).is_none() {
        return Ok(CmdResult::refused(format!("No item with key {}", item_key)));
    }

    match store.dequeue_waiter(item_key) {
        Some(patron_key) => {
            let result = CmdResult::succeeded(format!(
                "Next for {}: {}",
                item_key, patron_key
            ));
            Ok(with_save_warning(store, result))
        }
        None => {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info(format!(
                "Nobody is waiting for {}",
                item_key
            )));
            Ok(result)
        }
    }
}

fn loan_result<B: SnapshotBackend>(store: &CatalogStore<B>, item_key: &str, verb: &str) -> CmdResult {
    match store.find_item(item_key) {
        Some(item) => CmdResult::succeeded(format!("{}: {}", verb, item.title))
            .with_listed_items(vec![item.clone()]),
        None => CmdResult::succeeded(format!("{}: {}", verb, item_key)),
    }
}

fn with_save_warning<B: SnapshotBackend>(store: &CatalogStore<B>, mut result: CmdResult) -> CmdResult {
    if !store.is_persisted() {
        result.add_message(CmdMessage::warning("Catalog could not be saved"));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, Patron};
    use crate::store::mem_backend::MemBackend;

    fn store() -> CatalogStore<MemBackend> {
        let mut store = CatalogStore::with_backend(MemBackend::new());
        store.add_item(Item::new("k1", "Dune", "Herbert", "Fiction", 1965, 1).unwrap());
        store.add_patron(Patron::new("p1", "ada", "pw", "Ada", "a@example.com"));
        store.add_patron(Patron::new("p2", "bob", "pw", "Bob", "b@example.com"));
        store.add_patron(Patron::administrator("a1", "root", "pw", "Root", "r@example.com"));
        store
    }

    #[test]
    fn borrow_lists_item_and_usage() {
        let mut store = store();
        let result = borrow(&mut store, "p1", "k1").unwrap();
        assert!(result.is_success());
        assert_eq!(result.listed_items[0].available_copies(), 0);
        assert!(result.messages.iter().any(|m| m.content == "1 of 5 loans in use"));
    }

    #[test]
    fn borrow_without_copies_suggests_waitlist() {
        let mut store = store();
        borrow(&mut store, "p1", "k1").unwrap();
        let result = borrow(&mut store, "p2", "k1").unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("no copies available"));
        assert!(result.messages[1].content.contains("shelf wait p2 k1"));
    }

    #[test]
    fn borrow_by_admin_is_refused() {
        let mut store = store();
        let result = borrow(&mut store, "a1", "k1").unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("not allowed to borrow"));
    }

    #[test]
    fn return_mentions_next_waiter_without_promoting() {
        let mut store = store();
        borrow(&mut store, "p1", "k1").unwrap();
        wait(&mut store, "p2", "k1").unwrap();

        let result = return_item(&mut store, "p1", "k1").unwrap();
        assert!(result.is_success());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "p2 is next on the waitlist"));
        assert!(store.find_patron("p2").unwrap().active_loans().is_empty());
        assert_eq!(store.waitlist("k1").unwrap(), vec!["p2"]);
    }

    #[test]
    fn return_of_unborrowed_item_is_refused() {
        let mut store = store();
        let result = return_item(&mut store, "p1", "k1").unwrap();
        assert!(!result.is_success());
        assert!(result.messages[0].content.contains("not borrowed by this patron"));
    }

    #[test]
    fn wait_reports_position_and_rejects_duplicates() {
        let mut store = store();
        let first = wait(&mut store, "p1", "k1").unwrap();
        assert!(first.messages[0].content.ends_with("position 1"));
        let second = wait(&mut store, "p2", "k1").unwrap();
        assert!(second.messages[0].content.ends_with("position 2"));

        let again = wait(&mut store, "p1", "k1").unwrap();
        assert!(!again.is_success());
    }

    #[test]
    fn wait_rejects_unknown_keys_and_admins() {
        let mut store = store();
        assert!(!wait(&mut store, "ghost", "k1").unwrap().is_success());
        assert!(!wait(&mut store, "p1", "ghost").unwrap().is_success());
        assert!(!wait(&mut store, "a1", "k1").unwrap().is_success());
    }

    #[test]
    fn next_pops_in_order() {
        let mut store = store();
        wait(&mut store, "p2", "k1").unwrap();
        wait(&mut store, "p1", "k1").unwrap();

        assert_eq!(next(&mut store, "k1").unwrap().messages[0].content, "Next for k1: p2");
        assert_eq!(next(&mut store, "k1").unwrap().messages[0].content, "Next for k1: p1");

        let empty = next(&mut store, "k1").unwrap();
        assert!(empty.is_success());
        assert!(empty.messages[0].content.starts_with("Nobody"));
        assert!(!next(&mut store, "ghost").unwrap().is_success());
    }
}
