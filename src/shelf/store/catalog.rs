use super::backend::SnapshotBackend;
use super::gateway::Gateway;
use crate::model::{Capability, Item, LoanRefusal, Patron, RefusalKind};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Field used by [`CatalogStore::sorted_items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    Creator,
    Year,
    #[default]
    Key,
}

impl SortKey {
    /// Parses a sort field name. Anything unrecognized sorts by key.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "title" => SortKey::Title,
            "creator" | "author" => SortKey::Creator,
            "year" => SortKey::Year,
            _ => SortKey::Key,
        }
    }
}

/// Why a borrow or return through the store did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanFailure {
    PatronNotFound(String),
    ItemNotFound(String),
    Refused(LoanRefusal),
}

impl fmt::Display for LoanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanFailure::PatronNotFound(key) => write!(f, "no patron with key {}", key),
            LoanFailure::ItemNotFound(key) => write!(f, "no item with key {}", key),
            LoanFailure::Refused(refusal) => write!(f, "{}", refusal),
        }
    }
}

/// The authoritative in-memory catalog.
///
/// Owns every `Item` and `Patron` and is the only code that mutates them.
/// Every successful mutation is followed by a synchronous flush of both
/// snapshots through the [`Gateway`]. A failed flush is logged and leaves
/// the in-memory change in place; [`CatalogStore::is_persisted`] then
/// reports false until a later flush succeeds.
pub struct CatalogStore<B: SnapshotBackend> {
    items: HashMap<String, Item>,
    patrons: HashMap<String, Patron>,
    gateway: Gateway<B>,
    persisted: bool,
    load_warnings: Vec<String>,
}

impl<B: SnapshotBackend> CatalogStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self::open(Gateway::new(backend))
    }

    /// Hydrates the store from the gateway's snapshots.
    pub fn open(gateway: Gateway<B>) -> Self {
        let snapshot = gateway.load();
        let mut load_warnings = snapshot.warnings;

        let mut items = HashMap::with_capacity(snapshot.items.len());
        for item in snapshot.items {
            let key = item.key().to_string();
            if items.insert(key.clone(), item).is_some() {
                tracing::warn!(item = %key, "duplicate item record, keeping the last one");
                load_warnings.push(format!("duplicate item record {}", key));
            }
        }

        let mut patrons = HashMap::with_capacity(snapshot.patrons.len());
        for patron in snapshot.patrons {
            let key = patron.key().to_string();
            if patrons.insert(key.clone(), patron).is_some() {
                tracing::warn!(patron = %key, "duplicate patron record, keeping the last one");
                load_warnings.push(format!("duplicate patron record {}", key));
            }
        }

        // Same rule as `remove_item`: an active loan must name a catalog item.
        // Cleared loans reach storage with the next flush; loading alone
        // never rewrites a snapshot.
        for patron in patrons.values_mut() {
            let dangling: Vec<String> = patron
                .active_loans()
                .iter()
                .filter(|loan| !items.contains_key(loan.as_str()))
                .cloned()
                .collect();
            for loan in dangling {
                patron.forget_loan(&loan);
                tracing::warn!(patron = %patron.key(), item = %loan, "active loan references a missing item, cleared it");
                load_warnings.push(format!(
                    "cleared loan of missing item {} held by {}",
                    loan,
                    patron.key()
                ));
            }
        }

        Self {
            items,
            patrons,
            gateway,
            persisted: true,
            load_warnings,
        }
    }

    pub fn gateway(&self) -> &Gateway<B> {
        &self.gateway
    }

    /// Problems found while loading; empty for a clean start.
    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    /// False when the last flush failed and memory is ahead of storage.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn flush(&mut self) {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by(|a, b| a.key().cmp(b.key()));
        let mut patrons: Vec<&Patron> = self.patrons.values().collect();
        patrons.sort_by(|a, b| a.key().cmp(b.key()));

        match self.gateway.save(&items, &patrons) {
            Ok(()) => self.persisted = true,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist catalog, continuing with unsaved changes");
                self.persisted = false;
            }
        }
    }

    // --- Items ---

    /// Inserts a new item. Fails if the key is taken; there is no
    /// update-in-place through this call.
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.items.contains_key(item.key()) {
            return false;
        }
        tracing::debug!(item = %item.key(), copies = item.total_copies(), "item added");
        self.items.insert(item.key().to_string(), item);
        self.flush();
        true
    }

    /// Deletes an item even while copies are on loan. Patrons holding it
    /// lose the key from their active loans; their history keeps it.
    pub fn remove_item(&mut self, key: &str) -> bool {
        if self.items.remove(key).is_none() {
            return false;
        }

        let mut cleared = 0;
        for patron in self.patrons.values_mut() {
            if patron.forget_loan(key) {
                cleared += 1;
            }
        }
        if cleared > 0 {
            tracing::warn!(item = %key, loans = cleared, "removed item had outstanding loans, cleared them");
        } else {
            tracing::debug!(item = %key, "item removed");
        }

        self.flush();
        true
    }

    pub fn find_item(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }

    /// Case-insensitive substring match on the title.
    pub fn find_by_title(&self, fragment: &str) -> Vec<&Item> {
        let needle = fragment.to_lowercase();
        self.filter_items(|item| item.title.to_lowercase().contains(&needle))
    }

    /// Case-insensitive substring match on the creator.
    pub fn find_by_creator(&self, fragment: &str) -> Vec<&Item> {
        let needle = fragment.to_lowercase();
        self.filter_items(|item| item.creator.to_lowercase().contains(&needle))
    }

    /// Case-insensitive exact match on the category.
    pub fn find_by_category(&self, category: &str) -> Vec<&Item> {
        let wanted = category.to_lowercase();
        self.filter_items(|item| item.category.to_lowercase() == wanted)
    }

    fn filter_items<F: Fn(&Item) -> bool>(&self, predicate: F) -> Vec<&Item> {
        self.items.values().filter(|item| predicate(item)).collect()
    }

    /// Every item, ascending by the given field. Equal values fall back to key order.
    pub fn sorted_items(&self, by: SortKey) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by(|a, b| {
            let primary = match by {
                SortKey::Title => a.title.cmp(&b.title),
                SortKey::Creator => a.creator.cmp(&b.creator),
                SortKey::Year => a.year.cmp(&b.year),
                SortKey::Key => Ordering::Equal,
            };
            primary.then_with(|| a.key().cmp(b.key()))
        });
        items
    }

    pub fn items(&self) -> Vec<&Item> {
        self.sorted_items(SortKey::Key)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    // --- Patrons ---

    /// Registers an account. Fails if the key or the username is taken.
    pub fn add_patron(&mut self, patron: Patron) -> bool {
        if self.patrons.contains_key(patron.key())
            || self.find_patron_by_username(&patron.username).is_some()
        {
            return false;
        }
        tracing::debug!(patron = %patron.key(), role = %patron.role(), "patron registered");
        self.patrons.insert(patron.key().to_string(), patron);
        self.flush();
        true
    }

    pub fn find_patron(&self, key: &str) -> Option<&Patron> {
        self.patrons.get(key)
    }

    pub fn find_patron_by_username(&self, username: &str) -> Option<&Patron> {
        self.patrons.values().find(|p| p.username == username)
    }

    pub fn patrons(&self) -> Vec<&Patron> {
        let mut patrons: Vec<&Patron> = self.patrons.values().collect();
        patrons.sort_by(|a, b| a.key().cmp(b.key()));
        patrons
    }

    pub fn patron_count(&self) -> usize {
        self.patrons.len()
    }

    /// Changes a patron's quota. Loans above the new quota are kept.
    pub fn set_quota(&mut self, patron_key: &str, quota: usize) -> bool {
        let Some(patron) = self.patrons.get_mut(patron_key) else {
            return false;
        };
        patron.set_quota(quota);
        if patron.active_loans().len() > quota {
            tracing::info!(
                patron = %patron_key,
                quota,
                held = patron.active_loans().len(),
                "quota lowered below current loans"
            );
        }
        self.flush();
        true
    }

    // --- Loans ---

    pub fn borrow(&mut self, patron_key: &str, item_key: &str) -> bool {
        self.try_borrow(patron_key, item_key).is_ok()
    }

    pub fn return_item(&mut self, patron_key: &str, item_key: &str) -> bool {
        self.try_return(patron_key, item_key).is_ok()
    }

    /// Like [`CatalogStore::borrow`], but says why a loan did not start.
    pub fn try_borrow(&mut self, patron_key: &str, item_key: &str) -> Result<(), LoanFailure> {
        let (patron, item) = self.resolve(patron_key, item_key)?;

        let outcome = if patron.has_capability(Capability::Borrow) {
            patron.borrow(item)
        } else {
            Err(LoanRefusal::NotPermitted)
        };

        match outcome {
            Ok(()) => {
                tracing::debug!(patron = %patron_key, item = %item_key, "loan started");
                self.flush();
                Ok(())
            }
            Err(refusal) => {
                log_refusal("borrow", patron_key, item_key, refusal);
                Err(LoanFailure::Refused(refusal))
            }
        }
    }

    /// Like [`CatalogStore::return_item`], but says why a loan did not end.
    pub fn try_return(&mut self, patron_key: &str, item_key: &str) -> Result<(), LoanFailure> {
        let (patron, item) = self.resolve(patron_key, item_key)?;

        let outcome = if patron.has_capability(Capability::Borrow) {
            patron.return_item(item)
        } else {
            Err(LoanRefusal::NotPermitted)
        };

        match outcome {
            Ok(()) => {
                tracing::debug!(patron = %patron_key, item = %item_key, "loan ended");
                self.flush();
                Ok(())
            }
            Err(refusal) => {
                log_refusal("return", patron_key, item_key, refusal);
                Err(LoanFailure::Refused(refusal))
            }
        }
    }

    fn resolve(
        &mut self,
        patron_key: &str,
        item_key: &str,
    ) -> Result<(&mut Patron, &mut Item), LoanFailure> {
        let patron = self
            .patrons
            .get_mut(patron_key)
            .ok_or_else(|| LoanFailure::PatronNotFound(patron_key.to_string()))?;
        let item = self
            .items
            .get_mut(item_key)
            .ok_or_else(|| LoanFailure::ItemNotFound(item_key.to_string()))?;
        Ok((patron, item))
    }

    // --- Waitlist ---

    /// Queues a borrowing patron for an item. Fails for unknown keys, for
    /// accounts that cannot borrow, and for patrons already queued.
    /// Nothing dequeues automatically when a copy comes back.
    pub fn enqueue_waiter(&mut self, item_key: &str, patron_key: &str) -> bool {
        let can_borrow = self
            .patrons
            .get(patron_key)
            .is_some_and(|p| p.has_capability(Capability::Borrow));
        if !can_borrow {
            return false;
        }
        let Some(item) = self.items.get_mut(item_key) else {
            return false;
        };
        if !item.enqueue_waiter(patron_key) {
            return false;
        }
        tracing::debug!(item = %item_key, patron = %patron_key, "patron queued");
        self.flush();
        true
    }

    /// Pops the head of an item's waitlist.
    pub fn dequeue_waiter(&mut self, item_key: &str) -> Option<String> {
        let next = self.items.get_mut(item_key)?.dequeue_waiter()?;
        tracing::debug!(item = %item_key, patron = %next, "patron dequeued");
        self.flush();
        Some(next)
    }

    pub fn waitlist(&self, item_key: &str) -> Option<Vec<String>> {
        self.items
            .get(item_key)
            .map(|item| item.waitlist().map(str::to_string).collect())
    }

    // --- Statistics ---

    /// The item with the most copies out on loan. Ties go to the smallest key.
    pub fn most_borrowed_item(&self) -> Option<&Item> {
        self.items.values().max_by(|a, b| {
            a.borrowed_copies()
                .cmp(&b.borrowed_copies())
                .then_with(|| b.key().cmp(a.key()))
        })
    }

    /// The borrowing patron with the longest history. Ties go to the smallest key.
    pub fn most_active_patron(&self) -> Option<&Patron> {
        self.patrons
            .values()
            .filter(|p| p.has_capability(Capability::Borrow))
            .max_by(|a, b| {
                a.history()
                    .len()
                    .cmp(&b.history().len())
                    .then_with(|| b.key().cmp(a.key()))
            })
    }
}

fn log_refusal(action: &str, patron: &str, item: &str, refusal: LoanRefusal) {
    match refusal.kind() {
        RefusalKind::Capacity | RefusalKind::Permission => {
            tracing::info!(action, patron = %patron, item = %item, reason = %refusal, "loan refused");
        }
        RefusalKind::Consistency => {
            tracing::warn!(action, patron = %patron, item = %item, reason = %refusal, "inconsistent loan request");
        }
    }
}
