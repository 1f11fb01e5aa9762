use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::item::Item;
use super::{Capability, LoanRefusal, Role};

pub const DEFAULT_QUOTA: usize = 5;

fn default_quota() -> usize {
    DEFAULT_QUOTA
}

/// A registered account: either an ordinary patron who borrows, or an
/// administrator who manages the catalog.
///
/// Active loans are item keys, never references into the catalog. The
/// quota is checked when a loan starts; lowering it later does not revoke
/// loans already held, so `active_loans().len()` may exceed `quota()`
/// until enough items come back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patron {
    key: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    role: Role,
    #[serde(default)]
    active_loans: BTreeSet<String>,
    #[serde(default)]
    history: Vec<String>,
    #[serde(default = "default_quota")]
    quota: usize,
}

impl Patron {
    /// Creates an ordinary patron with no loans and the default quota.
    pub fn new(
        key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            username: username.into(),
            password: password.into(),
            name: name.into(),
            email: email.into(),
            role: Role::Patron,
            active_loans: BTreeSet::new(),
            history: Vec::new(),
            quota: DEFAULT_QUOTA,
        }
    }

    /// Creates an administrator account.
    pub fn administrator(
        key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Administrator,
            ..Self::new(key, username, password, name, email)
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role.has(capability)
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn active_loans(&self) -> &BTreeSet<String> {
        &self.active_loans
    }

    /// Every item this patron ever borrowed, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn has_borrowed(&self, item_key: &str) -> bool {
        self.active_loans.contains(item_key)
    }

    /// True while the patron holds fewer loans than the quota allows.
    pub fn can_borrow(&self) -> bool {
        self.active_loans.len() < self.quota
    }

    /// Takes effect immediately but never revokes loans already held.
    pub(crate) fn set_quota(&mut self, quota: usize) {
        self.quota = quota;
    }

    /// Starts a loan of `item`. This is the only path that takes a copy
    /// off the shelf; on refusal neither side is touched.
    pub(crate) fn borrow(&mut self, item: &mut Item) -> Result<(), LoanRefusal> {
        if !self.has_capability(Capability::Borrow) {
            return Err(LoanRefusal::NotPermitted);
        }
        if !self.can_borrow() {
            return Err(LoanRefusal::QuotaReached);
        }
        // One copy per patron: a second copy of the same item would leave the
        // shelf count and the loan set out of step.
        if self.has_borrowed(item.key()) {
            return Err(LoanRefusal::AlreadyBorrowed);
        }
        if !item.is_available() || !item.borrow() {
            return Err(LoanRefusal::NoCopiesAvailable);
        }

        self.active_loans.insert(item.key().to_string());
        self.history.push(item.key().to_string());
        Ok(())
    }

    /// Ends the loan of `item`. History is append-only and is not touched.
    pub(crate) fn return_item(&mut self, item: &mut Item) -> Result<(), LoanRefusal> {
        if !self.has_borrowed(item.key()) {
            return Err(LoanRefusal::NotBorrowedByPatron);
        }
        if !item.return_copy() {
            return Err(LoanRefusal::AllCopiesAlreadyIn);
        }

        self.active_loans.remove(item.key());
        Ok(())
    }

    /// Drops a loan whose item no longer exists in the catalog.
    pub(crate) fn forget_loan(&mut self, item_key: &str) -> bool {
        self.active_loans.remove(item_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patron(key: &str) -> Patron {
        Patron::new(key, key, "secret", "Ada", "ada@example.com")
    }

    fn item(key: &str, total: i64) -> Item {
        Item::new(key, "Title", "Author", "Genre", 2001, total).unwrap()
    }

    #[test]
    fn new_patron_defaults() {
        let p = patron("p1");
        assert_eq!(p.role(), Role::Patron);
        assert_eq!(p.quota(), DEFAULT_QUOTA);
        assert!(p.active_loans().is_empty());
        assert!(p.history().is_empty());
        assert!(p.can_borrow());
    }

    #[test]
    fn borrow_records_loan_and_history() {
        let mut p = patron("p1");
        let mut x = item("x", 2);
        assert_eq!(p.borrow(&mut x), Ok(()));
        assert!(p.has_borrowed("x"));
        assert_eq!(p.history(), ["x".to_string()]);
        assert_eq!(x.available_copies(), 1);
    }

    #[test]
    fn borrow_beyond_quota_is_refused_without_side_effects() {
        let mut p = patron("p1").with_quota(1);
        let mut x = item("x", 1);
        let mut y = item("y", 1);
        p.borrow(&mut x).unwrap();

        assert!(!p.can_borrow());
        assert_eq!(p.borrow(&mut y), Err(LoanRefusal::QuotaReached));
        assert_eq!(p.active_loans().len(), 1);
        assert_eq!(y.available_copies(), 1);
    }

    #[test]
    fn borrow_unavailable_item_is_refused() {
        let mut p1 = patron("p1");
        let mut p2 = patron("p2");
        let mut x = item("x", 1);
        p1.borrow(&mut x).unwrap();

        assert_eq!(p2.borrow(&mut x), Err(LoanRefusal::NoCopiesAvailable));
        assert!(p2.active_loans().is_empty());
        assert!(p2.history().is_empty());
        assert_eq!(x.available_copies(), 0);
    }

    #[test]
    fn borrowing_the_same_item_twice_is_refused() {
        let mut p = patron("p1");
        let mut x = item("x", 3);
        p.borrow(&mut x).unwrap();

        assert_eq!(p.borrow(&mut x), Err(LoanRefusal::AlreadyBorrowed));
        assert_eq!(x.available_copies(), 2);
        assert_eq!(p.history().len(), 1);
    }

    #[test]
    fn administrators_cannot_borrow() {
        let mut admin = Patron::administrator("a1", "root", "pw", "Root", "root@example.com");
        let mut x = item("x", 1);
        assert_eq!(admin.borrow(&mut x), Err(LoanRefusal::NotPermitted));
        assert_eq!(x.available_copies(), 1);
    }

    #[test]
    fn return_of_unborrowed_item_is_refused() {
        let mut p = patron("p1");
        let mut x = item("x", 2);
        let mut other = patron("p2");
        other.borrow(&mut x).unwrap();

        assert_eq!(p.return_item(&mut x), Err(LoanRefusal::NotBorrowedByPatron));
        assert_eq!(x.available_copies(), 1);
    }

    #[test]
    fn return_when_all_copies_are_in_keeps_the_loan() {
        let mut p = patron("p1");
        let mut x = item("x", 1);
        p.borrow(&mut x).unwrap();
        // Simulate a copy that came back through some other route.
        assert!(x.return_copy());

        assert_eq!(p.return_item(&mut x), Err(LoanRefusal::AllCopiesAlreadyIn));
        assert!(p.has_borrowed("x"));
    }

    #[test]
    fn return_keeps_history() {
        let mut p = patron("p1");
        let mut x = item("x", 1);
        p.borrow(&mut x).unwrap();
        p.return_item(&mut x).unwrap();
        p.borrow(&mut x).unwrap();

        assert_eq!(p.history(), ["x".to_string(), "x".to_string()]);
        assert_eq!(p.active_loans().len(), 1);
    }

    #[test]
    fn lowering_quota_keeps_existing_loans() {
        let mut p = patron("p1");
        let mut items: Vec<Item> = (0..3).map(|i| item(&format!("i{}", i), 1)).collect();
        for it in items.iter_mut() {
            p.borrow(it).unwrap();
        }

        p.set_quota(1);
        assert_eq!(p.active_loans().len(), 3);
        assert!(!p.can_borrow());

        let mut extra = item("extra", 1);
        assert_eq!(p.borrow(&mut extra), Err(LoanRefusal::QuotaReached));

        p.return_item(&mut items[0]).unwrap();
        p.return_item(&mut items[1]).unwrap();
        assert!(!p.can_borrow());
        p.return_item(&mut items[2]).unwrap();
        assert!(p.can_borrow());
        assert_eq!(p.borrow(&mut extra), Ok(()));
    }

    #[test]
    fn record_without_loans_or_quota_uses_defaults() {
        let json = r#"{"key":"p1","username":"ada","password":"pw","name":"Ada",
            "email":"ada@example.com","role":"USER"}"#;
        let p: Patron = serde_json::from_str(json).unwrap();
        assert_eq!(p.quota(), DEFAULT_QUOTA);
        assert!(p.active_loans().is_empty());
        assert_eq!(p.role(), Role::Patron);
    }

    #[test]
    fn record_carries_role_tag() {
        let admin = Patron::administrator("a1", "root", "pw", "Root", "r@example.com");
        let value = serde_json::to_value(&admin).unwrap();
        assert_eq!(value["role"], "ADMIN");
        assert_eq!(value["quota"], DEFAULT_QUOTA);
    }
}
