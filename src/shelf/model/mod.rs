//! # Domain Model
//!
//! Two entities make up the catalog: [`Item`] (a work with one or more
//! copies) and [`Patron`] (an account that may hold loans). Neither holds a
//! reference to the other. A loan is an item key in the patron's active set
//! matched by one missing copy on the item, and the two only change together
//! inside [`Patron::borrow`] and [`Patron::return_item`], which only the
//! catalog store calls.
//!
//! ## Loan State
//!
//! Per (item, patron) pair there are two states:
//!
//! ```text
//! NOT_BORROWED ──borrow──▶ BORROWED
//!      ▲                      │
//!      └───────return─────────┘
//! ```
//!
//! Refused transitions are not errors. They come back as a [`LoanRefusal`],
//! whose [`RefusalKind`] separates expected capacity limits from
//! consistency problems that point at a caller bug.
//!
//! ## Roles
//!
//! Accounts carry a [`Role`] tag instead of being distinct types. Each role
//! maps to a fixed capability set; callers ask for a [`Capability`] rather
//! than matching on the role.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod item;
pub mod patron;

pub use item::Item;
pub use patron::{Patron, DEFAULT_QUOTA};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageCatalog,
    Borrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Administrator,
    #[serde(rename = "USER")]
    Patron,
}

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Administrator => &[Capability::ManageCatalog],
            Role::Patron => &[Capability::Borrow],
        }
    }

    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Administrator => write!(f, "admin"),
            Role::Patron => write!(f, "patron"),
        }
    }
}

/// Why a borrow or return did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanRefusal {
    /// The account's role does not include borrowing.
    NotPermitted,
    QuotaReached,
    NoCopiesAvailable,
    /// The patron already holds a copy of this item.
    AlreadyBorrowed,
    NotBorrowedByPatron,
    /// The item reports every copy on the shelf although the patron holds one.
    AllCopiesAlreadyIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalKind {
    Permission,
    Capacity,
    Consistency,
}

impl LoanRefusal {
    pub fn kind(self) -> RefusalKind {
        match self {
            LoanRefusal::NotPermitted => RefusalKind::Permission,
            LoanRefusal::QuotaReached | LoanRefusal::NoCopiesAvailable => RefusalKind::Capacity,
            LoanRefusal::AlreadyBorrowed
            | LoanRefusal::NotBorrowedByPatron
            | LoanRefusal::AllCopiesAlreadyIn => RefusalKind::Consistency,
        }
    }
}

impl fmt::Display for LoanRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LoanRefusal::NotPermitted => "account is not allowed to borrow",
            LoanRefusal::QuotaReached => "loan quota reached",
            LoanRefusal::NoCopiesAvailable => "no copies available",
            LoanRefusal::AlreadyBorrowed => "item already borrowed by this patron",
            LoanRefusal::NotBorrowedByPatron => "item is not borrowed by this patron",
            LoanRefusal::AllCopiesAlreadyIn => "all copies are already returned",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_disjoint_capabilities() {
        assert!(Role::Administrator.has(Capability::ManageCatalog));
        assert!(!Role::Administrator.has(Capability::Borrow));
        assert!(Role::Patron.has(Capability::Borrow));
        assert!(!Role::Patron.has(Capability::ManageCatalog));
    }

    #[test]
    fn refusal_kinds() {
        assert_eq!(LoanRefusal::QuotaReached.kind(), RefusalKind::Capacity);
        assert_eq!(LoanRefusal::NoCopiesAvailable.kind(), RefusalKind::Capacity);
        assert_eq!(LoanRefusal::NotBorrowedByPatron.kind(), RefusalKind::Consistency);
        assert_eq!(LoanRefusal::AllCopiesAlreadyIn.kind(), RefusalKind::Consistency);
        assert_eq!(LoanRefusal::NotPermitted.kind(), RefusalKind::Permission);
    }
}
