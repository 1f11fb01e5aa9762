use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{Result, ShelfError};

/// One lendable catalog entry.
///
/// `available_copies` only moves through [`Item::borrow`] and
/// [`Item::return_copy`], and always stays within `0..=total_copies`.
/// Both are crate-private: the only caller is `Patron`, driven by the
/// catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    key: String,
    pub title: String,
    pub creator: String,
    pub category: String,
    pub year: i32,
    total_copies: u32,
    available_copies: u32,
    waitlist: VecDeque<String>,
}

impl Item {
    /// Creates an item with every copy on the shelf and an empty waitlist.
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        creator: impl Into<String>,
        category: impl Into<String>,
        year: i32,
        total_copies: i64,
    ) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ShelfError::Validation("item key cannot be empty".into()));
        }
        let total_copies = copies_from(total_copies)?;

        Ok(Self {
            key,
            title: title.into(),
            creator: creator.into(),
            category: category.into(),
            year,
            total_copies,
            available_copies: total_copies,
            waitlist: VecDeque::new(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Copies currently out on loan.
    pub fn borrowed_copies(&self) -> u32 {
        self.total_copies - self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Takes one copy off the shelf. Returns false when none is left.
    pub(crate) fn borrow(&mut self) -> bool {
        if self.available_copies > 0 {
            self.available_copies -= 1;
            true
        } else {
            false
        }
    }

    /// Puts one copy back. Returns false when every copy is already in,
    /// which means a return is being counted twice.
    pub(crate) fn return_copy(&mut self) -> bool {
        if self.available_copies < self.total_copies {
            self.available_copies += 1;
            true
        } else {
            false
        }
    }

    /// Appends a patron to the waitlist. A patron already queued is not
    /// added a second time and the call returns false.
    pub fn enqueue_waiter(&mut self, patron_key: impl Into<String>) -> bool {
        let patron_key = patron_key.into();
        if self.waitlist.contains(&patron_key) {
            return false;
        }
        self.waitlist.push_back(patron_key);
        true
    }

    pub fn dequeue_waiter(&mut self) -> Option<String> {
        self.waitlist.pop_front()
    }

    pub fn has_waiters(&self) -> bool {
        !self.waitlist.is_empty()
    }

    /// Waitlist in FIFO order, head first.
    pub fn waitlist(&self) -> impl Iterator<Item = &str> {
        self.waitlist.iter().map(String::as_str)
    }
}

fn copies_from(value: i64) -> Result<u32> {
    if value < 0 {
        return Err(ShelfError::Validation(format!(
            "copy count cannot be negative (got {})",
            value
        )));
    }
    u32::try_from(value)
        .map_err(|_| ShelfError::Validation(format!("copy count {} is too large", value)))
}

// Snapshot records are validated on the way in: a record that breaks
// `0 <= available <= total` is rejected like any other malformed content.
// Records written before waitlists were persisted have no `waitlist` field.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    key: String,
    title: String,
    creator: String,
    category: String,
    year: i32,
    total_copies: i64,
    available_copies: i64,
    #[serde(default)]
    waitlist: VecDeque<String>,
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = ItemRecord::deserialize(deserializer)?;

        let total_copies = copies_from(record.total_copies).map_err(D::Error::custom)?;
        let available_copies = copies_from(record.available_copies).map_err(D::Error::custom)?;
        if available_copies > total_copies {
            return Err(D::Error::custom(format!(
                "item {}: {} copies available but only {} in total",
                record.key, available_copies, total_copies
            )));
        }

        Ok(Item {
            key: record.key,
            title: record.title,
            creator: record.creator,
            category: record.category,
            year: record.year,
            total_copies,
            available_copies,
            waitlist: record.waitlist,
        })
    }
}
