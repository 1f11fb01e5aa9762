//! # Command Layer
//!
//! Each command family lives in its own submodule as plain functions over a
//! [`CatalogStore`](crate::store::CatalogStore). Commands turn the store's
//! boolean outcomes into a [`CmdResult`]: the records to show, leveled
//! messages, and whether the command was refused.
//!
//! Commands never print, prompt, or exit. Malformed input (a negative copy
//! count, an unknown key to show) is an `Err`; an ordinary refusal (no
//! copies left, quota reached) is an `Ok` result with `failed` set.
//!
//! ## Command Modules
//!
//! - [`items`]: Add and remove catalog items
//! - [`catalog`]: Show, list and search items
//! - [`patrons`]: Register, show and set quotas
//! - [`loans`]: Borrow, return and waitlist handling
//! - [`stats`]: Catalog statistics

use crate::model::{Item, Patron};
use serde::Serialize;

pub mod catalog;
pub mod items;
pub mod loans;
pub mod patrons;
pub mod stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub listed_items: Vec<Item>,
    pub listed_patrons: Vec<Patron>,
    pub stats: Option<stats::Stats>,
    pub messages: Vec<CmdMessage>,
    /// Set when the store refused the operation.
    pub failed: bool,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn is_success(&self) -> bool {
        !self.failed
    }

    pub fn succeeded(content: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.add_message(CmdMessage::success(content));
        result
    }

    pub fn refused(content: impl Into<String>) -> Self {
        let mut result = Self {
            failed: true,
            ..Default::default()
        };
        result.add_message(CmdMessage::error(content));
        result
    }

    pub fn with_listed_items(mut self, items: Vec<Item>) -> Self {
        self.listed_items = items;
        self
    }

    pub fn with_listed_patrons(mut self, patrons: Vec<Patron>) -> Self {
        self.listed_patrons = patrons;
        self
    }
}
