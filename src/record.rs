//! The record type stored by every backend.

use std::fmt;

/// One auction record.
///
/// `key` identifies the record and is expected to be unique; the tree backend
/// does not enforce that (see [`crate::tree::OrderedTreeStore::insert`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Unique identifier, e.g. `"98101"`.
    pub key: String,
    pub title: String,
    /// Department or fund the record belongs to.
    pub category: String,
    pub amount: f64,
}

impl Record {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            category: category.into(),
            amount,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} | {} | {}",
            self.key, self.title, self.amount, self.category
        )
    }
}
