//! Change history of a single book record.
//!
//! History is reconstructed from the ledger's own change log; it is never
//! persisted separately. Entries are immutable values and the history grows
//! only through [`BookHistory::record`], which returns a new history.

use super::book::Book;
use super::state::BookState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One committed write or delete of a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Ledger transaction that produced this version
    pub tx_id: String,
    /// Commit time assigned by the ledger
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the record, `None` for a delete marker
    pub record: Option<Book>,
    pub is_delete: bool,
}

/// Ordered, oldest-first history of a record.
///
/// # Example
///
/// ```rust
/// use bookledger::core::{Book, BookHistory, BookState, HistoryEntry};
/// use chrono::Utc;
///
/// let mut rented = Book::registered("Dune", "alice");
/// rented.state = BookState::InRequest;
/// rented.renter = "bob".to_string();
///
/// let history = BookHistory::new()
///     .record(HistoryEntry {
///         tx_id: "tx1".to_string(),
///         timestamp: Utc::now(),
///         record: Some(Book::registered("Dune", "alice")),
///         is_delete: false,
///     })
///     .record(HistoryEntry {
///         tx_id: "tx2".to_string(),
///         timestamp: Utc::now(),
///         record: Some(rented),
///         is_delete: false,
///     });
///
/// assert_eq!(history.get_path(), vec![&BookState::Registered, &BookState::InRequest]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookHistory {
    entries: Vec<HistoryEntry>,
}

impl BookHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an entry, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, entry: HistoryEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self { entries }
    }

    /// States the record passed through, oldest first. Delete markers
    /// carry no state and are skipped.
    pub fn get_path(&self) -> Vec<&BookState> {
        self.entries
            .iter()
            .filter_map(|e| e.record.as_ref().map(|book| &book.state))
            .collect()
    }

    /// Time between the first and last entry, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<HistoryEntry> for BookHistory {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BookHistory {
    type Item = HistoryEntry;
    type IntoIter = std::vec::IntoIter<HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
