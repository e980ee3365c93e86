//! The book record and its ledger key.

use super::state::BookState;
use serde::{Deserialize, Serialize};

/// Separator between name and owner in a record key.
pub const KEY_SEPARATOR: char = '_';

/// Derive the ledger key of a book: `name + "_" + owner`.
///
/// ```rust
/// assert_eq!(bookledger::book_id("Dune", "alice"), "Dune_alice");
/// ```
pub fn book_id(name: &str, owner: &str) -> String {
    let mut key = String::with_capacity(name.len() + owner.len() + 1);
    key.push_str(name);
    key.push(KEY_SEPARATOR);
    key.push_str(owner);
    key
}

/// A book as persisted on the ledger.
///
/// `name` and `owner` form the identity and never change after
/// registration; `state` and `renter` move with the lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub owner: String,
    pub state: BookState,
    /// Identity holding the active request or rental, empty when none
    pub renter: String,
}

impl Book {
    /// A freshly registered book with no renter.
    pub fn registered(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            state: BookState::Registered,
            renter: String::new(),
        }
    }

    /// Ledger key of this record.
    pub fn key(&self) -> String {
        book_id(&self.name, &self.owner)
    }

    /// Whether the renter field agrees with the state.
    pub fn renter_consistent(&self) -> bool {
        self.state.holds_renter() != self.renter.is_empty()
    }
}
