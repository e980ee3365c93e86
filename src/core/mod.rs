//! Core lifecycle types.
//!
//! This module contains the pure data of the book lifecycle:
//! - State definitions via the `State` trait and `BookState`
//! - The `Book` record and its deterministic key
//! - Guard predicates for transition control
//! - Immutable history of a record
//!
//! Nothing here touches the ledger.

mod book;
mod guard;
mod history;
mod state;

pub use book::{book_id, Book, KEY_SEPARATOR};
pub use guard::Guard;
pub use history::{BookHistory, HistoryEntry};
pub use state::{BookState, State, UnknownState};
