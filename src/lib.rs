//! Bookledger: a book rental lifecycle on a versioned key-value ledger
//!
//! Each book is one record keyed by `"{name}_{owner}"`. The record moves
//! through a small lifecycle, and every change is a committed write whose
//! full history the ledger keeps.
//!
//! The crate follows a "pure core, imperative shell" layout. The
//! [`lifecycle`] engine decides transitions without touching storage, the
//! [`query`] layer reads and decodes records, and [`contract`] wires the two
//! to a [`ledger::Ledger`] passed in by the caller.
//!
//! # Core Concepts
//!
//! - **Book**: the stored record (`name`, `owner`, `state`, `renter`)
//! - **Lifecycle**: `registered -> inRequest -> rented -> returned -> inRequest ...`
//! - **Ledger**: the transactional store the caller provides
//! - **Lookup**: a point read is either `Found` or `Absent`, never an empty record
//!
//! # Example
//!
//! ```rust
//! use bookledger::{BookContract, BookState, ContractError, MemoryLedger};
//!
//! let ledger = MemoryLedger::new();
//! let contract = BookContract::new();
//!
//! ledger.submit(|tx| contract.register_book(tx, "Dune", "alice"))?;
//! ledger.submit(|tx| contract.request_rental(tx, "Dune_alice", "bob"))?;
//! ledger.submit(|tx| contract.confirm_rental(tx, "Dune_alice"))?;
//! ledger.submit(|tx| contract.return_book(tx, "Dune_alice"))?;
//!
//! let history = ledger.evaluate(|tx| contract.history(tx, "Dune_alice"))?;
//! assert_eq!(
//!     history.get_path(),
//!     vec![
//!         &BookState::Registered,
//!         &BookState::InRequest,
//!         &BookState::Rented,
//!         &BookState::Returned,
//!     ]
//! );
//! # Ok::<(), ContractError>(())
//! ```

pub mod codec;
pub mod config;
pub mod contract;
pub mod core;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod query;
pub mod validation;

// Re-export commonly used types
pub use config::ContractConfig;
pub use contract::{BookContract, ContractBuilder};
pub use core::{book_id, Book, BookHistory, BookState, HistoryEntry};
pub use error::ContractError;
pub use ledger::{Ledger, LedgerError, MemoryLedger};
pub use query::{Lookup, QueryResult};
