//! The operations exposed to a transport layer.
//!
//! Every operation follows the same shape: look the record up through the
//! Query Layer, let the Lifecycle Engine decide the next record, and hand
//! the result back to the ledger with a single write. The ledger is passed
//! in by the caller and is the operation's transaction context; the
//! contract itself keeps no state between calls.
//!
//! # Example
//!
//! ```rust
//! use bookledger::contract::BookContract;
//! use bookledger::core::BookState;
//! use bookledger::ledger::MemoryLedger;
//! use bookledger::ContractError;
//!
//! let ledger = MemoryLedger::new();
//! let contract = BookContract::new();
//!
//! ledger.submit(|tx| contract.register_book(tx, "Dune", "alice"))?;
//! ledger.submit(|tx| contract.request_rental(tx, "Dune_alice", "bob"))?;
//!
//! let book = ledger
//!     .evaluate(|tx| contract.query_book(tx, "Dune_alice"))?
//!     .into_book()
//!     .unwrap();
//! assert_eq!(book.state, BookState::InRequest);
//! assert_eq!(book.renter, "bob");
//! # Ok::<(), ContractError>(())
//! ```

mod builder;

pub use builder::{BuildError, ContractBuilder};

use crate::codec::RecordCodec;
use crate::config::ContractConfig;
use crate::core::{book_id, Book, BookHistory};
use crate::error::ContractError;
use crate::ledger::Ledger;
use crate::lifecycle::{Action, LifecycleEngine};
use crate::query::{self, Lookup, QueryResult};
use tracing::{info, instrument, warn};

/// Book registration and rental operations.
#[derive(Debug)]
pub struct BookContract {
    engine: LifecycleEngine,
    codec: RecordCodec,
    scan_start: String,
    scan_end: String,
}

impl Default for BookContract {
    fn default() -> Self {
        Self::new()
    }
}

impl BookContract {
    /// Contract with default settings: full-keyspace scans and strict
    /// record checks.
    pub fn new() -> Self {
        Self {
            engine: LifecycleEngine::new(),
            codec: RecordCodec::default(),
            scan_start: String::new(),
            scan_end: String::new(),
        }
    }

    pub fn builder() -> ContractBuilder {
        ContractBuilder::new()
    }

    pub fn from_config(config: ContractConfig) -> Result<Self, BuildError> {
        ContractBuilder::new().config(config).build()
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    /// Create the record for `(name, owner)`. Fails with
    /// [`ContractError::AlreadyExists`] if the key is taken, whatever the
    /// existing value holds. The existing value is not decoded.
    #[instrument(level = "debug", skip(self, ledger))]
    pub fn register_book<L: Ledger>(
        &self,
        ledger: &mut L,
        name: &str,
        owner: &str,
    ) -> Result<Book, ContractError> {
        let key = book_id(name, owner);
        let action = Action::Register {
            name: name.to_string(),
            owner: owner.to_string(),
        };
        self.transition(ledger, &key, &action)
    }

    /// Current record under `key`.
    #[instrument(level = "debug", skip(self, ledger))]
    pub fn query_book<L: Ledger>(&self, ledger: &L, key: &str) -> Result<Lookup, ContractError> {
        query::point_lookup(ledger, &self.codec, key)
    }

    /// Current record registered by `owner` under `name`.
    pub fn find_book<L: Ledger>(
        &self,
        ledger: &L,
        name: &str,
        owner: &str,
    ) -> Result<Lookup, ContractError> {
        self.query_book(ledger, &book_id(name, owner))
    }

    /// Ask to rent a registered or returned book. `requester` becomes the
    /// renter. No check is made that the requester differs from the owner.
    #[instrument(level = "debug", skip(self, ledger))]
    pub fn request_rental<L: Ledger>(
        &self,
        ledger: &mut L,
        key: &str,
        requester: &str,
    ) -> Result<Book, ContractError> {
        let action = Action::Request {
            requester: requester.to_string(),
        };
        self.transition(ledger, key, &action)
    }

    /// Grant the pending request. The renter recorded by the request is
    /// kept as is.
    #[instrument(level = "debug", skip(self, ledger))]
    pub fn confirm_rental<L: Ledger>(&self, ledger: &mut L, key: &str) -> Result<Book, ContractError> {
        self.transition(ledger, key, &Action::Confirm)
    }

    #[instrument(level = "debug", skip(self, ledger))]
    pub fn return_book<L: Ledger>(&self, ledger: &mut L, key: &str) -> Result<Book, ContractError> {
        self.transition(ledger, key, &Action::Return)
    }

    /// Every committed change of `key`, oldest first.
    #[instrument(level = "debug", skip(self, ledger))]
    pub fn history<L: Ledger>(&self, ledger: &L, key: &str) -> Result<BookHistory, ContractError> {
        query::history(ledger, &self.codec, key)
    }

    /// Every record in the configured scan range, in key order.
    #[instrument(level = "debug", skip(self, ledger))]
    pub fn query_all_books<L: Ledger>(&self, ledger: &L) -> Result<Vec<QueryResult>, ContractError> {
        query::range_scan(ledger, &self.codec, &self.scan_start, &self.scan_end)
    }

    /// Read, decide, write. Nothing is written unless the engine accepts
    /// the action.
    fn transition<L: Ledger>(
        &self,
        ledger: &mut L,
        key: &str,
        action: &Action,
    ) -> Result<Book, ContractError> {
        let current = match action {
            // Registration only needs to know whether the key is taken.
            Action::Register { .. } if query::contains(&*ledger, key)? => {
                Err(ContractError::AlreadyExists {
                    key: key.to_string(),
                })
            }
            Action::Register { .. } => Ok(Lookup::Absent),
            _ => Ok(query::point_lookup(&*ledger, &self.codec, key)?),
        };

        let decided = current.and_then(|current| self.engine.apply(key, current.found(), action));
        let next = match decided {
            Ok(next) => next,
            Err(err) => {
                warn!(key, action = %action.kind(), error = %err, "transition rejected");
                return Err(err);
            }
        };

        let bytes = self
            .codec
            .encode(&next)
            .map_err(|source| ContractError::EncodeFailure {
                key: key.to_string(),
                source,
            })?;
        ledger.put_state(key, bytes)?;

        info!(key, action = %action.kind(), state = %next.state, "book updated");
        Ok(next)
    }
}
