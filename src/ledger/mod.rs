//! Storage interface consumed by the lifecycle core.
//!
//! The ledger owns durability, versioning and conflict detection. The core
//! sees it only through [`Ledger`]: point reads and writes, range cursors and
//! per-key history cursors. An implementation value is the transaction
//! context of one invocation; everything read or written through it belongs
//! to that transaction.
//!
//! [`MemoryLedger`] is a complete in-process implementation with optimistic
//! concurrency control, used by the tests and demos.

mod memory;
mod snapshot;

pub use memory::{
    Cursor, HistoryCursor, LedgerTx, MemoryLedger, MemoryLedgerBuilder, RangeCursor, TxReceipt,
};
pub use snapshot::{LedgerSnapshot, SnapshotError, VersionRecord, SNAPSHOT_VERSION};

use thiserror::Error;

/// Current value of a key, produced by range cursors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed change of a key, produced by history cursors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    /// Commit time in nanoseconds since the Unix epoch
    pub timestamp_nanos: i64,
    /// Written bytes, empty for a delete
    pub value: Vec<u8>,
    pub is_delete: bool,
}

/// Errors surfaced by a ledger implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("read conflict on key '{key}': value changed since it was read")]
    Conflict { key: String },

    #[error("cursor failed: {0}")]
    Cursor(String),

    #[error("ledger clock out of range")]
    Clock,
}

/// Versioned key-value store scoped to one transaction.
///
/// `get_state` must not fail for a missing key; it returns `Ok(None)`.
/// Range bounds are `[start, end)`; an empty bound is open. Cursors release
/// their ledger-side resources when dropped, so an early return out of an
/// iteration loop never leaks them.
pub trait Ledger {
    type Range: Iterator<Item = Result<KeyValue, LedgerError>>;
    type History: Iterator<Item = Result<KeyModification, LedgerError>>;

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Self::Range, LedgerError>;

    /// Every committed change of `key`, oldest first.
    fn get_history_for_key(&self, key: &str) -> Result<Self::History, LedgerError>;
}
