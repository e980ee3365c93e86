//! Query Layer: read-only access to book records.
//!
//! Every function takes the ledger explicitly and decodes through a
//! [`RecordCodec`]. Decode failures are returned, never papered over with
//! an empty record, and absence is reported as [`Lookup::Absent`].

use crate::codec::RecordCodec;
use crate::core::{Book, BookHistory, HistoryEntry};
use crate::error::ContractError;
use crate::ledger::Ledger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of a point lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Found(Book),
    Absent,
}

impl Lookup {
    pub fn found(&self) -> Option<&Book> {
        match self {
            Self::Found(book) => Some(book),
            Self::Absent => None,
        }
    }

    pub fn into_book(self) -> Option<Book> {
        match self {
            Self::Found(book) => Some(book),
            Self::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// One record of a range scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Book,
}

fn decode(codec: &RecordCodec, key: &str, bytes: &[u8]) -> Result<Book, ContractError> {
    codec
        .decode(key, bytes)
        .map_err(|source| ContractError::DecodeFailure {
            key: key.to_string(),
            source,
        })
}

/// Current record stored under `key`.
pub fn point_lookup<L: Ledger>(
    ledger: &L,
    codec: &RecordCodec,
    key: &str,
) -> Result<Lookup, ContractError> {
    match ledger.get_state(key)? {
        Some(bytes) => Ok(Lookup::Found(decode(codec, key, &bytes)?)),
        None => Ok(Lookup::Absent),
    }
}

/// Whether anything is stored under `key`, without decoding it.
pub fn contains<L: Ledger>(ledger: &L, key: &str) -> Result<bool, ContractError> {
    Ok(ledger.get_state(key)?.is_some())
}

/// Every record with a key in `[start, end)`, in key order. Empty bounds
/// are open, so `range_scan(ledger, codec, "", "")` returns the whole table.
pub fn range_scan<L: Ledger>(
    ledger: &L,
    codec: &RecordCodec,
    start: &str,
    end: &str,
) -> Result<Vec<QueryResult>, ContractError> {
    let cursor = ledger.get_state_by_range(start, end)?;

    let mut results = Vec::new();
    for item in cursor {
        let kv = item?;
        let record = decode(codec, &kv.key, &kv.value)?;
        results.push(QueryResult {
            key: kv.key,
            record,
        });
    }

    debug!(start, end, count = results.len(), "range scan complete");
    Ok(results)
}

/// Every committed change of `key`, oldest first.
pub fn history<L: Ledger>(
    ledger: &L,
    codec: &RecordCodec,
    key: &str,
) -> Result<BookHistory, ContractError> {
    let cursor = ledger.get_history_for_key(key)?;

    let mut history = Vec::new();
    for item in cursor {
        let modification = item?;
        let record = if modification.is_delete {
            None
        } else {
            Some(decode(codec, key, &modification.value)?)
        };
        history.push(HistoryEntry {
            tx_id: modification.tx_id,
            timestamp: DateTime::<Utc>::from_timestamp_nanos(modification.timestamp_nanos),
            record,
            is_delete: modification.is_delete,
        });
    }

    debug!(key, entries = history.len(), "history read");
    Ok(history.into_iter().collect())
}
