//! Point-in-time copies of a [`MemoryLedger`](super::MemoryLedger).
//!
//! A snapshot carries every committed version of every key, so a restored
//! ledger answers history queries exactly like the original. Snapshots
//! encode to JSON for inspection or to bincode for compact storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur while encoding or restoring a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),
}

/// One committed change of a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Commit sequence number, shared by all keys written in one commit
    pub version: u64,
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    /// `None` marks a delete
    pub value: Option<Vec<u8>>,
}

/// Serializable copy of a ledger's full versioned contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    pub taken_at: DateTime<Utc>,

    /// Sequence number of the last commit included
    pub sequence: u64,

    pub last_commit: Option<DateTime<Utc>>,

    pub keys: BTreeMap<String, Vec<VersionRecord>>,
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check()?;
        Ok(snapshot)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check()?;
        Ok(snapshot)
    }

    /// Reject snapshots this build cannot restore faithfully.
    pub(super) fn check(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        for (key, versions) in &self.keys {
            if versions.is_empty() {
                return Err(SnapshotError::ValidationFailed(format!(
                    "key '{key}' has no versions"
                )));
            }
            let ordered = versions
                .windows(2)
                .all(|w| w[0].version < w[1].version && w[0].timestamp <= w[1].timestamp);
            let within_sequence = versions.iter().all(|v| v.version <= self.sequence);
            if !ordered || !within_sequence {
                return Err(SnapshotError::ValidationFailed(format!(
                    "versions of key '{key}' are out of order"
                )));
            }
        }
        Ok(())
    }
}
