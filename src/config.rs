//! Contract configuration.
//!
//! Everything has a default matching the ledger's original behavior, so an
//! empty JSON object is a valid configuration.

use crate::validation::ViolationStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How strictly records read from the ledger are checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordPolicy {
    /// Require `renter` to be set exactly while requested or rented
    pub renter_invariant: bool,
    /// Require a record's name and owner to map back to its key
    pub key_consistency: bool,
    pub on_violation: ViolationStrategy,
}

impl Default for RecordPolicy {
    fn default() -> Self {
        Self {
            renter_invariant: true,
            key_consistency: false,
            on_violation: ViolationStrategy::Reject,
        }
    }
}

/// Settings for a [`BookContract`](crate::contract::BookContract).
///
/// ```rust
/// use bookledger::config::ContractConfig;
/// use bookledger::validation::ViolationStrategy;
///
/// let config = ContractConfig::from_json(
///     r#"{ "records": { "on_violation": "ignore_and_log" } }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.scan_start_key, "");
/// assert_eq!(config.records.on_violation, ViolationStrategy::IgnoreAndLog);
/// assert!(config.records.renter_invariant);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// First key covered by `query_all_books`, empty for no lower bound
    pub scan_start_key: String,
    /// Key after the last one covered, empty for no upper bound
    pub scan_end_key: String,
    pub records: RecordPolicy,
}

impl ContractConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
