//! Errors returned by the lifecycle operations.

use crate::codec::CodecError;
use crate::core::BookState;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Failure of a contract operation.
///
/// No operation writes anything when it returns an error.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("{key} already exist in world state")]
    AlreadyExists { key: String },

    #[error("{key} does not exist in world state")]
    NotFound { key: String },

    #[error("{key} STATE is not appropriate: {actual} (expected {})", join_states(.expected))]
    InvalidStateTransition {
        key: String,
        expected: Vec<BookState>,
        actual: BookState,
    },

    #[error(transparent)]
    StorageFailure(#[from] LedgerError),

    #[error("failed to decode record {key}: {source}")]
    DecodeFailure {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to encode record {key}: {source}")]
    EncodeFailure {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

fn join_states(states: &[BookState]) -> String {
    states
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

impl ContractError {
    /// Key the failed operation addressed, when the error names one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::AlreadyExists { key }
            | Self::NotFound { key }
            | Self::InvalidStateTransition { key, .. }
            | Self::DecodeFailure { key, .. }
            | Self::EncodeFailure { key, .. } => Some(key),
            Self::StorageFailure(LedgerError::Conflict { key }) => Some(key),
            Self::StorageFailure(_) => None,
        }
    }
}
