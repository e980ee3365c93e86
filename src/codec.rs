//! Byte encoding of book records.
//!
//! Records are JSON objects with the fields `name`, `owner`, `state` and
//! `renter`. Decoding is lenient about shape: unknown fields are ignored and
//! a missing `name`, `owner` or `renter` reads as the empty string. It is
//! strict about meaning: malformed JSON, a missing or unknown state, or a
//! record that breaks the configured [`RecordRules`] is an error.

use crate::core::{Book, BookState, UnknownState};
use crate::validation::{RecordContext, RecordRules, RecordViolation, ViolationStrategy};
use serde::Deserialize;
use stillwater::validation::Validation;
use thiserror::Error;
use tracing::warn;

/// Why a stored blob could not be turned into a [`Book`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("record has no state")]
    MissingState,

    #[error(transparent)]
    UnknownState(#[from] UnknownState),

    #[error("record violates {} rule(s): {}", .0.len(), join_violations(.0))]
    InvalidRecord(Vec<RecordViolation>),
}

fn join_violations(violations: &[RecordViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shape of a stored record before its state is interpreted.
#[derive(Deserialize)]
struct StoredBook {
    #[serde(default)]
    name: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    renter: String,
}

/// Encodes books for the ledger and decodes them back under a set of rules.
#[derive(Debug, Default)]
pub struct RecordCodec {
    rules: RecordRules,
}

impl RecordCodec {
    pub fn new(rules: RecordRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RecordRules {
        &self.rules
    }

    pub fn encode(&self, book: &Book) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(book)
    }

    /// Decode the record stored under `key`.
    pub fn decode(&self, key: &str, bytes: &[u8]) -> Result<Book, CodecError> {
        let stored: StoredBook = serde_json::from_slice(bytes)?;
        if stored.state.is_empty() {
            return Err(CodecError::MissingState);
        }
        let state: BookState = stored.state.parse()?;
        let book = Book {
            name: stored.name,
            owner: stored.owner,
            state,
            renter: stored.renter,
        };

        let context = RecordContext { key, book: &book };
        match self.rules.enforce(&context) {
            Validation::Success(_) => Ok(book),
            Validation::Failure(errors) => {
                let violations: Vec<RecordViolation> = errors.iter().cloned().collect();
                match self.rules.violation_strategy() {
                    ViolationStrategy::Reject => Err(CodecError::InvalidRecord(violations)),
                    ViolationStrategy::IgnoreAndLog => {
                        warn!(
                            key,
                            violations = %join_violations(&violations),
                            "accepting record that violates integrity rules"
                        );
                        Ok(book)
                    }
                }
            }
        }
    }
}
