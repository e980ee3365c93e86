//! Violation errors and handling strategies.

use crate::core::BookState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ways a decoded record can break the lifecycle invariants
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordViolation {
    #[error("renter '{renter}' is inconsistent with state '{state}'")]
    RenterMismatch { state: BookState, renter: String },

    #[error("record stored under '{key}' identifies as '{expected}'")]
    KeyMismatch { key: String, expected: String },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}

/// Strategy for handling records that violate the rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStrategy {
    /// Fail the read with a decode error
    #[default]
    Reject,

    /// Return the record but log a warning
    IgnoreAndLog,
}
