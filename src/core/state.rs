//! Core State trait and the book lifecycle states.
//!
//! All lifecycle states implement [`State`], which provides pure methods
//! for inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;
use thiserror::Error;

/// Trait for state machine states.
///
/// All methods are pure - no side effects. States represent immutable
/// values that describe the current position in a lifecycle.
///
/// # Required Traits
///
/// - `Clone`: States must be cloneable for history tracking
/// - `PartialEq`: States must be comparable for transition logic
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for persistence
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name as it is persisted and displayed.
    fn name(&self) -> &str;
}

/// Lifecycle state of a book record.
///
/// There is no terminal state: a returned book can be requested again.
///
/// ```rust
/// use bookledger::core::{BookState, State};
///
/// assert_eq!(BookState::InRequest.name(), "inRequest");
/// assert!(BookState::Rented.holds_renter());
/// assert!(!BookState::Returned.holds_renter());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookState {
    /// Registered by its owner, never rented
    Registered,
    /// A renter has asked for the book
    InRequest,
    /// The request was confirmed
    Rented,
    /// Back with the owner, available for a new request
    Returned,
}

impl BookState {
    /// Every lifecycle state, in lifecycle order.
    pub const ALL: [BookState; 4] = [
        BookState::Registered,
        BookState::InRequest,
        BookState::Rented,
        BookState::Returned,
    ];

    /// Whether a record in this state must carry a non-empty renter.
    pub fn holds_renter(&self) -> bool {
        matches!(self, Self::InRequest | Self::Rented)
    }
}

impl State for BookState {
    fn name(&self) -> &str {
        match self {
            Self::Registered => "registered",
            Self::InRequest => "inRequest",
            Self::Rented => "rented",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A state name that is not part of the book lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown book state '{0}'")]
pub struct UnknownState(pub String);

impl FromStr for BookState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}
