//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions that determine whether a transition
//! can execute. They encode transition preconditions without side effects.

use super::state::State;
use std::fmt;
use std::sync::Arc;

/// Pure predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use bookledger::core::{BookState, Guard};
///
/// let requestable = Guard::one_of(vec![BookState::Registered, BookState::Returned]);
///
/// assert!(requestable.check(&BookState::Registered));
/// assert!(requestable.check(&BookState::Returned));
/// assert!(!requestable.check(&BookState::Rented));
/// ```
pub struct Guard<S: State> {
    predicate: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that passes only for the listed states.
    pub fn one_of(states: Vec<S>) -> Self
    where
        S: 'static,
    {
        Self::new(move |s| states.contains(s))
    }

    /// Check if the guard allows transition from this state.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl<S: State> Clone for Guard<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: State> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
