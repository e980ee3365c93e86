//! The lifecycle state machine.
//!
//! `LifecycleEngine::apply` is a pure function of the current record and
//! the requested action. It never touches the ledger; callers read the
//! record first and write the returned book afterwards.

use crate::core::{Book, BookState};
use crate::error::ContractError;
use crate::lifecycle::action::{Action, ActionKind};
use crate::lifecycle::transition::{RenterEffect, Transition};

/// Transition table of the book lifecycle.
///
/// ```text
/// (none) --register--> registered --request--> inRequest --confirm--> rented
///                          returned --request--> inRequest
///                                        rented --return--> returned
/// ```
#[derive(Clone, Debug)]
pub struct LifecycleEngine {
    request: Transition,
    confirm: Transition,
    give_back: Transition,
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleEngine {
    pub fn new() -> Self {
        Self {
            request: Transition::new(
                ActionKind::Request,
                vec![BookState::Registered, BookState::Returned],
                BookState::InRequest,
                RenterEffect::Assign,
            ),
            confirm: Transition::new(
                ActionKind::Confirm,
                vec![BookState::InRequest],
                BookState::Rented,
                RenterEffect::Keep,
            ),
            give_back: Transition::new(
                ActionKind::Return,
                vec![BookState::Rented],
                BookState::Returned,
                RenterEffect::Clear,
            ),
        }
    }

    /// Transition for a kind of action; registration has none, it depends
    /// on the key being absent rather than on a state.
    pub fn transition(&self, kind: ActionKind) -> Option<&Transition> {
        match kind {
            ActionKind::Register => None,
            ActionKind::Request => Some(&self.request),
            ActionKind::Confirm => Some(&self.confirm),
            ActionKind::Return => Some(&self.give_back),
        }
    }

    pub fn transitions(&self) -> [&Transition; 3] {
        [&self.request, &self.confirm, &self.give_back]
    }

    /// Compute the record that results from applying `action` to the
    /// record currently stored under `key` (`None` when absent).
    pub fn apply(
        &self,
        key: &str,
        current: Option<&Book>,
        action: &Action,
    ) -> Result<Book, ContractError> {
        let (transition, book) = match (action, current) {
            (Action::Register { .. }, Some(_)) => {
                return Err(ContractError::AlreadyExists {
                    key: key.to_string(),
                })
            }
            (Action::Register { name, owner }, None) => {
                return Ok(Book::registered(name.as_str(), owner.as_str()))
            }
            (_, None) => {
                return Err(ContractError::NotFound {
                    key: key.to_string(),
                })
            }
            (Action::Request { .. }, Some(book)) => (&self.request, book),
            (Action::Confirm, Some(book)) => (&self.confirm, book),
            (Action::Return, Some(book)) => (&self.give_back, book),
        };

        if !transition.can_execute(&book.state) {
            return Err(ContractError::InvalidStateTransition {
                key: key.to_string(),
                expected: transition.from.clone(),
                actual: book.state,
            });
        }

        Ok(transition.apply(book, action))
    }
}
