//! Guarded state transitions of a book record.

use crate::core::{Book, BookState, Guard};
use crate::lifecycle::action::{Action, ActionKind};

/// What a transition does to the `renter` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenterEffect {
    /// Set it to the requesting identity
    Assign,
    /// Leave it as stored
    Keep,
    /// Empty it
    Clear,
}

/// A move between lifecycle states triggered by one kind of action.
///
/// The guard is the transition's precondition on the current state;
/// `from` lists the same states for diagnostics.
#[derive(Clone, Debug)]
pub struct Transition {
    pub kind: ActionKind,
    pub from: Vec<BookState>,
    pub to: BookState,
    pub renter: RenterEffect,
    pub guard: Guard<BookState>,
}

impl Transition {
    /// Transition allowed from any of `from`.
    pub fn new(
        kind: ActionKind,
        from: Vec<BookState>,
        to: BookState,
        renter: RenterEffect,
    ) -> Self {
        let guard = Guard::one_of(from.clone());
        Self {
            kind,
            from,
            to,
            renter,
            guard,
        }
    }

    /// Check if this transition can execute from the current state (pure)
    pub fn can_execute(&self, current: &BookState) -> bool {
        self.guard.check(current)
    }

    /// Next version of `book`. Callers check [`can_execute`](Self::can_execute) first.
    pub fn apply(&self, book: &Book, action: &Action) -> Book {
        let renter = match (self.renter, action) {
            (RenterEffect::Assign, Action::Request { requester }) => requester.clone(),
            (RenterEffect::Assign, _) | (RenterEffect::Keep, _) => book.renter.clone(),
            (RenterEffect::Clear, _) => String::new(),
        };
        Book {
            name: book.name.clone(),
            owner: book.owner.clone(),
            state: self.to,
            renter,
        }
    }
}
