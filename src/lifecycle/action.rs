//! Requested lifecycle actions.

use std::fmt;

/// An operation a caller asks the engine to apply to one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Create the record
    Register { name: String, owner: String },
    /// Ask to rent the book
    Request { requester: String },
    /// Grant the pending request
    Confirm,
    /// Hand the book back
    Return,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Register { .. } => ActionKind::Register,
            Self::Request { .. } => ActionKind::Request,
            Self::Confirm => ActionKind::Confirm,
            Self::Return => ActionKind::Return,
        }
    }
}

/// Discriminant of [`Action`], used to index the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Register,
    Request,
    Confirm,
    Return,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Register => "register",
            Self::Request => "request",
            Self::Confirm => "confirm",
            Self::Return => "return",
        };
        f.write_str(name)
    }
}
