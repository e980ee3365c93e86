//! Lifecycle Engine: transition legality for a single book record.
//!
//! # Key Concepts
//!
//! - **Actions**: what a caller asks for (register, request, confirm, return)
//! - **Transitions**: guarded moves between states, with their effect on the renter
//! - **Engine**: a pure `(current record, action) -> next record | rejection` function
//!
//! The engine holds no state and performs no I/O. Reading the current
//! record and writing the result is the caller's job, see
//! [`BookContract`](crate::contract::BookContract).

mod action;
mod engine;
mod transition;

pub use action::{Action, ActionKind};
pub use engine::LifecycleEngine;
pub use transition::{RenterEffect, Transition};
