//! Integrity rules for records read from the ledger.
//!
//! Records are written by this crate, but the ledger is shared and may hold
//! data written by other versions or other writers. Every decoded record is
//! checked against [`RecordRules`], which use Stillwater's `Validation` type
//! to report every broken rule at once instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use bookledger::core::{Book, BookState};
//! use bookledger::validation::{RecordContext, RecordRulesBuilder, ViolationStrategy};
//!
//! let rules = RecordRulesBuilder::new()
//!     .key_consistency(true)
//!     .on_violation(ViolationStrategy::Reject)
//!     .build();
//!
//! let book = Book::registered("Dune", "alice");
//! let context = RecordContext { key: "Dune_alice", book: &book };
//! assert!(rules.enforce(&context).is_success());
//! ```

pub mod builder;
pub mod context;
pub mod rules;
pub mod violations;

pub use builder::RecordRulesBuilder;
pub use context::RecordContext;
pub use rules::{RecordCheck, RecordRules};
pub use violations::{RecordViolation, ViolationStrategy};
