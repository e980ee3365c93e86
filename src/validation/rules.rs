//! Record rules checked with Validation.

use crate::validation::context::RecordContext;
use crate::validation::violations::{RecordViolation, ViolationStrategy};
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for record check functions
pub type RecordCheck =
    Box<dyn Fn(&RecordContext<'_>) -> Validation<(), NonEmptyVec<RecordViolation>> + Send + Sync>;

/// Integrity rules for records read back from the ledger.
/// Uses Validation to accumulate ALL violations.
pub struct RecordRules {
    pub(crate) renter_invariant: bool,
    pub(crate) key_consistency: bool,
    pub(crate) required_checks: Vec<RecordCheck>,
    pub(crate) on_violation: ViolationStrategy,
}

impl RecordRules {
    /// Check a record against every enabled rule.
    /// Returns Validation::Failure with ALL violations if any fail.
    pub fn enforce(
        &self,
        context: &RecordContext<'_>,
    ) -> Validation<(), NonEmptyVec<RecordViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<RecordViolation>>> = Vec::new();

        if self.renter_invariant {
            let book = context.book;
            let check = if book.renter_consistent() {
                Validation::success(())
            } else {
                Validation::fail(RecordViolation::RenterMismatch {
                    state: book.state,
                    renter: book.renter.clone(),
                })
            };
            checks.push(check);
        }

        if self.key_consistency {
            let expected = context.expected_key();
            let check = if expected == context.key {
                Validation::success(())
            } else {
                Validation::fail(RecordViolation::KeyMismatch {
                    key: context.key.to_string(),
                    expected,
                })
            };
            checks.push(check);
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(context));
        }

        if checks.is_empty() {
            return Validation::success(());
        }
        Validation::all_vec(checks).map(|_| ())
    }

    pub fn violation_strategy(&self) -> ViolationStrategy {
        self.on_violation
    }

    pub fn renter_invariant(&self) -> bool {
        self.renter_invariant
    }

    pub fn key_consistency(&self) -> bool {
        self.key_consistency
    }
}

impl Default for RecordRules {
    fn default() -> Self {
        Self {
            renter_invariant: true,
            key_consistency: false,
            required_checks: Vec::new(),
            on_violation: ViolationStrategy::Reject,
        }
    }
}

impl fmt::Debug for RecordRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordRules")
            .field("renter_invariant", &self.renter_invariant)
            .field("key_consistency", &self.key_consistency)
            .field("required_checks", &self.required_checks.len())
            .field("on_violation", &self.on_violation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Book, BookState};
    use crate::validation::builder::RecordRulesBuilder;

    fn book(state: BookState, renter: &str) -> Book {
        Book {
            name: "Dune".to_string(),
            owner: "alice".to_string(),
            state,
            renter: renter.to_string(),
        }
    }

    #[test]
    fn rules_accumulate_all_violations() {
        let rules = RecordRulesBuilder::new()
            .key_consistency(true)
            .require_pred(|_ctx| false, "Custom check always fails".to_string())
            .build();

        let record = book(BookState::Rented, "");
        let context = RecordContext {
            key: "Dune_bob",
            book: &record,
        };

        match rules.enforce(&context) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, RecordViolation::RenterMismatch { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, RecordViolation::KeyMismatch { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, RecordViolation::CustomCheckFailed { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn consistent_record_passes_default_rules() {
        let rules = RecordRules::default();
        let record = book(BookState::InRequest, "bob");
        let context = RecordContext {
            key: "Dune_alice",
            book: &record,
        };

        assert!(rules.enforce(&context).is_success());
    }

    #[test]
    fn key_mismatch_is_ignored_by_default() {
        let rules = RecordRules::default();
        let record = book(BookState::Registered, "");
        let context = RecordContext {
            key: "somewhere_else",
            book: &record,
        };

        assert!(rules.enforce(&context).is_success());
    }

    #[test]
    fn disabled_rules_always_pass() {
        let rules = RecordRulesBuilder::new().renter_invariant(false).build();
        let record = book(BookState::Returned, "bob");
        let context = RecordContext {
            key: "Dune_alice",
            book: &record,
        };

        assert!(rules.enforce(&context).is_success());
    }

    #[test]
    fn custom_validation_check_works() {
        let rules = RecordRulesBuilder::new()
            .require(|ctx: &RecordContext<'_>| {
                if ctx.book.name.is_empty() {
                    Validation::fail(RecordViolation::CustomCheckFailed {
                        message: "name must not be empty".to_string(),
                    })
                } else {
                    Validation::success(())
                }
            })
            .build();

        let mut record = book(BookState::Registered, "");
        record.name.clear();
        let context = RecordContext {
            key: "_alice",
            book: &record,
        };

        assert!(rules.enforce(&context).is_failure());
    }

    #[test]
    fn violation_strategy_is_stored() {
        let rules = RecordRulesBuilder::new()
            .on_violation(ViolationStrategy::IgnoreAndLog)
            .build();

        assert_eq!(rules.violation_strategy(), ViolationStrategy::IgnoreAndLog);
    }
}
