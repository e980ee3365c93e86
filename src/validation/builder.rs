//! Builder API for creating record rules.

use crate::validation::context::RecordContext;
use crate::validation::rules::{RecordCheck, RecordRules};
use crate::validation::violations::{RecordViolation, ViolationStrategy};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating record rules
pub struct RecordRulesBuilder {
    renter_invariant: bool,
    key_consistency: bool,
    required_checks: Vec<RecordCheck>,
    on_violation: ViolationStrategy,
}

impl RecordRulesBuilder {
    pub fn new() -> Self {
        Self {
            renter_invariant: true,
            key_consistency: false,
            required_checks: Vec::new(),
            on_violation: ViolationStrategy::Reject,
        }
    }

    /// Require `renter` to be set exactly while requested or rented
    pub fn renter_invariant(mut self, enabled: bool) -> Self {
        self.renter_invariant = enabled;
        self
    }

    /// Require the record's name and owner to map back to its key
    pub fn key_consistency(mut self, enabled: bool) -> Self {
        self.key_consistency = enabled;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&RecordContext<'_>) -> Validation<(), NonEmptyVec<RecordViolation>>
            + Send
            + Sync
            + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&RecordContext<'_>) -> bool + Send + Sync + 'static,
    {
        let check: RecordCheck = Box::new(move |ctx| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(RecordViolation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        });
        self.required_checks.push(check);
        self
    }

    /// Set violation handling strategy
    pub fn on_violation(mut self, strategy: ViolationStrategy) -> Self {
        self.on_violation = strategy;
        self
    }

    pub fn build(self) -> RecordRules {
        RecordRules {
            renter_invariant: self.renter_invariant,
            key_consistency: self.key_consistency,
            required_checks: self.required_checks,
            on_violation: self.on_violation,
        }
    }
}

impl Default for RecordRulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
