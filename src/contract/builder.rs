//! Fluent construction of a [`BookContract`].

use super::BookContract;
use crate::codec::RecordCodec;
use crate::config::{ContractConfig, RecordPolicy};
use crate::lifecycle::LifecycleEngine;
use crate::validation::{
    RecordCheck, RecordContext, RecordRulesBuilder, RecordViolation, ViolationStrategy,
};
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Errors that can occur when building a contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Scan range is empty: start '{start}' sorts after end '{end}'")]
    InvalidScanRange { start: String, end: String },
}

/// Builder for [`BookContract`].
///
/// ```rust
/// use bookledger::contract::BookContract;
/// use bookledger::validation::ViolationStrategy;
///
/// let contract = BookContract::builder()
///     .scan_range("A", "N")
///     .key_consistency(true)
///     .on_violation(ViolationStrategy::IgnoreAndLog)
///     .build()
///     .unwrap();
///
/// assert!(contract.codec().rules().key_consistency());
/// ```
pub struct ContractBuilder {
    config: ContractConfig,
    checks: Vec<RecordCheck>,
}

impl ContractBuilder {
    pub fn new() -> Self {
        Self {
            config: ContractConfig::default(),
            checks: Vec::new(),
        }
    }

    /// Replace every setting with `config`. Custom checks already added are kept.
    pub fn config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    /// Keys covered by `query_all_books`: `start` inclusive, `end` exclusive.
    /// An empty bound is open.
    pub fn scan_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.config.scan_start_key = start.into();
        self.config.scan_end_key = end.into();
        self
    }

    pub fn records(mut self, policy: RecordPolicy) -> Self {
        self.config.records = policy;
        self
    }

    pub fn renter_invariant(mut self, enabled: bool) -> Self {
        self.config.records.renter_invariant = enabled;
        self
    }

    pub fn key_consistency(mut self, enabled: bool) -> Self {
        self.config.records.key_consistency = enabled;
        self
    }

    pub fn on_violation(mut self, strategy: ViolationStrategy) -> Self {
        self.config.records.on_violation = strategy;
        self
    }

    /// Add a custom check run on every decoded record.
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&RecordContext<'_>) -> Validation<(), NonEmptyVec<RecordViolation>>
            + Send
            + Sync
            + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Build the contract.
    /// Returns an error if the scan range can never match a key.
    pub fn build(self) -> Result<BookContract, BuildError> {
        let ContractConfig {
            scan_start_key,
            scan_end_key,
            records,
        } = self.config;

        if !scan_start_key.is_empty() && !scan_end_key.is_empty() && scan_start_key > scan_end_key
        {
            return Err(BuildError::InvalidScanRange {
                start: scan_start_key,
                end: scan_end_key,
            });
        }

        let rules = self.checks.into_iter().fold(
            RecordRulesBuilder::new()
                .renter_invariant(records.renter_invariant)
                .key_consistency(records.key_consistency)
                .on_violation(records.on_violation),
            |builder, check| builder.require(check),
        );

        Ok(BookContract {
            engine: LifecycleEngine::new(),
            codec: RecordCodec::new(rules.build()),
            scan_start: scan_start_key,
            scan_end: scan_end_key,
        })
    }
}

impl Default for ContractBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContractBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBuilder")
            .field("config", &self.config)
            .field("checks", &format!("<{} checks>", self.checks.len()))
            .finish()
    }
}
