//! Business-rule validation for works.
//!
//! A [`Rule`] is a named, pure check over one [`WorkDefinition`]. The
//! [`Validator`] runs an explicit ordered chain of rules against each work
//! independently; the first failing rule aborts validation for that work
//! with its reason, and later rules are not evaluated. The chain is a
//! literal list — callers supply their own or use [`Validator::default`] —
//! never discovered by scanning.
//!
//! The validator is stateless across works; no share aggregation spans the
//! whole file.

pub mod rules;

use crate::encoding::SHARE_TOLERANCE;
use crate::error::RuleViolation;
use crate::models::{TerritoryShare, WorkDefinition};

// =============================================================================
// Rule Contract
// =============================================================================

/// One business rule in the chain.
pub trait Rule: Send + Sync {
    /// Stable rule name, used in violation reports.
    fn name(&self) -> &'static str;

    /// Check one work. The first failing rule in the chain wins.
    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation>;
}

/// Build a violation for `work` in the name of `rule`.
pub(crate) fn reject(
    rule: &'static str,
    work: &WorkDefinition,
    reason: impl Into<String>,
) -> RuleViolation {
    RuleViolation {
        rule,
        work: work.submitter_work_number.clone(),
        reason: reason.into(),
    }
}

// =============================================================================
// Shared Predicates
// =============================================================================

/// True if any territory entry carries a nonzero PR/MR/SR collection share.
pub fn has_any_collection_share(territories: &[TerritoryShare]) -> bool {
    territories.iter().any(TerritoryShare::has_any_share)
}

/// True if `sum` equals `target` within the ±0.06% share tolerance.
pub fn sums_to(sum: u32, target: u32) -> bool {
    sum.abs_diff(target) <= u32::from(SHARE_TOLERANCE)
}

// =============================================================================
// Validator
// =============================================================================

/// An ordered, deterministic rule chain.
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
}

impl Validator {
    /// Build a validator over an explicit ordered rule list.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Names of the active rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run the chain against one work. Returns the first violation, if any.
    pub fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        for rule in &self.rules {
            rule.validate(work)?;
        }
        Ok(())
    }
}

impl Default for Validator {
    /// The default chain, in order: title, work number, writers present,
    /// controlled-writer identity, uncontrolled-writer collection,
    /// ownership balance.
    fn default() -> Self {
        Self::new(vec![
            Box::new(rules::TitleRequired),
            Box::new(rules::WorkNumberRequired),
            Box::new(rules::WritersRequired),
            Box::new(rules::ControlledWriterIdentity),
            Box::new(rules::UncontrolledWriterCollection),
            Box::new(rules::OwnershipBalance),
        ])
    }
}
