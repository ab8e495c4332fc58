//! The built-in business rules.
//!
//! Each rule is an independent unit struct so callers can assemble custom
//! chains from any subset, in any order.

use super::{has_any_collection_share, reject, sums_to, Rule};
use crate::error::RuleViolation;
use crate::models::WorkDefinition;

/// The work title must be present and non-blank.
pub struct TitleRequired;

impl Rule for TitleRequired {
    fn name(&self) -> &'static str {
        "title-required"
    }

    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        if work.work_title.trim().is_empty() {
            return Err(reject(self.name(), work, "work title is blank"));
        }
        Ok(())
    }
}

/// The submitter work number must be present and at most 14 characters.
pub struct WorkNumberRequired;

impl Rule for WorkNumberRequired {
    fn name(&self) -> &'static str {
        "work-number-required"
    }

    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        let number = work.submitter_work_number.trim();
        if number.is_empty() {
            return Err(reject(self.name(), work, "submitter work number is blank"));
        }
        if number.chars().count() > 14 {
            return Err(reject(
                self.name(),
                work,
                format!("submitter work number {number:?} exceeds 14 characters"),
            ));
        }
        Ok(())
    }
}

/// A registration without writers cannot be distributed.
pub struct WritersRequired;

impl Rule for WritersRequired {
    fn name(&self) -> &'static str {
        "writers-required"
    }

    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        if work.writers.is_empty() {
            return Err(reject(self.name(), work, "work has no writers"));
        }
        Ok(())
    }
}

/// Controlled writers must be identifiable: last name and interested party
/// number present.
pub struct ControlledWriterIdentity;

impl Rule for ControlledWriterIdentity {
    fn name(&self) -> &'static str {
        "controlled-writer-identity"
    }

    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        for (i, writer) in work.writers.iter().enumerate() {
            if !writer.is_controlled() {
                continue;
            }
            if writer.last_name.trim().is_empty() {
                return Err(reject(
                    self.name(),
                    work,
                    format!("controlled writer #{} has no last name", i + 1),
                ));
            }
            if writer.interested_party_number.is_none() {
                return Err(reject(
                    self.name(),
                    work,
                    format!(
                        "controlled writer {:?} has no interested party number",
                        writer.last_name
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Collection shares are only submitted for controlled writers.
pub struct UncontrolledWriterCollection;

impl Rule for UncontrolledWriterCollection {
    fn name(&self) -> &'static str {
        "uncontrolled-writer-collection"
    }

    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        for writer in &work.writers {
            if !writer.is_controlled() && has_any_collection_share(&writer.territories) {
                return Err(reject(
                    self.name(),
                    work,
                    format!(
                        "writer {:?} is not controlled but carries collection shares",
                        writer.last_name
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Per right, ownership across all writers and publishers must total either
/// 0% or 100%, within the ±0.06% tolerance.
pub struct OwnershipBalance;

impl Rule for OwnershipBalance {
    fn name(&self) -> &'static str {
        "ownership-balance"
    }

    fn validate(&self, work: &WorkDefinition) -> Result<(), RuleViolation> {
        let rights: [(&str, u32); 3] = [
            (
                "PR",
                work.writers
                    .iter()
                    .map(|w| u32::from(w.pr_ownership_share))
                    .chain(work.publishers.iter().map(|p| u32::from(p.pr_ownership_share)))
                    .sum(),
            ),
            (
                "MR",
                work.writers
                    .iter()
                    .map(|w| u32::from(w.mr_ownership_share))
                    .chain(work.publishers.iter().map(|p| u32::from(p.mr_ownership_share)))
                    .sum(),
            ),
            (
                "SR",
                work.writers
                    .iter()
                    .map(|w| u32::from(w.sr_ownership_share))
                    .chain(work.publishers.iter().map(|p| u32::from(p.sr_ownership_share)))
                    .sum(),
            ),
        ];

        for (right, total) in rights {
            if total != 0 && !sums_to(total, 10_000) {
                return Err(reject(
                    self.name(),
                    work,
                    format!(
                        "{right} ownership totals {}.{:02}% (must be 0% or 100%)",
                        total / 100,
                        total % 100
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublisherDefinition, TerritoryShare, TisCode, WriterDefinition};

    fn valid_work() -> WorkDefinition {
        let mut work = WorkDefinition::new("MY SONG", "WK000001");
        let mut writer = WriterDefinition::new("DOE");
        writer.interested_party_number = Some("W0001".into());
        writer.pr_ownership_share = 5000;
        let mut publisher = PublisherDefinition::new("ACME MUSIC");
        publisher.interested_party_number = Some("P0001".into());
        publisher.pr_ownership_share = 5000;
        work.add_writer(writer);
        work.add_publisher(publisher);
        work
    }

    #[test]
    fn test_valid_work_passes_every_rule() {
        assert!(crate::validation::Validator::default()
            .validate(&valid_work())
            .is_ok());
    }

    #[test]
    fn test_work_number_length() {
        let mut work = valid_work();
        work.submitter_work_number = "123456789012345".into(); // 15 chars
        let violation = WorkNumberRequired.validate(&work).unwrap_err();
        assert_eq!(violation.rule, "work-number-required");
    }

    #[test]
    fn test_controlled_writer_needs_ip_number() {
        let mut work = valid_work();
        work.writers[0].interested_party_number = None;
        let violation = ControlledWriterIdentity.validate(&work).unwrap_err();
        assert!(violation.reason.contains("interested party number"));

        // Not controlled: the rule does not apply.
        work.writers[0].controlled = Some(false);
        assert!(ControlledWriterIdentity.validate(&work).is_ok());
    }

    #[test]
    fn test_uncontrolled_writer_collection_rejected() {
        let mut work = valid_work();
        work.writers[0].controlled = Some(false);
        let mut entry = TerritoryShare::new(TisCode::WORLD);
        entry.pr_collection_share = 100;
        work.writers[0].add_territory(entry);

        let violation = UncontrolledWriterCollection.validate(&work).unwrap_err();
        assert!(violation.reason.contains("not controlled"));
    }

    #[test]
    fn test_ownership_balance_tolerance() {
        // 50% + 50% = exactly 100%.
        assert!(OwnershipBalance.validate(&valid_work()).is_ok());

        // Within ±0.06%: accepted.
        let mut work = valid_work();
        work.publishers[0].pr_ownership_share = 4995;
        assert!(OwnershipBalance.validate(&work).is_ok());

        // Outside the tolerance: rejected.
        work.publishers[0].pr_ownership_share = 4000;
        let violation = OwnershipBalance.validate(&work).unwrap_err();
        assert!(violation.reason.contains("PR"));

        // All-zero rights are allowed (nothing claimed for that right).
        work.writers[0].pr_ownership_share = 0;
        work.publishers[0].pr_ownership_share = 0;
        assert!(OwnershipBalance.validate(&work).is_ok());
    }
}
