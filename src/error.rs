//! Error types for the CWR export pipeline.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`ConfigError`] - Invalid export-wide options (sender, revision, ...)
//! - [`FieldError`] - A record field setter received an invalid value
//! - [`RuleViolation`] - A business rule rejected a work
//! - [`StructuralError`] - A record layout is missing a required field slot
//! - [`ExportError`] - Top-level export errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! [`ConfigError`] and [`StructuralError`] are always fatal to the whole
//! export: they indicate a caller or wiring mistake, not bad work data.
//! [`FieldError`] and [`RuleViolation`] are per-work and may be converted
//! into skip markers depending on the configured invalid-work policy.

use thiserror::Error;

// =============================================================================
// Configuration Errors (export-wide options)
// =============================================================================

/// Errors in export-wide options, detected before any rendering starts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Unrecognized sender type.
    #[error("Unrecognized sender type: {0:?} (expected PB, AA, WR or SO)")]
    UnknownSenderType(String),

    /// Sender id does not match the format required by the sender type.
    #[error("Invalid sender id {id:?} for sender type {sender_type}: {expected}")]
    InvalidSenderId {
        sender_type: &'static str,
        id: String,
        expected: &'static str,
    },

    /// Sender name exceeds 45 characters.
    #[error("Sender name exceeds 45 characters: {0:?}")]
    SenderNameTooLong(String),

    /// Character set name exceeds 15 characters.
    #[error("Character set name exceeds 15 characters: {0:?}")]
    CharacterSetTooLong(String),

    /// Unrecognized character set.
    #[error("Unrecognized character set: {0:?} (expected ASCII, UTF-8 or ISO-8859-1)")]
    UnknownCharacterSet(String),

    /// Revision is not 1-3 digits.
    #[error("Revision must be 1-3 digits: {0:?}")]
    InvalidRevision(String),

    /// Software package or version exceeds 30 characters.
    #[error("{field} exceeds 30 characters: {value:?}")]
    SoftwareFieldTooLong { field: &'static str, value: String },

    /// Unrecognized transaction type.
    #[error("Unrecognized transaction type: {0:?} (expected NWR, REV, DEL or REC)")]
    UnknownTransactionType(String),

    /// Export requested without any works.
    #[error("No works supplied to export")]
    NoWorks,
}

// =============================================================================
// Field Errors (per-record validated setters)
// =============================================================================

/// Errors raised by record field setters and encoding primitives.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FieldError {
    /// A text value does not fit its declared field width.
    #[error("Value {value:?} exceeds width {width} of field '{field}'")]
    Overflow {
        field: &'static str,
        width: usize,
        value: String,
    },

    /// A numeric value does not fit its declared field width.
    #[error("Number {value} does not fit in {width} digits of field '{field}'")]
    NumericOverflow {
        field: &'static str,
        width: usize,
        value: u64,
    },

    /// A value is not a member of the field's declared code set.
    #[error("Value {value:?} is not a valid code for field '{field}'")]
    InvalidCode { field: &'static str, value: String },

    /// A share is outside the bound for its right.
    #[error("Share {value} exceeds maximum {max} (hundredths of a percent) for field '{field}'")]
    ShareOutOfRange {
        field: &'static str,
        value: u32,
        max: u16,
    },

    /// A percentage input could not be normalized.
    #[error("Percentage {value} is outside 0..={max}")]
    PercentOutOfRange { value: f64, max: u16 },

    /// A sequence number is outside [1, 999].
    #[error("Sequence number {0} is outside 1..=999")]
    SequenceOutOfRange(u32),

    /// A group id is outside [1, 99999].
    #[error("Group id {0} is outside 1..=99999")]
    GroupIdOutOfRange(u32),

    /// A group id was already used earlier in the same export.
    #[error("Group id {0} already used in this export")]
    DuplicateGroupId(u32),

    /// A mandatory interested party number is empty or exceeds 9 characters.
    #[error("Interested party number {value:?} is invalid for field '{field}': {reason}")]
    InvalidInterestedPartyNumber {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A language code is not two ASCII uppercase letters.
    #[error("Invalid language code: {0:?}")]
    InvalidLanguageCode(String),

    /// A territory code is outside the TIS numeric range.
    #[error("Invalid TIS territory code: {0}")]
    InvalidTerritoryCode(u32),
}

// =============================================================================
// Business Rule Violations
// =============================================================================

/// A business rule rejected a work before rendering.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Rule '{rule}' rejected work {work:?}: {reason}")]
pub struct RuleViolation {
    /// Name of the failing rule.
    pub rule: &'static str,
    /// Submitter work number of the rejected work.
    pub work: String,
    /// Human-readable reason.
    pub reason: String,
}

// =============================================================================
// Structural Errors (layout wiring)
// =============================================================================

/// A record layout does not declare a field slot a capability requires.
///
/// This is a wiring bug in a record-type definition, never a data problem.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Record type '{record_type}' does not declare field '{field}'")]
pub struct StructuralError {
    pub record_type: &'static str,
    pub field: &'static str,
}

// =============================================================================
// Export Errors (top-level)
// =============================================================================

/// Top-level export errors.
///
/// This is the main error type returned by [`crate::export::Exporter`] and
/// the [`crate::builder::CwrExportBuilder`] facade. It wraps all lower-level
/// errors and adds sink I/O.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Invalid export-wide option.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid field value.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// A business rule rejected a work (abort policy).
    #[error("Business rule violation: {0}")]
    Rule(#[from] RuleViolation),

    /// Record layout wiring error.
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Sink write failed.
    #[error("Sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for field setters and encoding primitives.
pub type FieldResult<T> = Result<T, FieldError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // FieldError -> ExportError
        let field_err = FieldError::SequenceOutOfRange(1000);
        let export_err: ExportError = field_err.into();
        assert!(export_err.to_string().contains("1000"));

        // ConfigError -> ExportError
        let config_err = ConfigError::NoWorks;
        let export_err: ExportError = config_err.into();
        assert!(export_err.to_string().contains("No works"));
    }

    #[test]
    fn test_rule_violation_format() {
        let err = RuleViolation {
            rule: "writers-required",
            work: "WK000001".into(),
            reason: "work has no writers".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("writers-required"));
        assert!(msg.contains("WK000001"));
    }

    #[test]
    fn test_structural_error_names_record_and_field() {
        let err = StructuralError {
            record_type: "SPU",
            field: "pr_ownership_share",
        };
        let msg = err.to_string();
        assert!(msg.contains("SPU"));
        assert!(msg.contains("pr_ownership_share"));
    }
}
