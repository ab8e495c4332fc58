//! Builder facade: validated export-wide options and the fluent entry point.
//!
//! [`CwrExportBuilder`] collects sender metadata, format selection and the
//! work list, validates every export-wide option up front, and delegates to
//! the [`Exporter`](crate::export::Exporter). It carries no format
//! knowledge itself.
//!
//! Sender id rules depend on the sender type: publishers, administrative
//! agencies and writers identify with a numeric identifier of at least nine
//! digits; societies use their 3-5 character alphanumeric society code.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigError, ConfigResult, ExportResult};
use crate::export::{self, ExportSummary};
use crate::models::{
    CharacterSet, CwrVersion, SenderType, TransactionType, WorkDefinition,
};
use crate::validation::{Rule, Validator};

static NUMERIC_SENDER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{9,}$").expect("static sender id pattern"));
static SOCIETY_SENDER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{3,5}$").expect("static society id pattern"));
static REVISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}$").expect("static revision pattern"));

// =============================================================================
// Options
// =============================================================================

/// What to do with a work that fails validation or field encoding.
///
/// The choice is explicit: a partial file is only produced when the caller
/// opts into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidWorkPolicy {
    /// Emit a skip marker, collect the reason, continue with the next work.
    Skip,
    /// Fail the whole export at the first invalid work.
    #[default]
    Abort,
}

/// Validated export-wide options.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub sender_type: SenderType,
    pub sender_id: String,
    pub sender_name: String,
    pub character_set: CharacterSet,
    /// Format revision, 1-3 digits.
    pub revision: u16,
    pub software_package: String,
    pub software_package_version: String,
    pub transaction_type: TransactionType,
    pub version: CwrVersion,
    pub group_id: u32,
    pub invalid_work_policy: InvalidWorkPolicy,
    /// Pinned creation timestamp; `None` means "now" at export time.
    pub creation_timestamp: Option<NaiveDateTime>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sender_type: SenderType::Publisher,
            sender_id: "000000000".into(),
            sender_name: String::new(),
            character_set: CharacterSet::default(),
            revision: 1,
            software_package: String::new(),
            software_package_version: String::new(),
            transaction_type: TransactionType::default(),
            version: CwrVersion::default(),
            group_id: 1,
            invalid_work_policy: InvalidWorkPolicy::default(),
            creation_timestamp: None,
        }
    }
}

/// Check a sender id against the format its sender type requires.
pub fn validate_sender_id(sender_type: SenderType, id: &str) -> ConfigResult<()> {
    let (pattern, expected): (&Regex, &'static str) = match sender_type {
        SenderType::Society => (
            &SOCIETY_SENDER_ID,
            "expected a 3-5 character alphanumeric society code",
        ),
        _ => (
            &NUMERIC_SENDER_ID,
            "expected a numeric identifier of at least 9 digits",
        ),
    };
    if pattern.is_match(id) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSenderId {
            sender_type: sender_type.to_code(),
            id: id.to_string(),
            expected,
        })
    }
}

/// Parse and validate a sender type code plus id pair.
///
/// An unrecognized sender type is rejected outright, regardless of the id.
pub fn parse_sender(type_code: &str, id: &str) -> ConfigResult<SenderType> {
    let sender_type = SenderType::from_code(type_code)
        .ok_or_else(|| ConfigError::UnknownSenderType(type_code.to_string()))?;
    validate_sender_id(sender_type, id)?;
    Ok(sender_type)
}

// =============================================================================
// Builder
// =============================================================================

/// Fluent facade over the exporter.
///
/// String-typed inputs (sender type, character set, revision, transaction
/// type) are validated when an `export_*` method runs; the first offending
/// option is reported.
pub struct CwrExportBuilder {
    sender_type_code: String,
    sender_id: String,
    sender_name: String,
    character_set_code: String,
    revision: String,
    software_package: String,
    software_package_version: String,
    transaction_type_code: String,
    version: CwrVersion,
    group_id: u32,
    invalid_work_policy: InvalidWorkPolicy,
    creation_timestamp: Option<NaiveDateTime>,
    works: Vec<WorkDefinition>,
    validator: Validator,
}

impl Default for CwrExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CwrExportBuilder {
    pub fn new() -> Self {
        Self {
            sender_type_code: "PB".into(),
            sender_id: "000000000".into(),
            sender_name: String::new(),
            character_set_code: "ASCII".into(),
            revision: "1".into(),
            software_package: String::new(),
            software_package_version: String::new(),
            transaction_type_code: "NWR".into(),
            version: CwrVersion::default(),
            group_id: 1,
            invalid_work_policy: InvalidWorkPolicy::default(),
            creation_timestamp: None,
            works: Vec::new(),
            validator: Validator::default(),
        }
    }

    /// Sender identity: type code (PB/AA/WR/SO), id and name.
    pub fn sender(
        mut self,
        type_code: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.sender_type_code = type_code.into();
        self.sender_id = id.into();
        self.sender_name = name.into();
        self
    }

    /// Character set declared in the file header (ASCII/UTF-8/ISO-8859-1).
    pub fn character_set(mut self, code: impl Into<String>) -> Self {
        self.character_set_code = code.into();
        self
    }

    /// Format revision, 1-3 digits.
    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Software package identification carried in the v2.2 header.
    pub fn software(mut self, package: impl Into<String>, version: impl Into<String>) -> Self {
        self.software_package = package.into();
        self.software_package_version = version.into();
        self
    }

    /// Transaction type code (NWR/REV/DEL/REC).
    pub fn transaction_type(mut self, code: impl Into<String>) -> Self {
        self.transaction_type_code = code.into();
        self
    }

    /// Format generation to render.
    pub fn version(mut self, version: CwrVersion) -> Self {
        self.version = version;
        self
    }

    /// Group id for the single group of this export.
    pub fn group_id(mut self, group_id: u32) -> Self {
        self.group_id = group_id;
        self
    }

    /// Invalid works become skip markers instead of aborting the export.
    pub fn skip_invalid_works(mut self) -> Self {
        self.invalid_work_policy = InvalidWorkPolicy::Skip;
        self
    }

    /// Pin the creation timestamp (otherwise "now" at export time).
    pub fn creation_timestamp(mut self, stamp: NaiveDateTime) -> Self {
        self.creation_timestamp = Some(stamp);
        self
    }

    /// Replace the default rule chain with an explicit ordered list.
    pub fn rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.validator = Validator::new(rules);
        self
    }

    /// Append one work.
    pub fn add_work(mut self, work: WorkDefinition) -> Self {
        self.works.push(work);
        self
    }

    /// Append a list of works.
    pub fn works(mut self, works: impl IntoIterator<Item = WorkDefinition>) -> Self {
        self.works.extend(works);
        self
    }

    /// Validate every export-wide option into an [`ExportOptions`].
    pub fn build_options(&self) -> ConfigResult<ExportOptions> {
        let sender_type = parse_sender(&self.sender_type_code, &self.sender_id)?;
        if self.sender_name.chars().count() > 45 {
            return Err(ConfigError::SenderNameTooLong(self.sender_name.clone()));
        }
        if self.character_set_code.chars().count() > 15 {
            return Err(ConfigError::CharacterSetTooLong(
                self.character_set_code.clone(),
            ));
        }
        let character_set = CharacterSet::from_code(&self.character_set_code)
            .ok_or_else(|| ConfigError::UnknownCharacterSet(self.character_set_code.clone()))?;
        if !REVISION.is_match(&self.revision) {
            return Err(ConfigError::InvalidRevision(self.revision.clone()));
        }
        // The pattern above caps the revision at three digits.
        let revision: u16 = self.revision.parse().unwrap_or_default();
        if self.software_package.chars().count() > 30 {
            return Err(ConfigError::SoftwareFieldTooLong {
                field: "software package",
                value: self.software_package.clone(),
            });
        }
        if self.software_package_version.chars().count() > 30 {
            return Err(ConfigError::SoftwareFieldTooLong {
                field: "software package version",
                value: self.software_package_version.clone(),
            });
        }
        let transaction_type = TransactionType::from_code(&self.transaction_type_code)
            .ok_or_else(|| {
                ConfigError::UnknownTransactionType(self.transaction_type_code.clone())
            })?;

        Ok(ExportOptions {
            sender_type,
            sender_id: self.sender_id.to_uppercase(),
            sender_name: self.sender_name.clone(),
            character_set,
            revision,
            software_package: self.software_package.clone(),
            software_package_version: self.software_package_version.clone(),
            transaction_type,
            version: self.version,
            group_id: self.group_id,
            invalid_work_policy: self.invalid_work_policy,
            creation_timestamp: self.creation_timestamp,
        })
    }

    /// Export to any writer.
    pub fn export_to_writer<W: std::io::Write>(
        &self,
        sink: &mut W,
    ) -> ExportResult<ExportSummary> {
        let options = self.build_options()?;
        if self.works.is_empty() {
            return Err(ConfigError::NoWorks.into());
        }
        export::Exporter::new(&options, &self.validator).export(&self.works, sink)
    }

    /// Export into an in-memory string.
    pub fn export_to_string(&self) -> ExportResult<(String, ExportSummary)> {
        let mut buffer = Vec::new();
        let summary = self.export_to_writer(&mut buffer)?;
        let text = String::from_utf8(buffer)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok((text, summary))
    }

    /// Export to a file path.
    pub fn export_to_file(&self, path: &std::path::Path) -> ExportResult<ExportSummary> {
        let mut file = std::fs::File::create(path)?;
        self.export_to_writer(&mut file)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublisherDefinition, WriterDefinition};

    fn minimal_work() -> WorkDefinition {
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
    fn test_sender_id_formats() {
        // SO: 3-5 character alphanumeric code.
        assert!(parse_sender("SO", "BMI").is_ok());
        assert!(parse_sender("SO", "12").is_err());
        // PB: numeric identifier of at least 9 digits.
        assert!(parse_sender("PB", "123456789").is_ok());
        assert!(parse_sender("PB", "12345").is_err());
        // Unrecognized sender type: rejected regardless of id.
        assert!(matches!(
            parse_sender("XX", "123456789"),
            Err(ConfigError::UnknownSenderType(_))
        ));
    }

    #[test]
    fn test_sender_id_variants() {
        // 11-digit IPI identifiers are fine for agencies and writers.
        assert!(parse_sender("AA", "12345678901").is_ok());
        assert!(parse_sender("WR", "123456789").is_ok());
        assert!(parse_sender("WR", "12345678A").is_err());
        // Society codes may be up to five characters.
        assert!(parse_sender("SO", "ASCAP").is_ok());
        assert!(parse_sender("SO", "SOCAN1").is_err());
    }

    #[test]
    fn test_option_bounds() {
        let builder = CwrExportBuilder::new().sender("PB", "123456789", "X".repeat(46));
        assert!(matches!(
            builder.build_options(),
            Err(ConfigError::SenderNameTooLong(_))
        ));

        let builder = CwrExportBuilder::new().revision("1234");
        assert!(matches!(
            builder.build_options(),
            Err(ConfigError::InvalidRevision(_))
        ));

        let builder = CwrExportBuilder::new().revision("");
        assert!(builder.build_options().is_err());

        let builder = CwrExportBuilder::new().software("X".repeat(31), "1");
        assert!(matches!(
            builder.build_options(),
            Err(ConfigError::SoftwareFieldTooLong { .. })
        ));

        let builder = CwrExportBuilder::new().transaction_type("XYZ");
        assert!(matches!(
            builder.build_options(),
            Err(ConfigError::UnknownTransactionType(_))
        ));

        let builder = CwrExportBuilder::new().character_set("EBCDIC");
        assert!(matches!(
            builder.build_options(),
            Err(ConfigError::UnknownCharacterSet(_))
        ));
    }

    #[test]
    fn test_export_without_works_fails() {
        let err = CwrExportBuilder::new()
            .sender("PB", "123456789", "ACME MUSIC")
            .export_to_string()
            .unwrap_err();
        assert!(err.to_string().contains("No works"));
    }

    #[test]
    fn test_full_fluent_export() {
        let stamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let (text, summary) = CwrExportBuilder::new()
            .sender("SO", "bmi", "BROADCAST MUSIC")
            .character_set("ASCII")
            .revision("1")
            .software("CWRGEN", "0.1.0")
            .transaction_type("NWR")
            .version(CwrVersion::V22)
            .creation_timestamp(stamp)
            .add_work(minimal_work())
            .export_to_string()
            .unwrap();

        assert_eq!(summary.transaction_count, 1);
        // Society codes render uppercased.
        assert!(text.starts_with("HDRSOBMI"));
    }
}
