//! Domain models for the CWR export pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`WorkDefinition`] - One musical work with all its rights holders
//! - [`WriterDefinition`] - A writer with ownership shares and territories
//! - [`PublisherDefinition`] - A publisher with ownership shares and territories
//! - [`TerritoryShare`] - Per-territory collection shares
//! - Code-set enums ([`TransactionType`], [`SenderType`], [`WriterDesignation`], ...)
//!
//! All share values are carried as integer hundredths of a percent
//! (5000 = 50.00%). Use [`crate::encoding::normalize_share`] to convert
//! caller-facing fractional percents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

// =============================================================================
// Transaction Type
// =============================================================================

/// Transaction type of an export group.
///
/// Based on CWR transaction header codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionType {
    /// New work registration (NWR).
    #[default]
    NewWork,
    /// Revised registration (REV).
    Revision,
    /// Work deletion (DEL).
    Deletion,
    /// Recorded work notification (REC).
    Recording,
}

impl TransactionType {
    /// Parse from a CWR code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "NWR" => Some(Self::NewWork),
            "REV" => Some(Self::Revision),
            "DEL" => Some(Self::Deletion),
            "REC" => Some(Self::Recording),
            _ => None,
        }
    }

    /// Convert to the three-character CWR code.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::NewWork => "NWR",
            Self::Revision => "REV",
            Self::Deletion => "DEL",
            Self::Recording => "REC",
        }
    }
}

// =============================================================================
// Sender Type
// =============================================================================

/// Type of the submitting party in the file header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SenderType {
    /// Publisher (PB).
    Publisher,
    /// Administrative agency (AA).
    AdministrativeAgency,
    /// Writer (WR).
    Writer,
    /// Society (SO).
    Society,
}

impl SenderType {
    /// Parse from a CWR code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "PB" => Some(Self::Publisher),
            "AA" => Some(Self::AdministrativeAgency),
            "WR" => Some(Self::Writer),
            "SO" => Some(Self::Society),
            _ => None,
        }
    }

    /// Convert to the two-character CWR code.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Publisher => "PB",
            Self::AdministrativeAgency => "AA",
            Self::Writer => "WR",
            Self::Society => "SO",
        }
    }
}

// =============================================================================
// Character Set
// =============================================================================

/// Character set declared in the file header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CharacterSet {
    #[default]
    Ascii,
    Utf8,
    Latin1,
}

impl CharacterSet {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "ASCII" => Some(Self::Ascii),
            "UTF-8" | "UTF8" => Some(Self::Utf8),
            "ISO-8859-1" | "LATIN-1" | "LATIN1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
        }
    }
}

// =============================================================================
// Format Version
// =============================================================================

/// CWR format generation to render.
///
/// v2.2 is v2.1 plus appended field blocks on selected record types; byte
/// offsets of inherited fields never move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CwrVersion {
    V21,
    #[default]
    V22,
}

impl CwrVersion {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "2.1" | "21" | "V21" | "v21" => Some(Self::V21),
            "2.2" | "22" | "V22" | "v22" => Some(Self::V22),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::V21 => "2.1",
            Self::V22 => "2.2",
        }
    }
}

// =============================================================================
// Work Attributes
// =============================================================================

/// Musical work distribution category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DistributionCategory {
    /// Jazz (JAZ).
    Jazz,
    /// Popular (POP).
    #[default]
    Popular,
    /// Serious / classical (SER).
    Serious,
    /// Unclassified (UNC).
    Unclassified,
}

impl DistributionCategory {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "JAZ" => Some(Self::Jazz),
            "POP" => Some(Self::Popular),
            "SER" => Some(Self::Serious),
            "UNC" => Some(Self::Unclassified),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Jazz => "JAZ",
            Self::Popular => "POP",
            Self::Serious => "SER",
            Self::Unclassified => "UNC",
        }
    }
}

/// Version type of the work itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VersionType {
    /// Original work (ORI).
    #[default]
    Original,
    /// Modified version of another work (MOD).
    Modified,
}

impl VersionType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "ORI" | "ORIGINAL" => Some(Self::Original),
            "MOD" | "MODIFIED" => Some(Self::Modified),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Original => "ORI",
            Self::Modified => "MOD",
        }
    }
}

// =============================================================================
// Writer Designation
// =============================================================================

/// Role of a writer in a musical work.
///
/// Based on CISAC writer designation codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WriterDesignation {
    /// Composer and Author (CA).
    #[default]
    ComposerAuthor,
    /// Author, lyrics only (A).
    Author,
    /// Composer, music only (C).
    Composer,
    /// Arranger (AR).
    Arranger,
    /// Adaptor (AD).
    Adaptor,
    /// Translator (TR).
    Translator,
    /// Sub-Author (SA).
    SubAuthor,
    /// Sub-Arranger (SR).
    SubArranger,
}

impl WriterDesignation {
    /// Parse from a CISAC code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "CA" | "COMPOSER_AUTHOR" => Some(Self::ComposerAuthor),
            "A" | "AUTHOR" => Some(Self::Author),
            "C" | "COMPOSER" => Some(Self::Composer),
            "AR" | "ARRANGER" => Some(Self::Arranger),
            "AD" | "ADAPTOR" | "ADAPTER" => Some(Self::Adaptor),
            "TR" | "TRANSLATOR" => Some(Self::Translator),
            "SA" | "SUB_AUTHOR" => Some(Self::SubAuthor),
            "SR" | "SUB_ARRANGER" => Some(Self::SubArranger),
            _ => None,
        }
    }

    /// Convert to CISAC code.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::ComposerAuthor => "CA",
            Self::Author => "A",
            Self::Composer => "C",
            Self::Arranger => "AR",
            Self::Adaptor => "AD",
            Self::Translator => "TR",
            Self::SubAuthor => "SA",
            Self::SubArranger => "SR",
        }
    }
}

// =============================================================================
// Publisher Type
// =============================================================================

/// Role of a publisher in a musical work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PublisherType {
    /// Original publisher (E).
    #[default]
    Original,
    /// Administrator (AM).
    Administrator,
    /// Sub-publisher (SE).
    SubPublisher,
    /// Income participant (PA).
    IncomeParticipant,
}

impl PublisherType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "E" | "ORIGINAL" => Some(Self::Original),
            "AM" | "ADMINISTRATOR" => Some(Self::Administrator),
            "SE" | "SUB_PUBLISHER" => Some(Self::SubPublisher),
            "PA" | "INCOME_PARTICIPANT" => Some(Self::IncomeParticipant),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Original => "E",
            Self::Administrator => "AM",
            Self::SubPublisher => "SE",
            Self::IncomeParticipant => "PA",
        }
    }
}

// =============================================================================
// Language / Territory Codes
// =============================================================================

/// A two-letter language code in canonical uppercase form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Validate and normalize a language code.
    pub fn new(code: &str) -> Result<Self, FieldError> {
        let normalized = code.trim().to_uppercase();
        if normalized.len() == 2 && normalized.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(normalized))
        } else {
            Err(FieldError::InvalidLanguageCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// A numeric TIS (Territory Information System) territory code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub struct TisCode(u16);

impl TisCode {
    /// The whole world, TIS 2136.
    pub const WORLD: TisCode = TisCode(2136);

    /// Validate a TIS code. Codes are numeric, 1..=2136.
    pub fn new(code: u32) -> Result<Self, FieldError> {
        if (1..=2136).contains(&code) {
            Ok(Self(code as u16))
        } else {
            Err(FieldError::InvalidTerritoryCode(code))
        }
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u32> for TisCode {
    type Error = FieldError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TisCode> for u32 {
    fn from(code: TisCode) -> Self {
        u32::from(code.0)
    }
}

// =============================================================================
// Territory Shares
// =============================================================================

/// Whether a territory entry includes or excludes its territory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TerritoryInclusion {
    /// Territory is included (I).
    #[default]
    Include,
    /// Territory is excluded (E).
    Exclude,
}

impl TerritoryInclusion {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Include => "I",
            Self::Exclude => "E",
        }
    }
}

/// Collection shares a collecting body administers in one territory.
///
/// Shares are hundredths of a percent; PR is capped at 5000 (50.00%), MR and
/// SR at 10000 (100.00%).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryShare {
    /// TIS territory code.
    pub territory: TisCode,
    /// Include or exclude this territory.
    #[serde(default)]
    pub inclusion: TerritoryInclusion,
    /// Performing-right collection share.
    #[serde(default)]
    pub pr_collection_share: u16,
    /// Mechanical-right collection share.
    #[serde(default)]
    pub mr_collection_share: u16,
    /// Synchronization-right collection share.
    #[serde(default)]
    pub sr_collection_share: u16,
    /// Territory sequence number (defaults to 1 at render time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u16>,
}

impl TerritoryShare {
    /// Create an entry for a territory with all shares zero.
    pub fn new(territory: TisCode) -> Self {
        Self {
            territory,
            inclusion: TerritoryInclusion::Include,
            pr_collection_share: 0,
            mr_collection_share: 0,
            sr_collection_share: 0,
            sequence: None,
        }
    }

    /// True if any right carries a nonzero collection share.
    pub fn has_any_share(&self) -> bool {
        self.pr_collection_share > 0 || self.mr_collection_share > 0 || self.sr_collection_share > 0
    }
}

// =============================================================================
// Writer
// =============================================================================

/// A writer (composer/author) of a musical work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WriterDefinition {
    /// Last name (required for controlled writers).
    pub last_name: String,
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Submitter-assigned interested party number (max 9 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_party_number: Option<String>,
    /// Tax id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// IPI name number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipi_name_number: Option<u64>,
    /// Role in the work.
    #[serde(default)]
    pub designation: WriterDesignation,
    /// Whether this writer is controlled by the submitter.
    /// Absent means controlled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled: Option<bool>,
    /// Performing-right ownership share (hundredths, max 5000).
    #[serde(default)]
    pub pr_ownership_share: u16,
    /// Mechanical-right ownership share (hundredths, max 10000).
    #[serde(default)]
    pub mr_ownership_share: u16,
    /// Synchronization-right ownership share (hundredths, max 10000).
    #[serde(default)]
    pub sr_ownership_share: u16,
    /// Affiliated performing-right society code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_society: Option<u16>,
    /// Affiliated mechanical-right society code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_society: Option<u16>,
    /// Affiliated synchronization-right society code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sr_society: Option<u16>,
    /// Territories where collection shares apply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub territories: Vec<TerritoryShare>,
}

impl WriterDefinition {
    /// Create a writer with minimal required fields.
    pub fn new(last_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: None,
            interested_party_number: None,
            tax_id: None,
            ipi_name_number: None,
            designation: WriterDesignation::default(),
            controlled: None,
            pr_ownership_share: 0,
            mr_ownership_share: 0,
            sr_ownership_share: 0,
            pr_society: None,
            mr_society: None,
            sr_society: None,
            territories: Vec::new(),
        }
    }

    /// True unless explicitly marked uncontrolled.
    pub fn is_controlled(&self) -> bool {
        self.controlled.unwrap_or(true)
    }

    /// Add a territory entry.
    pub fn add_territory(&mut self, territory: TerritoryShare) {
        self.territories.push(territory);
    }
}

// =============================================================================
// Publisher
// =============================================================================

/// A publisher of a musical work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublisherDefinition {
    /// Publisher name.
    pub name: String,
    /// Role of this publisher.
    #[serde(default)]
    pub publisher_type: PublisherType,
    /// Submitter-assigned interested party number (max 9 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_party_number: Option<String>,
    /// Tax id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// IPI name number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipi_name_number: Option<u64>,
    /// Publisher sequence number (defaults to 1 at render time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u16>,
    /// Performing-right ownership share (hundredths, max 5000).
    #[serde(default)]
    pub pr_ownership_share: u16,
    /// Mechanical-right ownership share (hundredths, max 10000).
    #[serde(default)]
    pub mr_ownership_share: u16,
    /// Synchronization-right ownership share (hundredths, max 10000).
    #[serde(default)]
    pub sr_ownership_share: u16,
    /// Affiliated performing-right society code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_society: Option<u16>,
    /// Affiliated mechanical-right society code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_society: Option<u16>,
    /// Affiliated synchronization-right society code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sr_society: Option<u16>,
    /// Territories where collection shares apply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub territories: Vec<TerritoryShare>,
}

impl PublisherDefinition {
    /// Create a publisher with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            publisher_type: PublisherType::default(),
            interested_party_number: None,
            tax_id: None,
            ipi_name_number: None,
            sequence: None,
            pr_ownership_share: 0,
            mr_ownership_share: 0,
            sr_ownership_share: 0,
            pr_society: None,
            mr_society: None,
            sr_society: None,
            territories: Vec::new(),
        }
    }

    /// Add a territory entry.
    pub fn add_territory(&mut self, territory: TerritoryShare) {
        self.territories.push(territory);
    }
}

// =============================================================================
// Work
// =============================================================================

/// A complete musical work registration.
///
/// Immutable once passed to export. Expands into one transaction: an NWR
/// header line plus publisher, writer, territory and linking detail lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkDefinition {
    /// Main title of the work.
    pub work_title: String,
    /// Submitter-assigned work number (max 14 characters).
    pub submitter_work_number: String,
    /// Distribution category.
    #[serde(default)]
    pub distribution_category: DistributionCategory,
    /// Original or modified version.
    #[serde(default)]
    pub version_type: VersionType,
    /// Language of the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<LanguageCode>,
    /// ISWC (International Standard Musical Work Code).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iswc: Option<String>,
    /// Copyright registration date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright_date: Option<NaiveDate>,
    /// Copyright registration number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright_number: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    /// Whether a recording of the work exists.
    #[serde(default)]
    pub recorded: bool,
    /// Writers, in submission order.
    #[serde(default)]
    pub writers: Vec<WriterDefinition>,
    /// Publishers, in submission order.
    #[serde(default)]
    pub publishers: Vec<PublisherDefinition>,
}

impl WorkDefinition {
    /// Create a work with minimal required fields.
    pub fn new(work_title: impl Into<String>, submitter_work_number: impl Into<String>) -> Self {
        Self {
            work_title: work_title.into(),
            submitter_work_number: submitter_work_number.into(),
            distribution_category: DistributionCategory::default(),
            version_type: VersionType::default(),
            language_code: None,
            iswc: None,
            copyright_date: None,
            copyright_number: None,
            duration_seconds: None,
            recorded: false,
            writers: Vec::new(),
            publishers: Vec::new(),
        }
    }

    /// Build a work from a plain key-value structure.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Add a writer to the work.
    pub fn add_writer(&mut self, writer: WriterDefinition) {
        self.writers.push(writer);
    }

    /// Add a publisher to the work.
    pub fn add_publisher(&mut self, publisher: PublisherDefinition) {
        self.publishers.push(publisher);
    }
}

// =============================================================================
// Tests
// =============================================================================
