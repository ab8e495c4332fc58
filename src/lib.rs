//! # cwrgen - CWR file generation for musical work registrations
//!
//! cwrgen renders musical work definitions (titles, writers, publishers,
//! shares, territories) into fixed-width CWR (Common Works Registration)
//! files for submission to collecting societies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Work defs   │────▶│  Validator  │────▶│   Render    │────▶│  Exporter   │
//! │ (typed/JSON)│     │ (rule chain)│     │ (v2.1/v2.2) │     │ (CRLF sink) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cwrgen::{CwrExportBuilder, WorkDefinition};
//!
//! let (file, summary) = CwrExportBuilder::new()
//!     .sender("PB", "123456789", "ACME MUSIC")
//!     .add_work(my_work)
//!     .export_to_string()?;
//! println!("wrote {} transactions", summary.transaction_count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (WorkDefinition, WriterDefinition, ...)
//! - [`encoding`] - Fixed-width field primitives
//! - [`records`] - Record layouts, field stores and capability setters
//! - [`render`] - Format versions and the lazy rendering pipeline
//! - [`validation`] - Business-rule chain
//! - [`export`] - Streaming exporter and count reconciliation
//! - [`builder`] - Validated options and the fluent facade

// Core modules
pub mod error;
pub mod models;

// Field encoding
pub mod encoding;

// Records
pub mod records;

// Rendering
pub mod render;

// Validation
pub mod validation;

// Export
pub mod export;

// Builder facade
pub mod builder;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ExportError,
    FieldError,
    RuleViolation,
    StructuralError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CharacterSet,
    CwrVersion,
    DistributionCategory,
    LanguageCode,
    PublisherDefinition,
    PublisherType,
    SenderType,
    TerritoryInclusion,
    TerritoryShare,
    TisCode,
    TransactionType,
    VersionType,
    WorkDefinition,
    WriterDefinition,
    WriterDesignation,
};

// =============================================================================
// Re-exports - Encoding
// =============================================================================

pub use encoding::{normalize_share, pad_alphanumeric, pad_numeric, SHARE_TOLERANCE};

// =============================================================================
// Re-exports - Rendering
// =============================================================================

pub use render::{renderer_for, DetailLine, FormatRenderer, SkippedWork};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{has_any_collection_share, rules, Rule, Validator};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{
    export_to_file, export_to_string, export_to_writer, Exporter, ExportSummary, GroupIdRegistry,
};

// =============================================================================
// Re-exports - Builder
// =============================================================================

pub use builder::{
    parse_sender, validate_sender_id, CwrExportBuilder, ExportOptions, InvalidWorkPolicy,
};
