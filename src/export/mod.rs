//! Streaming exporter: writes rendered lines to a sink and reconciles
//! counts into the trailer records.
//!
//! The exporter makes a single forward pass: header lines, then the lazy
//! detail sequence, then the trailers built from the accumulated counts. It
//! never buffers the whole output, never closes the caller's sink, and owns
//! group-id uniqueness for the duration of one export call. Two concurrent
//! exports must not share an exporter instance.
//!
//! Every line is terminated by a carriage-return/line-feed pair.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::builder::ExportOptions;
use crate::error::{ConfigError, ExportResult, FieldError, FieldResult};
use crate::models::WorkDefinition;
use crate::render::{renderer_for, DetailLine, ExportCounts, SkippedWork};
use crate::validation::Validator;

/// CWR line terminator.
const CRLF: &str = "\r\n";

/// Header lines per export: file header plus group header.
const HEADER_COUNT: u64 = 2;

/// Groups per export. Multi-group files are not produced; one export is one
/// group.
const GROUP_COUNT: u64 = 1;

// =============================================================================
// Group Id Registry
// =============================================================================

/// Tracks group ids claimed during one export call.
///
/// Uniqueness is scoped to the exporter instance, not the process.
#[derive(Debug, Default)]
pub struct GroupIdRegistry {
    seen: HashSet<u32>,
}

impl GroupIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a group id: must be in 1..=99999 and unused in this export.
    pub fn claim(&mut self, id: u32) -> FieldResult<()> {
        if !(1..=99_999).contains(&id) {
            return Err(FieldError::GroupIdOutOfRange(id));
        }
        if !self.seen.insert(id) {
            return Err(FieldError::DuplicateGroupId(id));
        }
        Ok(())
    }
}

// =============================================================================
// Export Summary
// =============================================================================

/// Statistics of one completed export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Transaction-header lines written (lines whose leading three
    /// characters equal the configured transaction type).
    pub transaction_count: u64,
    /// Detail lines written, transaction headers included.
    pub detail_count: u64,
    /// Every record in the file, control records included.
    pub record_count: u64,
    /// Works rejected under the skip policy, with reasons.
    pub skipped: Vec<SkippedWork>,
}

// =============================================================================
// Exporter
// =============================================================================

/// Streams one work list to a sink as a complete CWR file.
pub struct Exporter<'a> {
    options: &'a ExportOptions,
    validator: &'a Validator,
    groups: GroupIdRegistry,
}

impl<'a> Exporter<'a> {
    pub fn new(options: &'a ExportOptions, validator: &'a Validator) -> Self {
        Self {
            options,
            validator,
            groups: GroupIdRegistry::new(),
        }
    }

    /// Write the complete file to `sink` in one forward pass.
    pub fn export<W: Write>(
        &mut self,
        works: &[WorkDefinition],
        sink: &mut W,
    ) -> ExportResult<ExportSummary> {
        if works.is_empty() {
            return Err(ConfigError::NoWorks.into());
        }

        let stamp = self.resolve_stamp();
        let renderer = renderer_for(self.options.version);
        let transaction_code = self.options.transaction_type.to_code();

        info!(
            version = renderer.version_number(),
            works = works.len(),
            "starting CWR export"
        );

        self.groups.claim(self.options.group_id)?;

        let header = renderer.render_header(self.options, stamp, self.options.group_id)?;
        debug_assert_eq!(header.len() as u64, HEADER_COUNT);
        for line in &header {
            write_line(sink, line)?;
        }

        let mut counts = ExportCounts {
            group_id: self.options.group_id,
            group_count: GROUP_COUNT,
            header_count: HEADER_COUNT,
            transaction_count: 0,
            detail_count: 0,
        };
        let mut skipped = Vec::new();

        for item in renderer.render_detail_lines(works, self.options, self.validator) {
            match item? {
                DetailLine::Line(line) => {
                    if line.as_bytes().get(..3) == Some(transaction_code.as_bytes()) {
                        counts.transaction_count += 1;
                    }
                    counts.detail_count += 1;
                    write_line(sink, &line)?;
                }
                DetailLine::Skipped(skip) => skipped.push(skip),
            }
        }

        for line in renderer.render_trailer(self.options, counts)? {
            write_line(sink, &line)?;
        }

        let summary = ExportSummary {
            transaction_count: counts.transaction_count,
            detail_count: counts.detail_count,
            record_count: counts.detail_count + HEADER_COUNT + 2,
            skipped,
        };
        info!(
            transactions = summary.transaction_count,
            details = summary.detail_count,
            skipped = summary.skipped.len(),
            "export finished"
        );
        Ok(summary)
    }

    fn resolve_stamp(&self) -> NaiveDateTime {
        self.options
            .creation_timestamp
            .unwrap_or_else(|| Local::now().naive_local())
    }
}

fn write_line<W: Write>(sink: &mut W, line: &str) -> std::io::Result<()> {
    debug!(record = &line[..3], width = line.len(), "writing record");
    sink.write_all(line.as_bytes())?;
    sink.write_all(CRLF.as_bytes())
}

// =============================================================================
// Convenience Entry Points
// =============================================================================

/// Export to any writer using the default rule chain.
pub fn export_to_writer<W: Write>(
    works: &[WorkDefinition],
    options: &ExportOptions,
    sink: &mut W,
) -> ExportResult<ExportSummary> {
    let validator = Validator::default();
    Exporter::new(options, &validator).export(works, sink)
}

/// Export into an in-memory string.
pub fn export_to_string(
    works: &[WorkDefinition],
    options: &ExportOptions,
) -> ExportResult<(String, ExportSummary)> {
    let mut buffer = Vec::new();
    let summary = export_to_writer(works, options, &mut buffer)?;
    // Rendered lines are built from validated fields and are always UTF-8.
    let text = String::from_utf8(buffer).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    Ok((text, summary))
}

/// Export to a file path. The file is created or truncated; atomicity
/// (write-to-temp-then-rename) is the caller's responsibility.
pub fn export_to_file(
    works: &[WorkDefinition],
    options: &ExportOptions,
    path: &Path,
) -> ExportResult<ExportSummary> {
    let mut file = std::fs::File::create(path)?;
    export_to_writer(works, options, &mut file)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::InvalidWorkPolicy;
    use crate::models::{
        CwrVersion, PublisherDefinition, TerritoryShare, TisCode, WriterDefinition,
    };

    fn pinned_options() -> ExportOptions {
        let mut options = ExportOptions::default();
        options.sender_id = "123456789".into();
        options.sender_name = "ACME MUSIC".into();
        options.creation_timestamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(10, 30, 0));
        options
    }

    fn minimal_work() -> WorkDefinition {
        let mut work = WorkDefinition::new("MY SONG", "WK000001");
        let mut writer = WriterDefinition::new("DOE");
        writer.interested_party_number = Some("W0001".into());
        writer.pr_ownership_share = 5000;
        let mut entry = TerritoryShare::new(TisCode::WORLD);
        entry.pr_collection_share = 2500;
        writer.add_territory(entry.clone());
        let mut publisher = PublisherDefinition::new("ACME MUSIC");
        publisher.interested_party_number = Some("P0001".into());
        publisher.pr_ownership_share = 5000;
        publisher.add_territory(entry);
        work.add_writer(writer);
        work.add_publisher(publisher);
        work
    }

    #[test]
    fn test_group_id_registry_fixtures() {
        let mut registry = GroupIdRegistry::new();
        assert!(registry.claim(0).is_err());
        assert!(registry.claim(100_000).is_err());
        assert!(registry.claim(1).is_ok());
        // Reuse within the same export is rejected.
        assert!(matches!(
            registry.claim(1),
            Err(FieldError::DuplicateGroupId(1))
        ));
        assert!(registry.claim(2).is_ok());
    }

    #[test]
    fn test_end_to_end_minimal_work_v22() {
        let works = [minimal_work()];
        let (text, summary) = export_to_string(&works, &pinned_options()).unwrap();

        // Every line CRLF-terminated.
        assert!(text.ends_with(CRLF));
        let lines: Vec<&str> = text.split(CRLF).filter(|l| !l.is_empty()).collect();

        // 2 headers + 6 detail lines + 2 trailers.
        assert_eq!(lines.len(), 10);
        assert_eq!(summary.detail_count, 6);
        assert_eq!(summary.transaction_count, 1);
        assert_eq!(summary.record_count, 10);

        let types: Vec<&str> = lines.iter().map(|l| &l[0..3]).collect();
        assert_eq!(
            types,
            vec!["HDR", "GRH", "NWR", "SPU", "SPT", "SWR", "SWT", "PWR", "GRT", "TRL"]
        );

        // Trailer counts: GRT = 6 details + GRH + GRT; TRL adds HDR and TRL.
        assert_eq!(lines[8], "GRT000010000000100000008");
        assert_eq!(lines[9], "TRL000010000000100000010");
    }

    #[test]
    fn test_export_idempotent_with_pinned_stamp() {
        let works = [minimal_work()];
        let options = pinned_options();
        let (first, _) = export_to_string(&works, &options).unwrap();
        let (second, _) = export_to_string(&works, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_v21_and_v22_headers_differ_only_by_appended_fields() {
        let works = [minimal_work()];
        let mut options = pinned_options();
        let (v22_text, _) = export_to_string(&works, &options).unwrap();
        options.version = CwrVersion::V21;
        let (v21_text, _) = export_to_string(&works, &options).unwrap();

        let v22_hdr = v22_text.split(CRLF).next().unwrap();
        let v21_hdr = v21_text.split(CRLF).next().unwrap();
        assert_eq!(&v22_hdr[..v21_hdr.len()], v21_hdr);
        assert_eq!(v22_hdr.len(), v21_hdr.len() + 66);
    }

    #[test]
    fn test_skip_policy_produces_partial_file() {
        let mut options = pinned_options();
        options.invalid_work_policy = InvalidWorkPolicy::Skip;
        let works = [WorkDefinition::new("", "BAD001"), minimal_work()];
        let (text, summary) = export_to_string(&works, &options).unwrap();

        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].submitter_work_number, "BAD001");
        assert_eq!(summary.transaction_count, 1);

        // The skipped work contributes no lines.
        let lines: Vec<&str> = text.split(CRLF).filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn test_abort_policy_fails_on_invalid_work() {
        let options = pinned_options(); // Abort is the default
        let works = [WorkDefinition::new("", "BAD001"), minimal_work()];
        assert!(export_to_string(&works, &options).is_err());
    }

    #[test]
    fn test_no_works_rejected() {
        let err = export_to_string(&[], &pinned_options()).unwrap_err();
        assert!(err.to_string().contains("No works"));
    }

    #[test]
    fn test_transaction_count_follows_configured_type() {
        let mut options = pinned_options();
        options.transaction_type = crate::models::TransactionType::Revision;
        let works = [minimal_work(), minimal_work()];
        let (text, summary) = export_to_string(&works, &options).unwrap();

        assert_eq!(summary.transaction_count, 2);
        let rev_lines = text
            .split(CRLF)
            .filter(|l| l.starts_with("REV"))
            .count();
        assert_eq!(rev_lines, 2);
    }

    #[test]
    fn test_every_line_has_its_declared_width() {
        use crate::render::v22;

        let works = [minimal_work()];
        let (text, _) = export_to_string(&works, &pinned_options()).unwrap();
        for line in text.split(CRLF).filter(|l| !l.is_empty()) {
            let expected = match &line[0..3] {
                "HDR" => v22::HDR.width(),
                "GRH" => v22::GRH.width(),
                "GRT" => v22::GRT.width(),
                "TRL" => v22::TRL.width(),
                "NWR" => v22::NWR.width(),
                "SPU" => v22::SPU.width(),
                "SPT" => v22::SPT.width(),
                "SWR" => v22::SWR.width(),
                "SWT" => v22::SWT.width(),
                "PWR" => v22::PWR.width(),
                other => panic!("unexpected record type {other}"),
            };
            assert_eq!(line.len(), expected, "width mismatch for {line}");
        }
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.cwr");
        let works = [minimal_work()];
        let summary = export_to_file(&works, &pinned_options(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(summary.record_count, 10);
        assert_eq!(content.matches(CRLF).count(), 10);
        assert!(content.starts_with("HDR"));
    }
}
