//! Versioned rendering pipeline: work definitions to ordered record lines.
//!
//! A [`FormatRenderer`] turns a work list into header, detail and trailer
//! line sequences for one format generation. Detail lines are produced
//! lazily, one work at a time, so memory stays bounded by a single work's
//! expansion regardless of the work list size.
//!
//! Per work, the expansion order is fixed: the transaction header, then per
//! publisher an SPU followed by its SPT territory lines, per writer an SWR
//! followed by its SWT territory lines, and finally one PWR per
//! (publisher, controlled writer) pair.
//!
//! An invalid work becomes either a skip marker carrying the failure reason
//! or an error aborting the whole export, depending on the configured
//! [`InvalidWorkPolicy`](crate::builder::InvalidWorkPolicy) — the choice is
//! always explicit, never inferred.

pub mod v21;
pub mod v22;

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::builder::{ExportOptions, InvalidWorkPolicy};
use crate::error::{ExportError, ExportResult};
use crate::models::{CwrVersion, WorkDefinition};
use crate::records::{control, transaction, Layout};
use crate::validation::Validator;

// =============================================================================
// Version Tables
// =============================================================================

/// The record layouts and constants one format generation composes.
///
/// A variant composes record types independently; mixing variants within one
/// export is not supported.
pub(crate) struct VersionTables {
    pub hdr: &'static Layout,
    pub grh: &'static Layout,
    pub grt: &'static Layout,
    pub trl: &'static Layout,
    pub nwr: &'static Layout,
    pub spu: &'static Layout,
    pub spt: &'static Layout,
    pub swr: &'static Layout,
    pub swt: &'static Layout,
    pub pwr: &'static Layout,
    pub group_version_number: &'static str,
    /// HDR carries the v2.2 version/revision/software fields.
    pub hdr_identification: bool,
    /// PWR carries the v2.2 publisher sequence number.
    pub pwr_sequence: bool,
}

static V21_TABLES: Lazy<VersionTables> = Lazy::new(|| VersionTables {
    hdr: &v21::HDR,
    grh: &v21::GRH,
    grt: &v21::GRT,
    trl: &v21::TRL,
    nwr: &v21::NWR,
    spu: &v21::SPU,
    spt: &v21::SPT,
    swr: &v21::SWR,
    swt: &v21::SWT,
    pwr: &v21::PWR,
    group_version_number: v21::GROUP_VERSION_NUMBER,
    hdr_identification: false,
    pwr_sequence: false,
});

static V22_TABLES: Lazy<VersionTables> = Lazy::new(|| VersionTables {
    hdr: &v22::HDR,
    grh: &v22::GRH,
    grt: &v22::GRT,
    trl: &v22::TRL,
    nwr: &v22::NWR,
    spu: &v22::SPU,
    spt: &v22::SPT,
    swr: &v22::SWR,
    swt: &v22::SWT,
    pwr: &v22::PWR,
    group_version_number: v22::GROUP_VERSION_NUMBER,
    hdr_identification: true,
    pwr_sequence: true,
});

// =============================================================================
// Renderer
// =============================================================================

/// Accumulated line counts handed to the trailer renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportCounts {
    pub group_id: u32,
    pub group_count: u64,
    pub header_count: u64,
    pub transaction_count: u64,
    pub detail_count: u64,
}

/// A work that validation or field encoding rejected during a skip-policy
/// export.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedWork {
    /// Zero-based position in the submitted work list.
    pub index: usize,
    /// Submitter work number of the rejected work.
    pub submitter_work_number: String,
    /// Human-readable rejection reason.
    pub reason: String,
}

/// One element of the lazy detail sequence: a rendered line, or a marker for
/// a skipped work so downstream counting keeps positional correspondence.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailLine {
    Line(String),
    Skipped(SkippedWork),
}

/// The per-version rendering capability set.
pub trait FormatRenderer {
    /// Format generation, e.g. "2.2".
    fn version_number(&self) -> &'static str;

    /// Format revision within the generation.
    fn revision(&self) -> u16;

    /// Render the ordered header lines (HDR, GRH).
    fn render_header(
        &self,
        options: &ExportOptions,
        stamp: NaiveDateTime,
        group_id: u32,
    ) -> ExportResult<Vec<String>>;

    /// Render the lazy detail sequence, one work at a time.
    fn render_detail_lines<'a>(
        &self,
        works: &'a [WorkDefinition],
        options: &'a ExportOptions,
        validator: &'a Validator,
    ) -> DetailLines<'a>;

    /// Render the ordered trailer lines (GRT, TRL) from accumulated counts.
    fn render_trailer(&self, options: &ExportOptions, counts: ExportCounts)
        -> ExportResult<Vec<String>>;
}

struct Renderer {
    tables: &'static VersionTables,
    version: &'static str,
    revision: u16,
}

static V21_RENDERER: Lazy<Renderer> = Lazy::new(|| Renderer {
    tables: &V21_TABLES,
    version: "2.1",
    revision: 1,
});

static V22_RENDERER: Lazy<Renderer> = Lazy::new(|| Renderer {
    tables: &V22_TABLES,
    version: "2.2",
    revision: 1,
});

/// Select the renderer for a format generation.
pub fn renderer_for(version: CwrVersion) -> &'static dyn FormatRenderer {
    match version {
        CwrVersion::V21 => &*V21_RENDERER,
        CwrVersion::V22 => &*V22_RENDERER,
    }
}

impl FormatRenderer for Renderer {
    fn version_number(&self) -> &'static str {
        self.version
    }

    fn revision(&self) -> u16 {
        self.revision
    }

    fn render_header(
        &self,
        options: &ExportOptions,
        stamp: NaiveDateTime,
        group_id: u32,
    ) -> ExportResult<Vec<String>> {
        let mut hdr = control::build_hdr(self.tables.hdr, options, stamp)?;
        if self.tables.hdr_identification {
            control::extend_hdr_v22(&mut hdr, self.tables.hdr, options)?;
        }
        let grh = control::build_grh(
            self.tables.grh,
            options,
            group_id,
            self.tables.group_version_number,
        )?;
        Ok(vec![hdr.render(0, 0)?, grh.render(0, 0)?])
    }

    fn render_detail_lines<'a>(
        &self,
        works: &'a [WorkDefinition],
        options: &'a ExportOptions,
        validator: &'a Validator,
    ) -> DetailLines<'a> {
        DetailLines {
            tables: self.tables,
            works,
            options,
            validator,
            next_index: 0,
            transaction_seq: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn render_trailer(
        &self,
        _options: &ExportOptions,
        counts: ExportCounts,
    ) -> ExportResult<Vec<String>> {
        // GRT counts every record in the group, GRH and GRT included; TRL
        // counts every record in the file, HDR and TRL included.
        let group_records = counts.detail_count + 2;
        let file_records = counts.detail_count + counts.header_count + 2;
        let grt = control::build_grt(
            self.tables.grt,
            counts.group_id,
            counts.transaction_count,
            group_records,
        )?;
        let trl = control::build_trl(
            self.tables.trl,
            counts.group_count,
            counts.transaction_count,
            file_records,
        )?;
        Ok(vec![grt.render(0, 0)?, trl.render(0, 0)?])
    }
}

// =============================================================================
// Lazy Detail Sequence
// =============================================================================

/// Lazy iterator over detail lines: expands one work at a time.
pub struct DetailLines<'a> {
    tables: &'static VersionTables,
    works: &'a [WorkDefinition],
    options: &'a ExportOptions,
    validator: &'a Validator,
    next_index: usize,
    transaction_seq: u32,
    pending: VecDeque<String>,
    done: bool,
}

impl DetailLines<'_> {
    /// Expand the next work, honoring the invalid-work policy.
    fn expand_next(&mut self) -> Option<ExportResult<DetailLine>> {
        let index = self.next_index;
        let work = self.works.get(index)?;
        self.next_index += 1;

        if let Err(violation) = self.validator.validate(work) {
            return Some(self.reject(index, work, violation.to_string(), violation.into()));
        }

        match expand_work(self.tables, work, self.options, self.transaction_seq) {
            Ok(lines) => {
                self.transaction_seq += 1;
                self.pending = lines.into();
                // A work always expands to at least its transaction header.
                self.pending
                    .pop_front()
                    .map(|line| Ok(DetailLine::Line(line)))
            }
            // Field-level rejections are per-work, like rule violations.
            Err(ExportError::Field(field_err)) => {
                let reason = field_err.to_string();
                Some(self.reject(index, work, reason, field_err.into()))
            }
            // Structural and other errors are fatal regardless of policy.
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn reject(
        &mut self,
        index: usize,
        work: &WorkDefinition,
        reason: String,
        err: ExportError,
    ) -> ExportResult<DetailLine> {
        match self.options.invalid_work_policy {
            InvalidWorkPolicy::Skip => {
                debug!(work = %work.submitter_work_number, %reason, "skipping invalid work");
                Ok(DetailLine::Skipped(SkippedWork {
                    index,
                    submitter_work_number: work.submitter_work_number.clone(),
                    reason,
                }))
            }
            InvalidWorkPolicy::Abort => {
                self.done = true;
                Err(err)
            }
        }
    }
}

impl Iterator for DetailLines<'_> {
    type Item = ExportResult<DetailLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(line) = self.pending.pop_front() {
            return Some(Ok(DetailLine::Line(line)));
        }
        self.expand_next()
    }
}

/// Expand one validated work into its transaction lines.
fn expand_work(
    tables: &'static VersionTables,
    work: &WorkDefinition,
    options: &ExportOptions,
    transaction_seq: u32,
) -> ExportResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut record_seq: u32 = 0;

    let mut nwr = transaction::build_nwr(tables.nwr, work)?;
    // The transaction header carries the group's transaction type code, not
    // the literal NWR layout type.
    nwr.override_record_type(options.transaction_type.to_code());
    lines.push(nwr.render(transaction_seq, record_seq)?);

    for publisher in &work.publishers {
        record_seq += 1;
        lines.push(
            transaction::build_spu(tables.spu, publisher)?.render(transaction_seq, record_seq)?,
        );
        for entry in &publisher.territories {
            record_seq += 1;
            lines.push(
                transaction::build_territory(
                    tables.spt,
                    publisher.interested_party_number.as_deref(),
                    entry,
                )?
                .render(transaction_seq, record_seq)?,
            );
        }
    }

    for writer in &work.writers {
        record_seq += 1;
        lines.push(transaction::build_swr(tables.swr, writer)?.render(transaction_seq, record_seq)?);
        for entry in &writer.territories {
            record_seq += 1;
            lines.push(
                transaction::build_territory(
                    tables.swt,
                    writer.interested_party_number.as_deref(),
                    entry,
                )?
                .render(transaction_seq, record_seq)?,
            );
        }
    }

    for publisher in &work.publishers {
        for writer in work.writers.iter().filter(|w| w.is_controlled()) {
            record_seq += 1;
            let mut pwr = transaction::build_pwr(tables.pwr, publisher, writer)?;
            if tables.pwr_sequence {
                transaction::extend_pwr_v22(&mut pwr, tables.pwr, publisher)?;
            }
            lines.push(pwr.render(transaction_seq, record_seq)?);
        }
    }

    Ok(lines)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExportOptions;
    use crate::models::{
        PublisherDefinition, TerritoryShare, TisCode, TransactionType, WriterDefinition,
    };

    fn sample_work() -> WorkDefinition {
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

    fn detail_lines(
        works: &[WorkDefinition],
        options: &ExportOptions,
    ) -> Vec<ExportResult<DetailLine>> {
        let validator = Validator::default();
        renderer_for(options.version)
            .render_detail_lines(works, options, &validator)
            .collect()
    }

    #[test]
    fn test_expansion_order_and_sequences() {
        let options = ExportOptions::default();
        let works = [sample_work()];
        let lines: Vec<String> = detail_lines(&works, &options)
            .into_iter()
            .map(|item| match item.unwrap() {
                DetailLine::Line(l) => l,
                DetailLine::Skipped(s) => panic!("unexpected skip: {s:?}"),
            })
            .collect();

        let types: Vec<&str> = lines.iter().map(|l| &l[0..3]).collect();
        assert_eq!(types, vec!["NWR", "SPU", "SPT", "SWR", "SWT", "PWR"]);

        // Transaction sequence 0 throughout; record sequence increments.
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(&line[3..11], "00000000");
            assert_eq!(line[11..19].parse::<u32>().unwrap(), i as u32);
        }
    }

    #[test]
    fn test_transaction_header_uses_configured_type() {
        let mut options = ExportOptions::default();
        options.transaction_type = TransactionType::Revision;
        let works = [sample_work()];
        let first = match detail_lines(&works, &options).remove(0).unwrap() {
            DetailLine::Line(l) => l,
            other => panic!("unexpected: {other:?}"),
        };
        assert_eq!(&first[0..3], "REV");
    }

    #[test]
    fn test_invalid_work_skip_policy_yields_marker() {
        let mut options = ExportOptions::default();
        options.invalid_work_policy = InvalidWorkPolicy::Skip;
        let works = [WorkDefinition::new("", "BAD001"), sample_work()];
        let items = detail_lines(&works, &options);

        // One marker for the invalid work, then the valid work's six lines.
        assert_eq!(items.len(), 7);
        match items[0].as_ref().unwrap() {
            DetailLine::Skipped(skip) => {
                assert_eq!(skip.index, 0);
                assert_eq!(skip.submitter_work_number, "BAD001");
                assert!(skip.reason.contains("title"));
            }
            other => panic!("expected skip marker, got {other:?}"),
        }

        // The surviving work still gets transaction sequence 0.
        match items[1].as_ref().unwrap() {
            DetailLine::Line(line) => assert_eq!(&line[3..11], "00000000"),
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_work_abort_policy_stops() {
        let options = ExportOptions::default(); // Abort is the default
        let works = [WorkDefinition::new("", "BAD001"), sample_work()];
        let items = detail_lines(&works, &options);

        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn test_header_lines_v22_carry_identification() {
        let mut options = ExportOptions::default();
        options.software_package = "CWRGEN".into();
        options.software_package_version = "0.1.0".into();
        let stamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let header = renderer_for(CwrVersion::V22)
            .render_header(&options, stamp, 1)
            .unwrap();
        assert_eq!(header.len(), 2);
        assert_eq!(header[0].len(), v22::HDR.width());
        assert!(header[0].contains("2.2"));
        assert!(header[0].contains("CWRGEN"));
        assert_eq!(header[1].len(), v22::GRH.width());
        assert!(header[1].contains("02.20"));

        // v2.1 header inherits its prefix bytes from the same field blocks.
        let v21_header = renderer_for(CwrVersion::V21)
            .render_header(&options, stamp, 1)
            .unwrap();
        assert_eq!(v21_header[0].len(), v21::HDR.width());
        assert_eq!(&header[0][..v21::HDR.width()], v21_header[0].as_str());
        assert!(v21_header[1].contains("02.10"));
    }

    #[test]
    fn test_trailer_count_composition() {
        let counts = ExportCounts {
            group_id: 1,
            group_count: 1,
            header_count: 2,
            transaction_count: 1,
            detail_count: 6,
        };
        let trailer = renderer_for(CwrVersion::V22)
            .render_trailer(&ExportOptions::default(), counts)
            .unwrap();
        // GRT: detail + GRH + GRT = 8; TRL: detail + HDR + GRH + GRT + TRL = 10.
        assert_eq!(trailer[0], "GRT000010000000100000008");
        assert_eq!(trailer[1], "TRL000010000000100000010");
    }

    #[test]
    fn test_lazy_expansion_bounded_by_one_work() {
        // The iterator must not expand work N+1 before work N is drained.
        let options = ExportOptions::default();
        let works = [sample_work(), sample_work()];
        let validator = Validator::default();
        let mut iter =
            renderer_for(options.version).render_detail_lines(&works, &options, &validator);

        let first = iter.next().unwrap().unwrap();
        assert!(matches!(first, DetailLine::Line(ref l) if l.starts_with("NWR")));
        // Only the current work's remaining lines are buffered.
        assert_eq!(iter.pending.len(), 5);
        assert_eq!(iter.next_index, 1);
    }
}
