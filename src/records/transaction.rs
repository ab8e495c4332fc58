//! Transaction header and detail record builders.
//!
//! One work expands to: NWR (transaction header), then per publisher an SPU,
//! per publisher territory an SPT, per writer an SWR, per writer territory
//! an SWT, and one PWR per (publisher, controlled writer) pair.

use crate::encoding::{MR_SR_SHARE_MAX, PR_SHARE_MAX};
use crate::error::ExportError;
use crate::models::{PublisherDefinition, TerritoryShare, WorkDefinition, WriterDefinition};
use crate::records::control::date_as_number;
use crate::records::{Layout, Record};

fn duration_as_number(seconds: u32) -> u64 {
    let hours = u64::from(seconds / 3600);
    let minutes = u64::from((seconds % 3600) / 60);
    let secs = u64::from(seconds % 60);
    hours * 10_000 + minutes * 100 + secs
}

/// Build the NWR transaction header for one work.
pub fn build_nwr(layout: &'static Layout, work: &WorkDefinition) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_text(layout.text_slot("work_title")?, &work.work_title)?;
    rec.set_language(layout.text_slot("language_code")?, work.language_code.as_ref())?;
    rec.set_text(
        layout.text_slot("submitter_work_number")?,
        &work.submitter_work_number,
    )?;
    rec.set_opt_text(layout.text_slot("iswc")?, work.iswc.as_deref())?;
    if let Some(date) = work.copyright_date {
        rec.set_number(layout.num_slot("copyright_date")?, date_as_number(date))?;
    }
    rec.set_opt_text(
        layout.text_slot("copyright_number")?,
        work.copyright_number.as_deref(),
    )?;
    rec.set_code(
        layout.code_slot("distribution_category")?,
        work.distribution_category.to_code(),
    )?;
    if let Some(seconds) = work.duration_seconds {
        rec.set_number(layout.num_slot("duration")?, duration_as_number(seconds))?;
    }
    rec.set_code(
        layout.code_slot("recorded_indicator")?,
        if work.recorded { "Y" } else { "N" },
    )?;
    rec.set_code(layout.code_slot("version_type")?, work.version_type.to_code())?;
    Ok(rec)
}

/// Build an SPU (publisher controlled by submitter) record.
pub fn build_spu(
    layout: &'static Layout,
    publisher: &PublisherDefinition,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_sequence(layout.num_slot("publisher_sequence")?, publisher.sequence)?;
    rec.set_interested_party_number(
        layout.text_slot("interested_party_number")?,
        publisher.interested_party_number.as_deref(),
        false,
    )?;
    rec.set_text(layout.text_slot("name")?, &publisher.name)?;
    rec.set_code(layout.code_slot("publisher_unknown_indicator")?, "N")?;
    rec.set_code(
        layout.code_slot("publisher_type")?,
        publisher.publisher_type.to_code(),
    )?;
    rec.set_opt_text(layout.text_slot("tax_id")?, publisher.tax_id.as_deref())?;
    if let Some(ipi) = publisher.ipi_name_number {
        rec.set_number(layout.num_slot("ipi_name_number")?, ipi)?;
    }
    set_society_and_shares(
        &mut rec,
        layout,
        publisher.pr_society,
        publisher.pr_ownership_share,
        publisher.mr_society,
        publisher.mr_ownership_share,
        publisher.sr_society,
        publisher.sr_ownership_share,
    )?;
    Ok(rec)
}

/// Build an SWR (writer controlled by submitter) record.
///
/// The interested party number is mandatory for controlled writers.
pub fn build_swr(layout: &'static Layout, writer: &WriterDefinition) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_interested_party_number(
        layout.text_slot("interested_party_number")?,
        writer.interested_party_number.as_deref(),
        writer.is_controlled(),
    )?;
    rec.set_text(layout.text_slot("last_name")?, &writer.last_name)?;
    rec.set_opt_text(layout.text_slot("first_name")?, writer.first_name.as_deref())?;
    rec.set_code(layout.code_slot("writer_unknown_indicator")?, "N")?;
    rec.set_code(layout.code_slot("designation")?, writer.designation.to_code())?;
    rec.set_opt_text(layout.text_slot("tax_id")?, writer.tax_id.as_deref())?;
    if let Some(ipi) = writer.ipi_name_number {
        rec.set_number(layout.num_slot("ipi_name_number")?, ipi)?;
    }
    set_society_and_shares(
        &mut rec,
        layout,
        writer.pr_society,
        writer.pr_ownership_share,
        writer.mr_society,
        writer.mr_ownership_share,
        writer.sr_society,
        writer.sr_ownership_share,
    )?;
    Ok(rec)
}

/// Build an SPT or SWT territory-of-control record.
///
/// Both record types share the same block shape; `layout` selects which one
/// is produced. `interested_party_number` mirrors the parent record's.
pub fn build_territory(
    layout: &'static Layout,
    interested_party_number: Option<&str>,
    entry: &TerritoryShare,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_interested_party_number(
        layout.text_slot("interested_party_number")?,
        interested_party_number,
        false,
    )?;
    rec.set_collection_share(
        layout.num_slot("pr_collection_share")?,
        Some(entry.pr_collection_share),
        PR_SHARE_MAX,
    )?;
    rec.set_collection_share(
        layout.num_slot("mr_collection_share")?,
        Some(entry.mr_collection_share),
        MR_SR_SHARE_MAX,
    )?;
    rec.set_collection_share(
        layout.num_slot("sr_collection_share")?,
        Some(entry.sr_collection_share),
        MR_SR_SHARE_MAX,
    )?;
    rec.set_code(
        layout.code_slot("inclusion_indicator")?,
        entry.inclusion.to_code(),
    )?;
    rec.set_territory(layout.num_slot("tis_code")?, entry.territory)?;
    rec.set_sequence(layout.num_slot("territory_sequence")?, entry.sequence)?;
    Ok(rec)
}

/// Build a PWR record linking a controlled writer to a publisher.
pub fn build_pwr(
    layout: &'static Layout,
    publisher: &PublisherDefinition,
    writer: &WriterDefinition,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_interested_party_number(
        layout.text_slot("publisher_ip_number")?,
        publisher.interested_party_number.as_deref(),
        false,
    )?;
    rec.set_text(layout.text_slot("publisher_name")?, &publisher.name)?;
    rec.set_interested_party_number(
        layout.text_slot("writer_ip_number")?,
        writer.interested_party_number.as_deref(),
        false,
    )?;
    Ok(rec)
}

/// Fill the publisher sequence number appended to the PWR in v2.2.
pub fn extend_pwr_v22(
    rec: &mut Record,
    layout: &'static Layout,
    publisher: &PublisherDefinition,
) -> Result<(), ExportError> {
    rec.set_sequence(layout.num_slot("publisher_sequence")?, publisher.sequence)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn set_society_and_shares(
    rec: &mut Record,
    layout: &'static Layout,
    pr_society: Option<u16>,
    pr_share: u16,
    mr_society: Option<u16>,
    mr_share: u16,
    sr_society: Option<u16>,
    sr_share: u16,
) -> Result<(), ExportError> {
    if let Some(society) = pr_society {
        rec.set_number(layout.num_slot("pr_society")?, u64::from(society))?;
    }
    rec.set_ownership_share(layout.num_slot("pr_ownership_share")?, pr_share, PR_SHARE_MAX)?;
    if let Some(society) = mr_society {
        rec.set_number(layout.num_slot("mr_society")?, u64::from(society))?;
    }
    rec.set_ownership_share(
        layout.num_slot("mr_ownership_share")?,
        mr_share,
        MR_SR_SHARE_MAX,
    )?;
    if let Some(society) = sr_society {
        rec.set_number(layout.num_slot("sr_society")?, u64::from(society))?;
    }
    rec.set_ownership_share(
        layout.num_slot("sr_ownership_share")?,
        sr_share,
        MR_SR_SHARE_MAX,
    )?;
    Ok(())
}
