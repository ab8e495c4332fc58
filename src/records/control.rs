//! Control record builders: file header, group header, group and file
//! trailers.
//!
//! Control records carry bookkeeping (sender identity, counts) rather than
//! work data. The trailer forms are 24 characters wide: 3-character code
//! plus fixed-width numeric count fields.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::builder::ExportOptions;
use crate::error::ExportError;
use crate::records::{Layout, Record};

/// EDI standard version carried in the file header.
pub const EDI_VERSION: &str = "01.10";

pub(crate) fn date_as_number(date: NaiveDate) -> u64 {
    (date.year().max(0) as u64) * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day())
}

fn time_as_number(time: chrono::NaiveTime) -> u64 {
    u64::from(time.hour()) * 10_000 + u64::from(time.minute()) * 100 + u64::from(time.second())
}

/// Build the HDR file header common to both format versions.
///
/// `stamp` is the resolved creation timestamp; the transmission date is its
/// date component.
pub fn build_hdr(
    layout: &'static Layout,
    options: &ExportOptions,
    stamp: NaiveDateTime,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_code(layout.code_slot("sender_type")?, options.sender_type.to_code())?;
    rec.set_text(layout.text_slot("sender_id")?, &options.sender_id)?;
    rec.set_text(layout.text_slot("sender_name")?, &options.sender_name)?;
    rec.set_text(layout.text_slot("edi_version")?, EDI_VERSION)?;
    rec.set_number(layout.num_slot("creation_date")?, date_as_number(stamp.date()))?;
    rec.set_number(layout.num_slot("creation_time")?, time_as_number(stamp.time()))?;
    rec.set_number(
        layout.num_slot("transmission_date")?,
        date_as_number(stamp.date()),
    )?;
    rec.set_text(
        layout.text_slot("character_set")?,
        options.character_set.to_code(),
    )?;
    Ok(rec)
}

/// Fill the v2.2 fields appended to the HDR: CWR version, revision and
/// software identification.
pub fn extend_hdr_v22(
    rec: &mut Record,
    layout: &'static Layout,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    rec.set_text(layout.text_slot("cwr_version")?, options.version.to_code())?;
    rec.set_number(layout.num_slot("revision")?, u64::from(options.revision))?;
    rec.set_text(
        layout.text_slot("software_package")?,
        &options.software_package,
    )?;
    rec.set_text(
        layout.text_slot("software_package_version")?,
        &options.software_package_version,
    )?;
    Ok(())
}

/// Build the GRH group header.
///
/// `version_number` is the transaction-type version carried by the group
/// ("02.10" for v2.1, "02.20" for v2.2). The submission/distribution type
/// field stays blank.
pub fn build_grh(
    layout: &'static Layout,
    options: &ExportOptions,
    group_id: u32,
    version_number: &str,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_code(
        layout.code_slot("transaction_type")?,
        options.transaction_type.to_code(),
    )?;
    rec.set_group_id(layout.num_slot("group_id")?, group_id)?;
    rec.set_text(layout.text_slot("version_number")?, version_number)?;
    rec.set_number(layout.num_slot("batch_request")?, 0)?;
    Ok(rec)
}

/// Build the 24-character GRT group trailer.
pub fn build_grt(
    layout: &'static Layout,
    group_id: u32,
    transaction_count: u64,
    record_count: u64,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_group_id(layout.num_slot("group_id")?, group_id)?;
    rec.set_number(layout.num_slot("transaction_count")?, transaction_count)?;
    rec.set_number(layout.num_slot("record_count")?, record_count)?;
    Ok(rec)
}

/// Build the 24-character TRL file trailer.
pub fn build_trl(
    layout: &'static Layout,
    group_count: u64,
    transaction_count: u64,
    record_count: u64,
) -> Result<Record, ExportError> {
    let mut rec = Record::new(layout);
    rec.set_number(layout.num_slot("group_count")?, group_count)?;
    rec.set_number(layout.num_slot("transaction_count")?, transaction_count)?;
    rec.set_number(layout.num_slot("record_count")?, record_count)?;
    Ok(rec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExportOptions;
    use crate::models::{CharacterSet, SenderType};
    use crate::render::v21;

    fn test_options() -> ExportOptions {
        let mut options = ExportOptions::default();
        options.sender_type = SenderType::Publisher;
        options.sender_id = "123456789".into();
        options.sender_name = "ACME MUSIC".into();
        options.character_set = CharacterSet::Ascii;
        options
    }

    #[test]
    fn test_grt_renders_exact_counts() {
        // groupId=1, transactionCount=2, recordCount=3 renders to exactly
        // "GRT" + "00001" + "00000002" + "00000003", 24 characters.
        let rec = build_grt(&v21::GRT, 1, 2, 3).unwrap();
        let line = rec.render(0, 0).unwrap();
        assert_eq!(line, "GRT000010000000200000003");
        assert_eq!(line.len(), 24);
    }

    #[test]
    fn test_trl_width_and_counts() {
        let rec = build_trl(&v21::TRL, 1, 12, 48).unwrap();
        let line = rec.render(0, 0).unwrap();
        assert_eq!(line.len(), 24);
        assert_eq!(line, "TRL000010000001200000048");
    }

    #[test]
    fn test_hdr_fields_in_position() {
        let stamp = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let rec = build_hdr(&v21::HDR, &test_options(), stamp).unwrap();
        let line = rec.render(0, 0).unwrap();

        assert_eq!(line.len(), v21::HDR.width());
        assert_eq!(&line[0..3], "HDR");
        assert_eq!(&line[3..5], "PB");
        assert_eq!(&line[5..16], "123456789  ");
        assert!(line[16..61].starts_with("ACME MUSIC"));
        assert_eq!(&line[61..66], "01.10");
        assert_eq!(&line[66..74], "20240315");
        assert_eq!(&line[74..80], "103000");
        assert_eq!(&line[80..88], "20240315");
        assert!(line[88..103].starts_with("ASCII"));
    }

    #[test]
    fn test_grh_renders_group_metadata() {
        let rec = build_grh(&v21::GRH, &test_options(), 1, "02.10").unwrap();
        let line = rec.render(0, 0).unwrap();

        assert_eq!(line.len(), v21::GRH.width());
        assert_eq!(&line[0..3], "GRH");
        assert_eq!(&line[3..6], "NWR");
        assert_eq!(&line[6..11], "00001");
        assert_eq!(&line[11..16], "02.10");
        assert_eq!(&line[16..26], "0000000000");
        assert_eq!(&line[26..28], "  ");
    }
}
