//! CWR v2.1 record layouts.
//!
//! Each layout is assembled once at startup. Field widths are part of the
//! format contract; the tests in this module pin every record type's total
//! width.

use once_cell::sync::Lazy;

use crate::records::{FieldBlock, Layout};

/// Transaction-type version number carried in the GRH for v2.1 groups.
pub const GROUP_VERSION_NUMBER: &str = "02.10";

pub(crate) const TRANSACTION_TYPES: &[&str] = &["NWR", "REV", "DEL", "REC"];
pub(crate) const SENDER_TYPES: &[&str] = &["PB", "AA", "WR", "SO"];
pub(crate) const DISTRIBUTION_CATEGORIES: &[&str] = &["JAZ", "POP", "SER", "UNC"];
pub(crate) const VERSION_TYPES: &[&str] = &["ORI", "MOD"];
pub(crate) const WRITER_DESIGNATIONS: &[&str] = &["CA", "A", "C", "AR", "AD", "TR", "SA", "SR"];
pub(crate) const PUBLISHER_TYPES: &[&str] = &["E", "AM", "SE", "PA"];
pub(crate) const FLAGS: &[&str] = &["Y", "N", "U"];
pub(crate) const INCLUSION: &[&str] = &["I", "E"];

/// HDR file header.
pub static HDR: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "HDR",
        false,
        vec![
            FieldBlock::code("sender_type", 2, SENDER_TYPES),
            FieldBlock::alpha("sender_id", 11),
            FieldBlock::alpha("sender_name", 45),
            FieldBlock::alpha("edi_version", 5),
            FieldBlock::numeric("creation_date", 8),
            FieldBlock::numeric("creation_time", 6),
            FieldBlock::numeric("transmission_date", 8),
            FieldBlock::alpha("character_set", 15),
        ],
    )
});

/// GRH group header.
pub static GRH: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "GRH",
        false,
        vec![
            FieldBlock::code("transaction_type", 3, TRANSACTION_TYPES),
            FieldBlock::numeric("group_id", 5),
            FieldBlock::alpha("version_number", 5),
            FieldBlock::numeric("batch_request", 10),
            FieldBlock::alpha("submission_distribution_type", 2),
        ],
    )
});

/// GRT group trailer (24 characters).
pub static GRT: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "GRT",
        false,
        vec![
            FieldBlock::numeric("group_id", 5),
            FieldBlock::numeric("transaction_count", 8),
            FieldBlock::numeric("record_count", 8),
        ],
    )
});

/// TRL file trailer (24 characters).
pub static TRL: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "TRL",
        false,
        vec![
            FieldBlock::numeric("group_count", 5),
            FieldBlock::numeric("transaction_count", 8),
            FieldBlock::numeric("record_count", 8),
        ],
    )
});

/// NWR transaction header.
pub static NWR: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "NWR",
        true,
        vec![
            FieldBlock::alpha("work_title", 60),
            FieldBlock::alpha("language_code", 2),
            FieldBlock::alpha("submitter_work_number", 14),
            FieldBlock::alpha("iswc", 11),
            FieldBlock::numeric("copyright_date", 8),
            FieldBlock::alpha("copyright_number", 12),
            FieldBlock::code("distribution_category", 3, DISTRIBUTION_CATEGORIES),
            FieldBlock::numeric("duration", 6),
            FieldBlock::code("recorded_indicator", 1, FLAGS),
            FieldBlock::code("version_type", 3, VERSION_TYPES),
        ],
    )
});

/// SPU publisher controlled by submitter.
pub static SPU: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "SPU",
        true,
        vec![
            FieldBlock::numeric("publisher_sequence", 3),
            FieldBlock::alpha("interested_party_number", 9),
            FieldBlock::alpha("name", 45),
            FieldBlock::code("publisher_unknown_indicator", 1, FLAGS),
            FieldBlock::code("publisher_type", 2, PUBLISHER_TYPES),
            FieldBlock::alpha("tax_id", 9),
            FieldBlock::numeric("ipi_name_number", 11),
            FieldBlock::numeric("pr_society", 3),
            FieldBlock::numeric("pr_ownership_share", 5),
            FieldBlock::numeric("mr_society", 3),
            FieldBlock::numeric("mr_ownership_share", 5),
            FieldBlock::numeric("sr_society", 3),
            FieldBlock::numeric("sr_ownership_share", 5),
        ],
    )
});

fn territory_blocks() -> Vec<FieldBlock> {
    vec![
        FieldBlock::alpha("interested_party_number", 9),
        FieldBlock::numeric("pr_collection_share", 5),
        FieldBlock::numeric("mr_collection_share", 5),
        FieldBlock::numeric("sr_collection_share", 5),
        FieldBlock::code("inclusion_indicator", 1, INCLUSION),
        FieldBlock::numeric("tis_code", 4),
        FieldBlock::numeric("territory_sequence", 3),
    ]
}

/// SPT publisher territory of control.
pub static SPT: Lazy<Layout> = Lazy::new(|| Layout::new("SPT", true, territory_blocks()));

/// SWT writer territory of control. Same block shape as SPT, distinct type.
pub static SWT: Lazy<Layout> = Lazy::new(|| Layout::new("SWT", true, territory_blocks()));

/// SWR writer controlled by submitter.
pub static SWR: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "SWR",
        true,
        vec![
            FieldBlock::alpha("interested_party_number", 9),
            FieldBlock::alpha("last_name", 45),
            FieldBlock::alpha("first_name", 30),
            FieldBlock::code("writer_unknown_indicator", 1, FLAGS),
            FieldBlock::code("designation", 2, WRITER_DESIGNATIONS),
            FieldBlock::alpha("tax_id", 9),
            FieldBlock::numeric("ipi_name_number", 11),
            FieldBlock::numeric("pr_society", 3),
            FieldBlock::numeric("pr_ownership_share", 5),
            FieldBlock::numeric("mr_society", 3),
            FieldBlock::numeric("mr_ownership_share", 5),
            FieldBlock::numeric("sr_society", 3),
            FieldBlock::numeric("sr_ownership_share", 5),
        ],
    )
});

/// PWR publisher for writer.
pub static PWR: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "PWR",
        true,
        vec![
            FieldBlock::alpha("publisher_ip_number", 9),
            FieldBlock::alpha("publisher_name", 45),
            FieldBlock::alpha("writer_ip_number", 9),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    /// Record widths are part of the format contract.
    #[test]
    fn test_declared_widths() {
        assert_eq!(HDR.width(), 103);
        assert_eq!(GRH.width(), 28);
        assert_eq!(GRT.width(), 24);
        assert_eq!(TRL.width(), 24);
        assert_eq!(NWR.width(), 139);
        assert_eq!(SPU.width(), 123);
        assert_eq!(SPT.width(), 51);
        assert_eq!(SWR.width(), 150);
        assert_eq!(SWT.width(), 51);
        assert_eq!(PWR.width(), 82);
    }

    #[test]
    fn test_record_types() {
        assert_eq!(NWR.record_type(), "NWR");
        assert_eq!(SPT.record_type(), "SPT");
        assert_eq!(SWT.record_type(), "SWT");
    }
}
