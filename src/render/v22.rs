//! CWR v2.2 record layouts.
//!
//! v2.2 is defined purely by appending field blocks to selected v2.1 record
//! types: the HDR gains version/revision/software identification and the PWR
//! gains a publisher sequence number. Every other layout is inherited
//! unchanged, and inherited byte offsets never move.

use once_cell::sync::Lazy;

use super::v21;
use crate::records::{FieldBlock, Layout};

/// Transaction-type version number carried in the GRH for v2.2 groups.
pub const GROUP_VERSION_NUMBER: &str = "02.20";

/// HDR file header: v2.1 plus CWR version, revision and software
/// identification.
pub static HDR: Lazy<Layout> = Lazy::new(|| {
    v21::HDR.extend(vec![
        FieldBlock::alpha("cwr_version", 3),
        FieldBlock::numeric("revision", 3),
        FieldBlock::alpha("software_package", 30),
        FieldBlock::alpha("software_package_version", 30),
    ])
});

/// PWR publisher for writer: v2.1 plus the publisher sequence number.
pub static PWR: Lazy<Layout> =
    Lazy::new(|| v21::PWR.extend(vec![FieldBlock::numeric("publisher_sequence", 3)]));

// Record types without appended blocks are inherited from v2.1 as-is.
pub use super::v21::{GRH, GRT, NWR, SPT, SPU, SWR, SWT, TRL};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdr_extends_v21_by_66() {
        assert_eq!(HDR.width(), v21::HDR.width() + 66);
    }

    #[test]
    fn test_pwr_extends_v21_by_sequence_field() {
        assert_eq!(PWR.width(), v21::PWR.width() + 3);
    }

    #[test]
    fn test_inherited_slots_still_resolve() {
        // Appending blocks must not disturb inherited field resolution.
        assert!(HDR.text_slot("sender_name").is_ok());
        assert!(HDR.text_slot("cwr_version").is_ok());
        assert!(PWR.text_slot("publisher_name").is_ok());
        assert!(PWR.num_slot("publisher_sequence").is_ok());
        // And the v2.1 layouts do not know the appended fields.
        assert!(v21::HDR.text_slot("cwr_version").is_err());
        assert!(v21::PWR.num_slot("publisher_sequence").is_err());
    }
}
