//! Record abstraction: layouts, positional field stores, capability setters.
//!
//! A [`Layout`] is the declarative shape of one record type: an ordered list
//! of [`FieldBlock`]s, each with a name, width and encoding kind. A
//! [`Record`] is a transient positional store over a layout; it is filled
//! through named, validated setters and rendered to a single fixed-width
//! line. Records are created by the rendering pipeline and discarded after
//! rendering.
//!
//! Field locations are resolved to typed slots ([`TextSlot`], [`NumSlot`],
//! [`CodeSlot`]) when a record builder starts, not looked up by name at call
//! time. A layout that does not declare a slot a builder needs fails with a
//! [`StructuralError`] immediately.
//!
//! Transaction and detail records carry a 19-character prefix: record type
//! (3) + transaction sequence (8) + record sequence (8), filled at render
//! time. Control records carry only the 3-character type.

pub mod control;
pub mod transaction;

use crate::encoding::{pad_alphanumeric, pad_numeric};
use crate::error::{FieldError, FieldResult, StructuralError};
use crate::models::{LanguageCode, TisCode};

// =============================================================================
// Field Blocks
// =============================================================================

/// Encoding kind of one field block.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Left-justified, space-padded text.
    Alpha(usize),
    /// Right-justified, zero-padded non-negative integer.
    Numeric(usize),
    /// Text restricted to a declared code set.
    Code {
        width: usize,
        allowed: &'static [&'static str],
    },
}

impl FieldKind {
    fn width(&self) -> usize {
        match self {
            Self::Alpha(w) | Self::Numeric(w) => *w,
            Self::Code { width, .. } => *width,
        }
    }
}

/// One named field of a record layout.
#[derive(Debug, Clone)]
pub struct FieldBlock {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldBlock {
    pub fn alpha(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Alpha(width),
        }
    }

    pub fn numeric(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Numeric(width),
        }
    }

    pub fn code(name: &'static str, width: usize, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: FieldKind::Code { width, allowed },
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Width of the transaction prefix following the record type: transaction
/// sequence (8) + record sequence (8).
const PREFIX_SEQUENCES_WIDTH: usize = 16;

/// Declarative shape of one record type.
///
/// A newer format variant's layout is its predecessor's block list plus
/// appended blocks ([`Layout::extend`]); inherited byte offsets never move.
#[derive(Debug, Clone)]
pub struct Layout {
    record_type: &'static str,
    prefixed: bool,
    blocks: Vec<FieldBlock>,
    width: usize,
}

impl Layout {
    /// Assemble a layout. `prefixed` records carry the 19-character
    /// transaction prefix before their field blocks.
    pub fn new(record_type: &'static str, prefixed: bool, blocks: Vec<FieldBlock>) -> Self {
        let fields: usize = blocks.iter().map(|b| b.kind.width()).sum();
        let width =
            record_type.len() + if prefixed { PREFIX_SEQUENCES_WIDTH } else { 0 } + fields;
        Self {
            record_type,
            prefixed,
            blocks,
            width,
        }
    }

    /// Derive a successor layout by appending blocks to this one.
    pub fn extend(&self, extra: Vec<FieldBlock>) -> Self {
        let mut blocks = self.blocks.clone();
        blocks.extend(extra);
        Self::new(self.record_type, self.prefixed, blocks)
    }

    /// The 3-character record type code.
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    /// Exact rendered line width, prefix included.
    pub fn width(&self) -> usize {
        self.width
    }

    fn find(&self, name: &'static str) -> Result<(usize, &FieldBlock), StructuralError> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.name == name)
            .ok_or(StructuralError {
                record_type: self.record_type,
                field: name,
            })
    }

    /// Resolve a text field slot. Fails if the layout does not declare the
    /// field, or declares it with a non-text kind.
    pub fn text_slot(&self, name: &'static str) -> Result<TextSlot, StructuralError> {
        let (idx, block) = self.find(name)?;
        match block.kind {
            FieldKind::Alpha(width) => Ok(TextSlot {
                idx,
                name,
                width,
            }),
            _ => Err(StructuralError {
                record_type: self.record_type,
                field: name,
            }),
        }
    }

    /// Resolve a numeric field slot.
    pub fn num_slot(&self, name: &'static str) -> Result<NumSlot, StructuralError> {
        let (idx, block) = self.find(name)?;
        match block.kind {
            FieldKind::Numeric(width) => Ok(NumSlot {
                idx,
                name,
                width,
            }),
            _ => Err(StructuralError {
                record_type: self.record_type,
                field: name,
            }),
        }
    }

    /// Resolve a code field slot, carrying its declared code set.
    pub fn code_slot(&self, name: &'static str) -> Result<CodeSlot, StructuralError> {
        let (idx, block) = self.find(name)?;
        match block.kind {
            FieldKind::Code { allowed, .. } => Ok(CodeSlot {
                idx,
                name,
                allowed,
            }),
            _ => Err(StructuralError {
                record_type: self.record_type,
                field: name,
            }),
        }
    }
}

/// Descriptor of a resolved text field.
#[derive(Debug, Clone, Copy)]
pub struct TextSlot {
    idx: usize,
    name: &'static str,
    width: usize,
}

/// Descriptor of a resolved numeric field.
#[derive(Debug, Clone, Copy)]
pub struct NumSlot {
    idx: usize,
    name: &'static str,
    width: usize,
}

/// Descriptor of a resolved code field.
#[derive(Debug, Clone, Copy)]
pub struct CodeSlot {
    idx: usize,
    name: &'static str,
    allowed: &'static [&'static str],
}

// =============================================================================
// Record
// =============================================================================

#[derive(Debug, Clone)]
enum FieldValue {
    Text(String),
    Number(u64),
}

/// A transient, per-export value representing one output line.
#[derive(Debug, Clone)]
pub struct Record {
    layout: &'static Layout,
    type_override: Option<&'static str>,
    values: Vec<Option<FieldValue>>,
}

impl Record {
    /// Create an empty record over a layout. Unset fields render as spaces
    /// (text, codes) or zeros (numerics).
    pub fn new(layout: &'static Layout) -> Self {
        Self {
            layout,
            type_override: None,
            values: vec![None; layout.blocks.len()],
        }
    }

    pub fn record_type(&self) -> &'static str {
        self.type_override.unwrap_or(self.layout.record_type)
    }

    /// Replace the rendered record type code.
    ///
    /// Transaction headers share one layout but carry the group's configured
    /// transaction type (NWR/REV/DEL/REC). The override must have the same
    /// 3-character width as the layout's own code.
    pub fn override_record_type(&mut self, code: &'static str) {
        debug_assert_eq!(code.len(), self.layout.record_type.len());
        self.type_override = Some(code);
    }

    // -------------------------------------------------------------------------
    // Capability setters
    // -------------------------------------------------------------------------

    /// Set a text field. The value must fit the declared width.
    pub fn set_text(&mut self, slot: TextSlot, value: &str) -> FieldResult<()> {
        if value.chars().count() > slot.width {
            return Err(FieldError::Overflow {
                field: slot.name,
                width: slot.width,
                value: value.to_string(),
            });
        }
        self.values[slot.idx] = Some(FieldValue::Text(value.to_string()));
        Ok(())
    }

    /// Set an optional text field; `None` leaves the field blank.
    pub fn set_opt_text(&mut self, slot: TextSlot, value: Option<&str>) -> FieldResult<()> {
        match value {
            Some(v) => self.set_text(slot, v),
            None => Ok(()),
        }
    }

    /// Set a numeric field. The value must fit the declared digit count.
    pub fn set_number(&mut self, slot: NumSlot, value: u64) -> FieldResult<()> {
        if value.to_string().len() > slot.width {
            return Err(FieldError::NumericOverflow {
                field: slot.name,
                width: slot.width,
                value,
            });
        }
        self.values[slot.idx] = Some(FieldValue::Number(value));
        Ok(())
    }

    /// Set a code field after checking membership in its declared set.
    pub fn set_code(&mut self, slot: CodeSlot, value: &str) -> FieldResult<()> {
        let canonical = crate::encoding::encode_code(slot.name, value, slot.allowed)?;
        self.values[slot.idx] = Some(FieldValue::Text(canonical.to_string()));
        Ok(())
    }

    /// Set an ownership share in hundredths of a percent, bounded per right
    /// (PR max 5000, MR/SR max 10000).
    pub fn set_ownership_share(&mut self, slot: NumSlot, value: u16, max: u16) -> FieldResult<()> {
        if value > max {
            return Err(FieldError::ShareOutOfRange {
                field: slot.name,
                value: u32::from(value),
                max,
            });
        }
        self.set_number(slot, u64::from(value))
    }

    /// Set a collection share with a per-right bound; `None` defaults to zero.
    pub fn set_collection_share(
        &mut self,
        slot: NumSlot,
        value: Option<u16>,
        max: u16,
    ) -> FieldResult<()> {
        self.set_ownership_share(slot, value.unwrap_or(0), max)
    }

    /// Set a sequence number. `None` defaults to 1; values outside 1..=999
    /// are rejected.
    pub fn set_sequence(&mut self, slot: NumSlot, value: Option<u16>) -> FieldResult<()> {
        let seq = value.unwrap_or(1);
        if !(1..=999).contains(&seq) {
            return Err(FieldError::SequenceOutOfRange(u32::from(seq)));
        }
        self.set_number(slot, u64::from(seq))
    }

    /// Set a group id. Values outside 1..=99999 are rejected. Uniqueness
    /// within an export is the exporter's responsibility, not the record's.
    pub fn set_group_id(&mut self, slot: NumSlot, value: u32) -> FieldResult<()> {
        if !(1..=99_999).contains(&value) {
            return Err(FieldError::GroupIdOutOfRange(value));
        }
        self.set_number(slot, u64::from(value))
    }

    /// Set an interested party number. When mandatory, the value must be
    /// present, non-empty and at most 9 characters.
    pub fn set_interested_party_number(
        &mut self,
        slot: TextSlot,
        value: Option<&str>,
        mandatory: bool,
    ) -> FieldResult<()> {
        match value {
            Some(v) if v.is_empty() => Err(FieldError::InvalidInterestedPartyNumber {
                field: slot.name,
                value: v.to_string(),
                reason: "empty",
            }),
            Some(v) if v.chars().count() > 9 => Err(FieldError::InvalidInterestedPartyNumber {
                field: slot.name,
                value: v.to_string(),
                reason: "longer than 9 characters",
            }),
            Some(v) => self.set_text(slot, v),
            None if mandatory => Err(FieldError::InvalidInterestedPartyNumber {
                field: slot.name,
                value: String::new(),
                reason: "missing but mandatory for this record type",
            }),
            None => Ok(()),
        }
    }

    /// Set an optional language code field.
    pub fn set_language(&mut self, slot: TextSlot, code: Option<&LanguageCode>) -> FieldResult<()> {
        self.set_opt_text(slot, code.map(LanguageCode::as_str))
    }

    /// Set a TIS territory code field.
    pub fn set_territory(&mut self, slot: NumSlot, code: TisCode) -> FieldResult<()> {
        self.set_number(slot, u64::from(code.value()))
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render this record to one fixed-width line.
    ///
    /// The sequence numbers fill the transaction prefix; control records
    /// ignore them. The output length always equals the layout width.
    pub fn render(&self, transaction_seq: u32, record_seq: u32) -> FieldResult<String> {
        let mut line = String::with_capacity(self.layout.width);
        line.push_str(self.record_type());
        if self.layout.prefixed {
            line.push_str(&pad_numeric(
                "transaction_sequence",
                u64::from(transaction_seq),
                8,
            )?);
            line.push_str(&pad_numeric("record_sequence", u64::from(record_seq), 8)?);
        }
        for (block, value) in self.layout.blocks.iter().zip(&self.values) {
            let width = block.kind.width();
            match (&block.kind, value) {
                (FieldKind::Numeric(_), Some(FieldValue::Number(n))) => {
                    line.push_str(&pad_numeric(block.name, *n, width)?);
                }
                (FieldKind::Numeric(_), None) => {
                    line.push_str(&"0".repeat(width));
                }
                (_, Some(FieldValue::Text(t))) => {
                    line.push_str(&pad_alphanumeric(block.name, t, width)?);
                }
                (_, None) => {
                    line.push_str(&" ".repeat(width));
                }
                // A numeric value in a text block (or vice versa) cannot be
                // stored through the typed slots above.
                (_, Some(FieldValue::Number(n))) => {
                    line.push_str(&pad_alphanumeric(block.name, &n.to_string(), width)?);
                }
            }
        }
        debug_assert_eq!(line.chars().count(), self.layout.width);
        Ok(line)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static TEST_LAYOUT: Lazy<Layout> = Lazy::new(|| {
        Layout::new(
            "TST",
            true,
            vec![
                FieldBlock::alpha("name", 10),
                FieldBlock::numeric("share", 5),
                FieldBlock::numeric("sequence", 3),
                FieldBlock::code("flag", 1, &["Y", "N"]),
            ],
        )
    });

    #[test]
    fn test_layout_width_includes_prefix() {
        // 3 (type) + 16 (sequences) + 10 + 5 + 3 + 1
        assert_eq!(TEST_LAYOUT.width(), 38);
    }

    #[test]
    fn test_unknown_slot_is_structural_error() {
        let err = TEST_LAYOUT.text_slot("nonexistent").unwrap_err();
        assert_eq!(err.record_type, "TST");
        assert_eq!(err.field, "nonexistent");
    }

    #[test]
    fn test_kind_mismatch_is_structural_error() {
        // "share" is numeric; asking for a text slot is a wiring bug.
        assert!(TEST_LAYOUT.text_slot("share").is_err());
        assert!(TEST_LAYOUT.num_slot("name").is_err());
        assert!(TEST_LAYOUT.code_slot("share").is_err());
    }

    #[test]
    fn test_render_width_and_padding() {
        let mut rec = Record::new(&TEST_LAYOUT);
        rec.set_text(TEST_LAYOUT.text_slot("name").unwrap(), "DOE")
            .unwrap();
        rec.set_number(TEST_LAYOUT.num_slot("share").unwrap(), 5000)
            .unwrap();
        rec.set_code(TEST_LAYOUT.code_slot("flag").unwrap(), "Y")
            .unwrap();

        let line = rec.render(0, 1).unwrap();
        assert_eq!(line.len(), TEST_LAYOUT.width());
        assert_eq!(&line[0..3], "TST");
        assert_eq!(&line[3..11], "00000000"); // transaction sequence
        assert_eq!(&line[11..19], "00000001"); // record sequence
        assert_eq!(&line[19..29], "DOE       ");
        assert_eq!(&line[29..34], "05000");
        assert_eq!(&line[34..37], "000"); // unset numeric renders zeros
        assert_eq!(&line[37..38], "Y");
    }

    #[test]
    fn test_unset_text_renders_blank() {
        let rec = Record::new(&TEST_LAYOUT);
        let line = rec.render(0, 0).unwrap();
        assert_eq!(&line[19..29], "          ");
        assert_eq!(&line[37..38], " ");
    }

    #[test]
    fn test_sequence_setter_bounds() {
        let slot = TEST_LAYOUT.num_slot("sequence").unwrap();
        let mut rec = Record::new(&TEST_LAYOUT);

        assert!(rec.set_sequence(slot, Some(0)).is_err());
        assert!(rec.set_sequence(slot, Some(1)).is_ok());
        assert!(rec.set_sequence(slot, Some(999)).is_ok());
        assert!(rec.set_sequence(slot, Some(1000)).is_err());

        // Default when omitted is 1.
        rec.set_sequence(slot, None).unwrap();
        let line = rec.render(0, 0).unwrap();
        assert_eq!(&line[34..37], "001");
    }

    #[test]
    fn test_ownership_share_bounds() {
        let slot = TEST_LAYOUT.num_slot("share").unwrap();
        let mut rec = Record::new(&TEST_LAYOUT);

        assert!(rec.set_ownership_share(slot, 5000, 5000).is_ok());
        let err = rec.set_ownership_share(slot, 5001, 5000).unwrap_err();
        assert!(matches!(err, FieldError::ShareOutOfRange { max: 5000, .. }));
        assert!(rec.set_ownership_share(slot, 10_000, 10_000).is_ok());
    }

    #[test]
    fn test_collection_share_null_defaults_zero() {
        let slot = TEST_LAYOUT.num_slot("share").unwrap();
        let mut rec = Record::new(&TEST_LAYOUT);
        rec.set_collection_share(slot, None, 5000).unwrap();
        let line = rec.render(0, 0).unwrap();
        assert_eq!(&line[29..34], "00000");
    }

    #[test]
    fn test_interested_party_number_rules() {
        let slot = TEST_LAYOUT.text_slot("name").unwrap();
        let mut rec = Record::new(&TEST_LAYOUT);

        assert!(rec
            .set_interested_party_number(slot, Some("W0001"), true)
            .is_ok());
        assert!(rec.set_interested_party_number(slot, Some(""), true).is_err());
        assert!(rec
            .set_interested_party_number(slot, Some("0123456789"), true)
            .is_err());
        assert!(rec.set_interested_party_number(slot, None, true).is_err());
        assert!(rec.set_interested_party_number(slot, None, false).is_ok());
    }

    #[test]
    fn test_group_id_bounds() {
        static GROUP_LAYOUT: Lazy<Layout> = Lazy::new(|| {
            Layout::new("GRX", false, vec![FieldBlock::numeric("group_id", 5)])
        });
        let slot = GROUP_LAYOUT.num_slot("group_id").unwrap();
        let mut rec = Record::new(&GROUP_LAYOUT);

        assert!(rec.set_group_id(slot, 0).is_err());
        assert!(rec.set_group_id(slot, 100_000).is_err());
        assert!(rec.set_group_id(slot, 1).is_ok());
        assert!(rec.set_group_id(slot, 99_999).is_ok());
    }

    #[test]
    fn test_layout_extend_preserves_offsets() {
        let extended = TEST_LAYOUT.extend(vec![FieldBlock::numeric("extra", 2)]);
        assert_eq!(extended.width(), TEST_LAYOUT.width() + 2);

        // Inherited fields stay at the same byte offsets.
        let base = Record::new(&TEST_LAYOUT).render(0, 0).unwrap();
        static EXTENDED: Lazy<Layout> = Lazy::new(|| {
            Layout::new(
                "TST",
                true,
                vec![
                    FieldBlock::alpha("name", 10),
                    FieldBlock::numeric("share", 5),
                    FieldBlock::numeric("sequence", 3),
                    FieldBlock::code("flag", 1, &["Y", "N"]),
                    FieldBlock::numeric("extra", 2),
                ],
            )
        });
        let ext = Record::new(&EXTENDED).render(0, 0).unwrap();
        assert_eq!(&ext[..TEST_LAYOUT.width()], base.as_str());
    }
}
