//! Slicing fixed-width records into raw rows.

use survey_model::{FieldLayout, FieldSpec, RawRow};

/// Cut one field's byte range out of a record.
///
/// Returns `None` when the record ends before the range does, or when the
/// range does not fall on character boundaries. The slice is not trimmed.
pub fn slice_field(record: &[u8], field: &FieldSpec) -> Option<String> {
    let bytes = record.get(field.range())?;
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// Slice every declared field out of one record, in layout order.
///
/// A short record yields `None` for each field it cannot contain; slicing
/// never fails the row.
///
/// # Example
///
/// ```
/// use survey_ingest::slice_record;
/// use survey_model::{FieldLayout, FieldSpec};
///
/// let layout = FieldLayout::new(vec![
///     FieldSpec::new("_STATE", 0, 2),
///     FieldSpec::new("DISPCODE", 2, 6),
/// ])
/// .unwrap();
///
/// let row = slice_record(1, b"271100", &layout);
/// assert_eq!(row.value(&layout, "DISPCODE"), Some("1100"));
///
/// let short = slice_record(2, b"27", &layout);
/// assert_eq!(short.value(&layout, "DISPCODE"), None);
/// ```
pub fn slice_record(line_number: u64, record: &[u8], layout: &FieldLayout) -> RawRow {
    let values = layout
        .fields()
        .iter()
        .map(|field| slice_field(record, field))
        .collect();
    RawRow::new(line_number, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> FieldLayout {
        FieldLayout::new(vec![
            FieldSpec::new("A", 0, 2),
            FieldSpec::new("B", 2, 5),
            FieldSpec::new("C", 5, 6),
        ])
        .unwrap()
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let row = slice_record(1, b" 7 x z", &layout());
        assert_eq!(row.values()[0].as_deref(), Some(" 7"));
        assert_eq!(row.values()[1].as_deref(), Some(" x "));
        assert_eq!(row.values()[2].as_deref(), Some("z"));
    }

    #[test]
    fn test_partially_covered_field_is_missing() {
        let row = slice_record(1, b"2711", &layout());
        assert_eq!(row.values()[0].as_deref(), Some("27"));
        assert_eq!(row.values()[1], None);
        assert_eq!(row.values()[2], None);
    }

    #[test]
    fn test_split_character_is_missing() {
        // "é" is two bytes; B starts in the middle of it.
        let record = "2é345".as_bytes();
        let layout = FieldLayout::new(vec![FieldSpec::new("A", 0, 2), FieldSpec::new("B", 2, 4)])
            .unwrap();
        let row = slice_record(1, record, &layout);
        assert_eq!(row.values()[0], None);
        assert_eq!(row.values()[1], None);
    }
}
