use crate::layout::FieldLayout;

/// Untrimmed values sliced out of one fixed-width record.
///
/// Values are stored in layout order. A field that the record was too short
/// to contain is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line_number: u64,
    values: Vec<Option<String>>,
}

impl RawRow {
    pub fn new(line_number: u64, values: Vec<Option<String>>) -> Self {
        Self {
            line_number,
            values,
        }
    }

    /// 1-based line of the source file this row came from.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Value at a layout position.
    pub fn get(&self, position: usize) -> Option<&str> {
        self.values.get(position)?.as_deref()
    }

    /// Value of a named field; `None` when undeclared or missing.
    pub fn value(&self, layout: &FieldLayout, name: &str) -> Option<&str> {
        self.get(layout.position(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FieldSpec;

    #[test]
    fn test_value_lookup() {
        let layout = FieldLayout::new(vec![FieldSpec::new("A", 0, 2), FieldSpec::new("B", 2, 4)])
            .unwrap();
        let row = RawRow::new(7, vec![Some("27".to_string()), None]);

        assert_eq!(row.line_number(), 7);
        assert_eq!(row.value(&layout, "A"), Some("27"));
        assert_eq!(row.value(&layout, "B"), None);
        assert_eq!(row.value(&layout, "C"), None);
        assert_eq!(row.values().len(), 2);
    }
}
