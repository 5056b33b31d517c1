//! Fixed-width field layout.
//!
//! A layout maps variable names to half-open byte ranges `[start, end)` of a
//! record. It can only be constructed through [`FieldLayout::new`] (or by
//! deserializing, which goes through the same checks), so a layout value in
//! hand is always well-formed:
//!
//! - names are unique and non-empty
//! - every range satisfies `start < end`
//! - ranges overlap only for an explicit alias covering identical bytes
//!
//! # Example
//!
//! ```
//! use survey_model::{FieldLayout, FieldSpec};
//!
//! let layout = FieldLayout::new(vec![
//!     FieldSpec::new("_STATE", 0, 2),
//!     FieldSpec::new("SEQNO", 35, 45),
//!     FieldSpec::aliased("_PSU", 35, 45, "SEQNO"),
//! ])
//! .unwrap();
//!
//! assert_eq!(layout.record_width(), 45);
//! assert_eq!(layout.position("_PSU"), Some(2));
//! ```

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// One named byte range of a fixed-width record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Variable name (e.g. "_STATE").
    pub name: String,

    /// First byte of the field (0-based, inclusive).
    pub start: usize,

    /// One past the last byte of the field (exclusive).
    pub end: usize,

    /// Field whose bytes this one intentionally shares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            alias_of: None,
        }
    }

    /// A field backed by the same bytes as `target`.
    pub fn aliased(
        name: impl Into<String>,
        start: usize,
        end: usize,
        target: impl Into<String>,
    ) -> Self {
        Self {
            alias_of: Some(target.into()),
            ..Self::new(name, start, end)
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    fn overlaps(&self, other: &FieldSpec) -> bool {
        self.start < other.end && other.start < self.end
    }

    fn same_bytes(&self, other: &FieldSpec) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Validated, immutable set of field positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct FieldLayout {
    fields: Vec<FieldSpec>,
    index: BTreeMap<String, usize>,
}

impl FieldLayout {
    /// Build a layout, rejecting any malformed range, duplicate name or
    /// unintended overlap.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyLayout);
        }

        let mut index = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    start: field.start,
                    end: field.end,
                });
            }
            if field.start >= field.end {
                return Err(SchemaError::InvalidRange {
                    name: field.name.clone(),
                    start: field.start,
                    end: field.end,
                });
            }
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }

        for field in &fields {
            let Some(target) = &field.alias_of else {
                continue;
            };
            let Some(&target_pos) = index.get(target) else {
                return Err(SchemaError::UnknownAlias {
                    name: field.name.clone(),
                    target: target.clone(),
                });
            };
            let target_field = &fields[target_pos];
            if target_field.is_alias() {
                return Err(SchemaError::ChainedAlias {
                    name: field.name.clone(),
                    target: target.clone(),
                });
            }
            if !field.same_bytes(target_field) {
                return Err(SchemaError::AliasRangeMismatch {
                    name: field.name.clone(),
                    target: target.clone(),
                });
            }
        }

        for (i, first) in fields.iter().enumerate() {
            for second in &fields[i + 1..] {
                if first.overlaps(second) && !aliased_together(first, second) {
                    return Err(SchemaError::OverlappingFields {
                        first: first.name.clone(),
                        second: second.name.clone(),
                    });
                }
            }
        }

        Ok(Self { fields, index })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.position(name).map(|pos| &self.fields[pos])
    }

    /// Declaration index of a field (also its column index in raw tables).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Minimum record length that covers every declared field.
    pub fn record_width(&self) -> usize {
        self.fields.iter().map(|field| field.end).max().unwrap_or(0)
    }
}

/// Identical bytes declared as an alias pair, or as two aliases of one field.
fn aliased_together(first: &FieldSpec, second: &FieldSpec) -> bool {
    if !first.same_bytes(second) {
        return false;
    }
    match (&first.alias_of, &second.alias_of) {
        (Some(target), None) => *target == second.name,
        (None, Some(target)) => *target == first.name,
        (Some(a), Some(b)) => a == b,
        (None, None) => false,
    }
}

impl TryFrom<Vec<FieldSpec>> for FieldLayout {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<FieldLayout> for Vec<FieldSpec> {
    fn from(layout: FieldLayout) -> Self {
        layout.fields
    }
}
