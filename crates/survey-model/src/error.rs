//! Configuration errors detected while building a layout or schema.

use thiserror::Error;

/// A defect in the static survey configuration.
///
/// These are raised while the codebook is loaded, before any record is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    // === Layout Errors ===
    /// The layout declares no fields.
    #[error("field layout is empty")]
    EmptyLayout,

    /// A field was declared without a name.
    #[error("field at {start}..{end} has an empty name")]
    EmptyFieldName { start: usize, end: usize },

    /// A field range is empty or inverted.
    #[error("field {name} has invalid range {start}..{end} (start must be below end)")]
    InvalidRange {
        name: String,
        start: usize,
        end: usize,
    },

    /// Two fields share a name.
    #[error("field {name} is declared more than once")]
    DuplicateField { name: String },

    /// Two fields cover overlapping bytes without an alias declaration.
    #[error("fields {first} and {second} overlap")]
    OverlappingFields { first: String, second: String },

    /// An alias points at a field that is not declared.
    #[error("field {name} aliases undeclared field {target}")]
    UnknownAlias { name: String, target: String },

    /// An alias points at a field that is itself an alias.
    #[error("field {name} aliases {target}, which is itself an alias")]
    ChainedAlias { name: String, target: String },

    /// An alias does not cover exactly the bytes of its target.
    #[error("alias {name} must cover the same bytes as {target}")]
    AliasRangeMismatch { name: String, target: String },

    // === Schema Errors ===
    /// A filter or variable refers to a field the layout does not declare.
    #[error("{role} field {name} is not declared in the field layout")]
    UnknownField { role: &'static str, name: String },

    /// A filter value is empty.
    #[error("{role} must not be empty")]
    EmptyFilterValue { role: &'static str },

    /// A filter value cannot match its field because the byte widths differ.
    #[error("{role} {value:?} is {} bytes but field {field} is {width} bytes wide", value.len())]
    FilterWidthMismatch {
        role: &'static str,
        field: String,
        width: usize,
        value: String,
    },

    /// A variable is declared twice within the numeric or categorical set.
    #[error("variable {name} is declared more than once")]
    DuplicateVariable { name: String },

    /// A variable is declared as both numeric and categorical.
    #[error("variable {name} is declared as both numeric and categorical")]
    ConflictingKind { name: String },

    /// A derived column would shadow a raw layout field.
    #[error("derived column {column} for {name} collides with a layout field")]
    DerivedNameCollision { name: String, column: String },

    /// A categorical variable has no codes.
    #[error("categorical variable {name} has an empty code map")]
    EmptyCodeMap { name: String },

    /// A numeric code is both a sentinel and a substitution.
    #[error("numeric variable {name} lists code {code} as both sentinel and substitution")]
    SentinelSubstitution { name: String, code: String },

    /// A numeric variable implies more decimal places than an f64 can scale.
    #[error("numeric variable {name} implies {places} decimal places (at most 15)")]
    ImpliedDecimalsOutOfRange { name: String, places: u32 },
}
