//! Names of the columns the normalizer derives.
//!
//! Derived columns never reuse their source name, so a labeling pass can
//! only ever read raw columns.

/// Suffix of the labeled column derived from a categorical variable.
pub const LABEL_SUFFIX: &str = "_LABEL";

/// Suffix of the coerced column derived from a numeric variable.
pub const NUMERIC_SUFFIX: &str = "_NUM";

/// Name of the label column for a categorical variable (`_SEX` -> `_SEX_LABEL`).
pub fn label_column(name: &str) -> String {
    format!("{name}{LABEL_SUFFIX}")
}

/// Name of the numeric column for a numeric variable (`PHYSHLTH` -> `PHYSHLTH_NUM`).
pub fn numeric_column(name: &str) -> String {
    format!("{name}{NUMERIC_SUFFIX}")
}
