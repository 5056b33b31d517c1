//! Numeric and categorical variable declarations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codelist::{CodeMap, SentinelSet};
use crate::naming::{label_column, numeric_column};

/// A variable coerced to a number after its sentinels are removed.
///
/// # Example: `PHYSHLTH`
///
/// ```
/// use survey_model::NumericVariable;
///
/// let physhlth = NumericVariable::new("PHYSHLTH")
///     .with_sentinels(["77", "99"])
///     .with_substitution("88", 0.0);
///
/// assert!(physhlth.sentinels.contains("77"));
/// assert_eq!(physhlth.output_column(), "PHYSHLTH_NUM");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericVariable {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Codes that mean "no numeric answer" (don't know, refused, ...).
    #[serde(default)]
    pub sentinels: SentinelSet,

    /// Codes that stand for a fixed number (BRFSS "88" = none = 0 days).
    #[serde(default)]
    pub substitutions: BTreeMap<String, f64>,

    /// Decimal places implied by the codebook but not written in the record.
    #[serde(default)]
    pub implied_decimals: u32,
}

impl NumericVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sentinels: SentinelSet::new(),
            substitutions: BTreeMap::new(),
            implied_decimals: 0,
        }
    }

    #[must_use]
    pub fn with_sentinels<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for code in codes {
            self.sentinels.insert(code);
        }
        self
    }

    #[must_use]
    pub fn with_substitution(mut self, code: impl Into<String>, value: f64) -> Self {
        self.substitutions.insert(code.into(), value);
        self
    }

    #[must_use]
    pub fn with_implied_decimals(mut self, places: u32) -> Self {
        self.implied_decimals = places;
        self
    }

    /// Name of the coerced column this variable produces.
    pub fn output_column(&self) -> String {
        numeric_column(&self.name)
    }
}

/// A variable recoded to a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalVariable {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Raw code -> label, from the codebook.
    #[serde(default)]
    pub labels: CodeMap,
}

impl CategoricalVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            labels: CodeMap::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(code, label);
        self
    }

    /// Name of the label column this variable produces.
    pub fn output_column(&self) -> String {
        label_column(&self.name)
    }
}

/// What a non-blank code absent from the code map becomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Folded into generic missing.
    #[default]
    Missing,
    /// Labeled with the schema's "unrecognized code" label.
    Unrecognized,
}
