//! The validated survey configuration passed to extraction and normalization.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::layout::FieldLayout;
use crate::variable::{CategoricalVariable, NumericVariable, UnmappedPolicy};

/// Label used for unmapped codes under [`UnmappedPolicy::Unrecognized`].
pub const DEFAULT_UNRECOGNIZED_LABEL: &str = "Unrecognized code";

/// Largest `implied_decimals` a numeric variable may declare.
pub const MAX_IMPLIED_DECIMALS: u32 = 15;

/// Sub-population restriction applied while extracting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationFilter {
    /// Identifier field compared against `target` (e.g. "_STATE").
    pub field: String,
    /// Exact, untrimmed value a record must carry (e.g. "27").
    pub target: String,
}

impl PopulationFilter {
    pub fn new(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        value == Some(self.target.as_str())
    }
}

/// Completed-interview restriction applied before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFilter {
    /// Disposition field (e.g. "DISPCODE").
    pub field: String,
    /// Exact, untrimmed code of a complete interview (e.g. "1100").
    pub complete: String,
}

impl CompletionFilter {
    pub fn new(field: impl Into<String>, complete: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            complete: complete.into(),
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        value == Some(self.complete.as_str())
    }
}

/// Field layout plus every per-variable codebook entry for one survey year.
///
/// Build with [`SurveySchema::new`] and the `with_*` methods, then call
/// [`SurveySchema::validate`] once at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveySchema {
    pub name: String,
    pub year: Option<u16>,
    pub layout: FieldLayout,
    pub population: PopulationFilter,
    pub completion: CompletionFilter,
    pub numeric: Vec<NumericVariable>,
    pub categorical: Vec<CategoricalVariable>,
    pub unmapped: UnmappedPolicy,
    pub unrecognized_label: String,
}

impl SurveySchema {
    pub fn new(
        name: impl Into<String>,
        layout: FieldLayout,
        population: PopulationFilter,
        completion: CompletionFilter,
    ) -> Self {
        Self {
            name: name.into(),
            year: None,
            layout,
            population,
            completion,
            numeric: Vec::new(),
            categorical: Vec::new(),
            unmapped: UnmappedPolicy::default(),
            unrecognized_label: DEFAULT_UNRECOGNIZED_LABEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_numeric(mut self, variable: NumericVariable) -> Self {
        self.numeric.push(variable);
        self
    }

    #[must_use]
    pub fn with_categorical(mut self, variable: CategoricalVariable) -> Self {
        self.categorical.push(variable);
        self
    }

    #[must_use]
    pub fn with_unmapped(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped = policy;
        self
    }

    #[must_use]
    pub fn with_unrecognized_label(mut self, label: impl Into<String>) -> Self {
        self.unrecognized_label = label.into();
        self
    }

    /// Replace the population target (e.g. a different state code).
    #[must_use]
    pub fn with_population_target(mut self, target: impl Into<String>) -> Self {
        self.population.target = target.into();
        self
    }

    /// Check every cross-reference between the layout and the declarations.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let layout = &self.layout;

        if !layout.contains(&self.population.field) {
            return Err(SchemaError::UnknownField {
                role: "population",
                name: self.population.field.clone(),
            });
        }
        if self.population.target.is_empty() {
            return Err(SchemaError::EmptyFilterValue {
                role: "population target",
            });
        }
        check_filter_width(
            layout,
            "population target",
            &self.population.field,
            &self.population.target,
        )?;
        if !layout.contains(&self.completion.field) {
            return Err(SchemaError::UnknownField {
                role: "completion",
                name: self.completion.field.clone(),
            });
        }
        if self.completion.complete.is_empty() {
            return Err(SchemaError::EmptyFilterValue {
                role: "completion code",
            });
        }
        check_filter_width(
            layout,
            "completion code",
            &self.completion.field,
            &self.completion.complete,
        )?;

        let mut numeric_names = BTreeSet::new();
        for variable in &self.numeric {
            if !layout.contains(&variable.name) {
                return Err(SchemaError::UnknownField {
                    role: "numeric",
                    name: variable.name.clone(),
                });
            }
            if !numeric_names.insert(variable.name.as_str()) {
                return Err(SchemaError::DuplicateVariable {
                    name: variable.name.clone(),
                });
            }
            if let Some(code) = variable
                .substitutions
                .keys()
                .find(|code| variable.sentinels.contains(code))
            {
                return Err(SchemaError::SentinelSubstitution {
                    name: variable.name.clone(),
                    code: code.clone(),
                });
            }
            if variable.implied_decimals > MAX_IMPLIED_DECIMALS {
                return Err(SchemaError::ImpliedDecimalsOutOfRange {
                    name: variable.name.clone(),
                    places: variable.implied_decimals,
                });
            }
            check_derived_name(layout, &variable.name, variable.output_column())?;
        }

        let mut categorical_names = BTreeSet::new();
        for variable in &self.categorical {
            if !layout.contains(&variable.name) {
                return Err(SchemaError::UnknownField {
                    role: "categorical",
                    name: variable.name.clone(),
                });
            }
            if !categorical_names.insert(variable.name.as_str()) {
                return Err(SchemaError::DuplicateVariable {
                    name: variable.name.clone(),
                });
            }
            if numeric_names.contains(variable.name.as_str()) {
                return Err(SchemaError::ConflictingKind {
                    name: variable.name.clone(),
                });
            }
            if variable.labels.is_empty() {
                return Err(SchemaError::EmptyCodeMap {
                    name: variable.name.clone(),
                });
            }
            check_derived_name(layout, &variable.name, variable.output_column())?;
        }

        Ok(())
    }

    pub fn numeric_variable(&self, name: &str) -> Option<&NumericVariable> {
        self.numeric.iter().find(|variable| variable.name == name)
    }

    pub fn categorical_variable(&self, name: &str) -> Option<&CategoricalVariable> {
        self.categorical.iter().find(|variable| variable.name == name)
    }

    /// Raw columns the normalizer reads.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.completion.field.as_str()];
        columns.extend(self.numeric.iter().map(|v| v.name.as_str()));
        columns.extend(self.categorical.iter().map(|v| v.name.as_str()));
        columns
    }

    /// Columns of the analysis table, in output order: raw fields, then
    /// numeric columns, then label columns.
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.layout.names().map(str::to_string).collect();
        columns.extend(self.numeric.iter().map(NumericVariable::output_column));
        columns.extend(self.categorical.iter().map(CategoricalVariable::output_column));
        columns
    }
}

/// Filters compare untrimmed bytes, so a value of any other width never matches.
fn check_filter_width(
    layout: &FieldLayout,
    role: &'static str,
    field: &str,
    value: &str,
) -> Result<(), SchemaError> {
    match layout.get(field) {
        Some(field_spec) if field_spec.width() != value.len() => Err(SchemaError::FilterWidthMismatch {
            role,
            field: field.to_string(),
            width: field_spec.width(),
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_derived_name(layout: &FieldLayout, name: &str, column: String) -> Result<(), SchemaError> {
    if layout.contains(&column) {
        return Err(SchemaError::DerivedNameCollision {
            name: name.to_string(),
            column,
        });
    }
    Ok(())
}
