//! Frequency tallies of normalized tables.
//!
//! The summary only reads columns the normalizer already derived. Label
//! counts come from `<NAME>_LABEL` and numeric ranges from `<NAME>_NUM`; the
//! raw code is consulted only to tell unmapped codes apart from blanks.

use polars::prelude::*;
use serde::Serialize;
use survey_common::string_values;
use survey_model::{CategoricalVariable, NumericVariable, SurveySchema};
use survey_normalization::{CodeLookup, lookup_code};

use crate::error::ReportError;

/// Count of one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Label frequencies of one categorical variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalTally {
    pub variable: String,
    /// Labels in code-map order, including labels never seen.
    pub labels: Vec<LabelCount>,
    /// Blank raw values.
    pub missing: usize,
    /// Non-blank codes absent from the code map.
    pub unmapped: usize,
}

impl CategoricalTally {
    fn new(variable: &CategoricalVariable) -> Self {
        let mut labels: Vec<LabelCount> = Vec::new();
        for (_, label) in variable.labels.entries() {
            if !labels.iter().any(|entry| entry.label == label) {
                labels.push(LabelCount {
                    label: label.to_string(),
                    count: 0,
                });
            }
        }
        Self {
            variable: variable.name.clone(),
            labels,
            missing: 0,
            unmapped: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.labels.iter().map(|entry| entry.count).sum::<usize>() + self.missing + self.unmapped
    }

    fn add_label(&mut self, label: &str) {
        if let Some(entry) = self.labels.iter_mut().find(|entry| entry.label == label) {
            entry.count += 1;
        }
    }

    fn merge(&mut self, other: &Self) {
        for theirs in &other.labels {
            match self.labels.iter_mut().find(|ours| ours.label == theirs.label) {
                Some(ours) => ours.count += theirs.count,
                None => self.labels.push(theirs.clone()),
            }
        }
        self.missing += other.missing;
        self.unmapped += other.unmapped;
    }
}

/// Range and mean of one numeric variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericTally {
    pub variable: String,
    /// Non-missing values.
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    #[serde(skip)]
    sum: f64,
}

impl NumericTally {
    fn new(variable: &NumericVariable) -> Self {
        Self {
            variable: variable.name.clone(),
            count: 0,
            missing: 0,
            min: None,
            max: None,
            mean: None,
            sum: 0.0,
        }
    }

    fn add(&mut self, value: Option<f64>) {
        let Some(value) = value else {
            self.missing += 1;
            return;
        };
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.missing += other.missing;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.refresh_mean();
    }

    fn refresh_mean(&mut self) {
        self.mean = (self.count > 0).then(|| self.sum / self.count as f64);
    }
}

/// Frequency tallies for every declared variable of a schema.
///
/// Build with [`FrequencySummary::new`], then feed each normalized frame
/// (or chunk) to [`FrequencySummary::add_frame`] in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencySummary {
    pub categorical: Vec<CategoricalTally>,
    pub numeric: Vec<NumericTally>,
    #[serde(skip)]
    categorical_variables: Vec<CategoricalVariable>,
    #[serde(skip)]
    numeric_variables: Vec<NumericVariable>,
}

impl FrequencySummary {
    pub fn new(schema: &SurveySchema) -> Self {
        Self {
            categorical: schema.categorical.iter().map(CategoricalTally::new).collect(),
            numeric: schema.numeric.iter().map(NumericTally::new).collect(),
            categorical_variables: schema.categorical.clone(),
            numeric_variables: schema.numeric.clone(),
        }
    }

    /// Tally a whole normalized frame.
    pub fn from_frame(schema: &SurveySchema, df: &DataFrame) -> Result<Self, ReportError> {
        let mut summary = Self::new(schema);
        summary.add_frame(df)?;
        Ok(summary)
    }

    /// Add the rows of one normalized frame.
    pub fn add_frame(&mut self, df: &DataFrame) -> Result<(), ReportError> {
        for (tally, variable) in self.categorical.iter_mut().zip(&self.categorical_variables) {
            let raw = string_values(column(df, &variable.name)?)?;
            let labels = string_values(column(df, &variable.output_column())?)?;
            for (raw, label) in raw.iter().zip(&labels) {
                match (lookup_code(raw.as_deref(), variable), label) {
                    (CodeLookup::Label(_), Some(label)) => tally.add_label(label),
                    (CodeLookup::Unmapped, _) => tally.unmapped += 1,
                    (CodeLookup::Blank, _) | (CodeLookup::Label(_), None) => tally.missing += 1,
                }
            }
        }

        for (tally, variable) in self.numeric.iter_mut().zip(&self.numeric_variables) {
            let values = column(df, &variable.output_column())?
                .cast(&DataType::Float64)?;
            for value in values.f64()?.iter() {
                tally.add(value);
            }
            tally.refresh_mean();
        }
        Ok(())
    }

    /// Fold another summary of the same schema into this one.
    pub fn merge(&mut self, other: &Self) {
        for (ours, theirs) in self.categorical.iter_mut().zip(&other.categorical) {
            ours.merge(theirs);
        }
        for (ours, theirs) in self.numeric.iter_mut().zip(&other.numeric) {
            ours.merge(theirs);
        }
    }

    pub fn categorical_tally(&self, variable: &str) -> Option<&CategoricalTally> {
        self.categorical.iter().find(|tally| tally.variable == variable)
    }

    pub fn numeric_tally(&self, variable: &str) -> Option<&NumericTally> {
        self.numeric.iter().find(|tally| tally.variable == variable)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, ReportError> {
    df.column(name)
        .map_err(|_| ReportError::ColumnNotFound(name.to_string()))
}
