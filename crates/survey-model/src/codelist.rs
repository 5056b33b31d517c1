//! Code maps and sentinel sets.
//!
//! Both come from the survey's published codebook. A code map turns a raw
//! response code into its descriptive label; a sentinel set lists the codes a
//! numeric question reserves for "don't know", "refused" and similar
//! non-answers.
//!
//! # Example: `_SEX`
//!
//! ```
//! use survey_model::CodeMap;
//!
//! let sex: CodeMap = [("1", "Male"), ("2", "Female")].into_iter().collect();
//!
//! assert_eq!(sex.label("1"), Some("Male"));
//! assert_eq!(sex.label("3"), None); // unmapped codes have no label
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Lookup from raw code to label for one categorical variable.
///
/// Lookups are exact: callers pass the code with surrounding whitespace
/// already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeMap {
    labels: BTreeMap<String, String>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a code, returning the label it replaced.
    pub fn insert(&mut self, code: impl Into<String>, label: impl Into<String>) -> Option<String> {
        self.labels.insert(code.into(), label.into())
    }

    /// Label for a code, or `None` when the codebook does not define it.
    pub fn label(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.labels.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entries in codebook order: numeric codes by value, then the rest
    /// lexically (so "2" sorts before "10").
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .labels
            .iter()
            .map(|(code, label)| (code.as_str(), label.as_str()))
            .collect();
        entries.sort_by(|a, b| compare_codes(a.0, b.0));
        entries
    }
}

fn compare_codes(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (code, label) in iter {
            map.insert(code, label);
        }
        map
    }
}

/// Reserved codes of one numeric variable that mean "no numeric answer".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentinelSet {
    codes: BTreeSet<String>,
}

impl SentinelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        self.codes.insert(code.into())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SentinelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_map_entries_in_codebook_order() {
        let map: CodeMap = [("10", "Ten"), ("2", "Two"), ("9", "Refused"), ("A", "Alpha")]
            .into_iter()
            .collect();
        let codes: Vec<&str> = map.entries().into_iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["2", "9", "10", "A"]);
    }

    #[test]
    fn test_code_map_is_exact() {
        let map: CodeMap = [("1", "Male")].into_iter().collect();
        assert_eq!(map.label("1"), Some("Male"));
        assert_eq!(map.label(" 1"), None);
        assert_eq!(map.label("01"), None);
    }

    #[test]
    fn test_sentinel_set() {
        let sentinels: SentinelSet = ["77", "99"].into_iter().collect();
        assert!(sentinels.contains("77"));
        assert!(!sentinels.contains("15"));
        assert_eq!(sentinels.len(), 2);
    }
}
