//! Deterministic symptom-to-disease search over a static local table.
//!
//! The table is a JSON array of `{disease, symptoms[]}` records. A record
//! matches when its symptom set shares at least one term with the input;
//! matches are collected in table order with no dedup or ranking. The
//! result is free text, since the downstream stage only accepts free text.

use crate::errors::LookupError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Sentinel text returned when no record matches.
pub const NO_MATCH_TEXT: &str =
    "No matching diseases found in local data for the provided symptoms.";

/// Sentinel text returned when the table cannot be read. The lookup
/// recovers locally so the pipeline continues instead of aborting.
pub const NO_DATA_TEXT: &str =
    "Local disease data is unavailable; no conditions could be matched.";

/// A disease name paired with its associated symptom terms.
#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseRecord {
    /// The disease name.
    pub disease: String,
    /// Associated symptom terms.
    pub symptoms: Vec<String>,
}

/// The loaded table, symptom terms normalized, record order preserved.
#[derive(Debug, Clone)]
pub struct DiseaseTable {
    records: Vec<(String, HashSet<String>)>,
}

impl DiseaseTable {
    /// Builds a table from records, normalizing each symptom term.
    #[must_use]
    pub fn from_records(records: Vec<DiseaseRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| {
                let symptoms = r
                    .symptoms
                    .iter()
                    .map(|s| normalize(s))
                    .filter(|s| !s.is_empty())
                    .collect();
                (r.disease, symptoms)
            })
            .collect();
        Self { records }
    }

    /// Loads and normalizes the table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LookupError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LookupError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        let records: Vec<DiseaseRecord> =
            serde_json::from_str(&contents).map_err(|source| LookupError::Malformed {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::from_records(records))
    }

    /// Returns disease names whose symptom set intersects the input, in
    /// table order. A single shared term is sufficient.
    #[must_use]
    pub fn matches(&self, terms: &HashSet<String>) -> Vec<&str> {
        self.records
            .iter()
            .filter(|(_, symptoms)| !symptoms.is_disjoint(terms))
            .map(|(disease, _)| disease.as_str())
            .collect()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Searches the static disease table for symptom matches.
///
/// The table is reloaded on each search; it is immutable in scope, so
/// there is no consistency requirement between runs.
#[derive(Debug, Clone)]
pub struct DiseaseLookup {
    table_path: PathBuf,
}

impl DiseaseLookup {
    /// Creates a lookup over the table at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: path.into(),
        }
    }

    /// Searches with pre-parsed symptom terms.
    ///
    /// Returns the joined matching disease names, the no-match sentinel,
    /// or — when the table is unreadable — the no-data sentinel.
    #[must_use]
    pub fn search(&self, terms: &[String]) -> String {
        let table = match DiseaseTable::load(&self.table_path) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(error = %err, "disease table unavailable, degrading to no-data result");
                return NO_DATA_TEXT.to_string();
            }
        };

        let normalized: HashSet<String> = terms
            .iter()
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
            .collect();

        let matches = table.matches(&normalized);
        if matches.is_empty() {
            return NO_MATCH_TEXT.to_string();
        }
        format!(
            "Found potential matches in local data: {}",
            matches.join(", ")
        )
    }

    /// Searches with a raw comma-separated term string, as produced by
    /// the classify stage.
    #[must_use]
    pub fn search_text(&self, raw: &str) -> String {
        self.search(&parse_terms(raw))
    }
}

/// Splits a comma-separated term string, trimming whitespace and
/// lowercasing each term. Empty segments are dropped.
#[must_use]
pub fn parse_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect()
}

fn normalize(term: impl AsRef<str>) -> String {
    term.as_ref().trim().to_lowercase()
}
