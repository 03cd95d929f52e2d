//! Remote condition matcher backed by the PubMed e-utilities API.
//!
//! An alternative to the local lookup for the match stage: searches
//! PubMed for articles related to the upstream symptom list and returns
//! their titles. Request failures are returned as text rather than
//! surfaced as stage failures, so a flaky remote degrades the answer
//! instead of aborting the run.

use super::{Capability, CapabilityInput};
use crate::errors::CapabilityError;
use crate::lookup::parse_terms;
use async_trait::async_trait;
use serde::Deserialize;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const RESULT_LIMIT: u32 = 5;

/// Sentinel text when the search returns no articles.
pub const NO_ARTICLES_TEXT: &str = "No relevant medical articles found on PubMed.";

#[derive(Debug, Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(Debug, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Searches PubMed for conditions associated with a symptom list.
#[derive(Debug, Clone)]
pub struct PubMedSearchCapability {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl PubMedSearchCapability {
    /// Creates a capability with an optional NCBI API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn run_search(&self, symptoms: &str) -> Result<String, reqwest::Error> {
        let terms = parse_terms(symptoms);
        let query = format!("({}) AND (symptom OR diagnosis)", terms.join(" AND "));

        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query),
            ("retmode", "json".to_string()),
            ("retmax", RESULT_LIMIT.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let search: EsearchResponse = self
            .client
            .get(format!("{EUTILS_BASE}/esearch.fcgi"))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let ids = search.esearchresult.idlist;
        if ids.is_empty() {
            return Ok(NO_ARTICLES_TEXT.to_string());
        }

        let mut summary_params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "json".to_string()),
        ];
        if let Some(key) = &self.api_key {
            summary_params.push(("api_key", key.clone()));
        }

        let summary: serde_json::Value = self
            .client
            .get(format!("{EUTILS_BASE}/esummary.fcgi"))
            .query(&summary_params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(extract_titles(&summary))
    }
}

/// Pulls article titles out of an esummary response body.
fn extract_titles(summary: &serde_json::Value) -> String {
    let Some(result) = summary.get("result").and_then(|r| r.as_object()) else {
        return NO_ARTICLES_TEXT.to_string();
    };

    let titles: Vec<String> = result
        .iter()
        .filter(|(uid, _)| uid.as_str() != "uids")
        .map(|(_, entry)| {
            let title = entry
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("No Title");
            format!("Title: {title}")
        })
        .collect();

    if titles.is_empty() {
        NO_ARTICLES_TEXT.to_string()
    } else {
        titles.join("\n")
    }
}

#[async_trait]
impl Capability for PubMedSearchCapability {
    async fn invoke(&self, input: &CapabilityInput<'_>) -> Result<String, CapabilityError> {
        match self.run_search(input.upstream_text()).await {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::warn!(error = %err, "PubMed search failed, returning error text");
                Ok(format!("An error occurred while searching PubMed: {err}"))
            }
        }
    }
}
