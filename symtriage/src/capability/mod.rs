//! The capability seam: a stage's unit of work behind one interface.
//!
//! A capability turns an assembled input into free text. Concrete
//! implementations are a chat-completions language-model call, the
//! deterministic disease lookup, or the remote PubMed search.

mod llm;
mod lookup;
mod pubmed;

pub use llm::{ChatCompletionsCapability, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use lookup::LookupCapability;
pub use pubmed::{PubMedSearchCapability, NO_ARTICLES_TEXT};

use crate::context::StageResult;
use crate::errors::CapabilityError;
use async_trait::async_trait;
use std::fmt::Debug;

/// The effective input of one stage invocation: the stage's instruction,
/// the original query, and the declared dependencies' results in
/// declaration order.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityInput<'a> {
    /// The stage's task instruction.
    pub instruction: &'a str,
    /// The original free-text query.
    pub query: &'a str,
    /// Results of the stage's declared dependencies, in order.
    pub context: &'a [&'a StageResult],
}

impl CapabilityInput<'_> {
    /// Returns the most recent upstream text, falling back to the query
    /// for stages with no dependencies.
    #[must_use]
    pub fn upstream_text(&self) -> &str {
        self.context.last().map_or(self.query, |r| r.text.as_str())
    }

    /// Concatenates the query and dependency outputs into one user-facing
    /// block, each dependency labelled by its stage.
    #[must_use]
    pub fn user_text(&self) -> String {
        let mut text = format!("USER INPUT: '{}'", self.query);
        for result in self.context {
            text.push_str("\n\nOutput of the '");
            text.push_str(&result.stage);
            text.push_str("' step:\n");
            text.push_str(&result.text);
        }
        text
    }
}

/// A unit of work invoked by a pipeline stage.
#[async_trait]
pub trait Capability: Send + Sync + Debug {
    /// Produces free text from the assembled input.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError` when the underlying call fails; the
    /// runner surfaces this as a stage invocation failure.
    async fn invoke(&self, input: &CapabilityInput<'_>) -> Result<String, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StageResult;

    #[test]
    fn test_upstream_text_prefers_last_dependency() {
        let first = StageResult::new("classify", "fever, cough");
        let second = StageResult::new("match", "flu");
        let deps = [&first, &second];
        let input = CapabilityInput {
            instruction: "advise",
            query: "I feel ill",
            context: &deps,
        };

        assert_eq!(input.upstream_text(), "flu");
    }

    #[test]
    fn test_upstream_text_falls_back_to_query() {
        let input = CapabilityInput {
            instruction: "classify",
            query: "I feel ill",
            context: &[],
        };

        assert_eq!(input.upstream_text(), "I feel ill");
    }

    #[test]
    fn test_user_text_labels_dependencies() {
        let dep = StageResult::new("classify", "fever");
        let deps = [&dep];
        let input = CapabilityInput {
            instruction: "match",
            query: "I have a fever",
            context: &deps,
        };

        let text = input.user_text();
        assert!(text.starts_with("USER INPUT: 'I have a fever'"));
        assert!(text.contains("'classify'"));
        assert!(text.contains("fever"));
    }
}
