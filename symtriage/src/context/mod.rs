//! Run context: the query, per-stage results, and the append-only
//! mapping built up as stages complete.

use crate::errors::ContextError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this run.
    pub run_id: Uuid,
    /// The authenticated username, when the run is account-gated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            username: None,
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// The raw free-text user input. Immutable once submitted; one per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomQuery {
    text: String,
}

impl SymptomQuery {
    /// Creates a query from free text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the query text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for SymptomQuery {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SymptomQuery {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Free-text output produced by one stage. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// The stage that produced this result.
    pub stage: String,
    /// The stage's free-text output.
    pub text: String,
    /// When the stage completed.
    pub completed_at: DateTime<Utc>,
}

impl StageResult {
    /// Creates a result completed now.
    #[must_use]
    pub fn new(stage: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            text: text.into(),
            completed_at: Utc::now(),
        }
    }
}

/// Ordered stage → result mapping, built incrementally as stages complete.
///
/// The context never holds an entry for a stage that has not completed,
/// and recording a second result for the same stage is an error. The
/// runner exposes only a stage's declared dependencies to it, so a stage
/// can only observe results of stages that precede it.
#[derive(Debug)]
pub struct PipelineContext {
    run: RunIdentity,
    query: SymptomQuery,
    results: Vec<StageResult>,
}

impl PipelineContext {
    /// Creates an empty context for one run.
    #[must_use]
    pub fn new(run: RunIdentity, query: SymptomQuery) -> Self {
        Self {
            run,
            query,
            results: Vec::new(),
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn run(&self) -> &RunIdentity {
        &self.run
    }

    /// Returns the original query.
    #[must_use]
    pub fn query(&self) -> &SymptomQuery {
        &self.query
    }

    /// Records a completed stage's result.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::DuplicateStage` if the stage already has a
    /// recorded result.
    pub fn record(&mut self, result: StageResult) -> Result<(), ContextError> {
        if self.get(&result.stage).is_some() {
            return Err(ContextError::DuplicateStage {
                stage: result.stage,
            });
        }
        self.results.push(result);
        Ok(())
    }

    /// Returns the recorded result for a stage, if it has completed.
    #[must_use]
    pub fn get(&self, stage: &str) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    /// Returns all recorded results in completion order.
    #[must_use]
    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    /// Returns the number of completed stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no stage has completed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consumes the context, returning the final stage's result.
    #[must_use]
    pub fn into_final(mut self) -> Option<StageResult> {
        self.results.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PipelineContext {
        PipelineContext::new(RunIdentity::new(), SymptomQuery::new("I feel unwell"))
    }

    #[test]
    fn test_record_and_get() {
        let mut ctx = ctx();
        ctx.record(StageResult::new("classify", "fever, cough"))
            .unwrap();

        let result = ctx.get("classify").unwrap();
        assert_eq!(result.text, "fever, cough");
        assert!(ctx.get("match").is_none());
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let mut ctx = ctx();
        ctx.record(StageResult::new("classify", "fever")).unwrap();

        let err = ctx
            .record(StageResult::new("classify", "cough"))
            .unwrap_err();
        assert!(matches!(err, ContextError::DuplicateStage { .. }));

        // First result is untouched.
        assert_eq!(ctx.get("classify").unwrap().text, "fever");
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_results_keep_completion_order() {
        let mut ctx = ctx();
        ctx.record(StageResult::new("classify", "a")).unwrap();
        ctx.record(StageResult::new("match", "b")).unwrap();
        ctx.record(StageResult::new("advise", "c")).unwrap();

        let stages: Vec<_> = ctx.results().iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["classify", "match", "advise"]);
    }

    #[test]
    fn test_into_final_returns_last_result() {
        let mut ctx = ctx();
        ctx.record(StageResult::new("classify", "a")).unwrap();
        ctx.record(StageResult::new("advise", "final advice")).unwrap();

        let last = ctx.into_final().unwrap();
        assert_eq!(last.stage, "advise");
        assert_eq!(last.text, "final advice");
    }

    #[test]
    fn test_empty_context() {
        let ctx = ctx();
        assert!(ctx.is_empty());
        assert!(ctx.into_final().is_none());
    }

    #[test]
    fn test_run_identity_with_username() {
        let run = RunIdentity::new().with_username("alice");
        assert_eq!(run.username.as_deref(), Some("alice"));
    }
}
