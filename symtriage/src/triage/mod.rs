//! The symptom triage pipeline: classify → match → advise.
//!
//! Three stages executed strictly in order, each consuming the original
//! query plus its predecessor's free-text output. Stage contracts (the
//! classifier's comma-separated-only output, the adviser's leading
//! disclaimer) are enforced by instruction text, not validated
//! programmatically; malformed classifier output degrades downstream
//! matching quality silently.

use crate::capability::{Capability, ChatCompletionsCapability, LookupCapability};
use crate::config::SymtriageConfig;
use crate::context::{RunIdentity, SymptomQuery};
use crate::errors::{PipelineError, PipelineValidationError};
use crate::lookup::DiseaseLookup;
use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRunner, StageSpec};
use std::sync::Arc;
use std::time::Duration;

/// Stage id of the symptom classifier.
pub const CLASSIFY_STAGE: &str = "classify";
/// Stage id of the condition matcher.
pub const MATCH_STAGE: &str = "match";
/// Stage id of the advice provider.
pub const ADVISE_STAGE: &str = "advise";

/// Instruction for the classify stage. The output contract is
/// instructional only.
pub const CLASSIFY_INSTRUCTION: &str = "You are an expert in medical NLP. \
    Analyze the user input and extract the key medical symptoms it describes. \
    Respond with a single, comma-separated string of symptoms ONLY. \
    Do NOT include JSON, explanations, or any other text. \
    Example: 'headache, fever, sore throat'";

/// Instruction for the match stage. The capability is the deterministic
/// disease lookup, driven by the classify stage's comma-separated output.
pub const MATCH_INSTRUCTION: &str = "Use the comma-separated symptom list from \
    the previous step to search the local symptom-disease table for potential \
    medical conditions.";

/// Instruction for the advise stage.
pub const ADVISE_INSTRUCTION: &str = "You are a cautious healthcare assistant. \
    Based on the list of potential conditions from the previous step, provide \
    general, non-prescriptive health advice. \
    IMPORTANT: Start your answer with a clear disclaimer that you are not a \
    medical professional and that the reader should consult a real healthcare \
    professional.";

/// The assembled three-stage pipeline with its runner.
#[derive(Debug)]
pub struct TriagePipeline {
    pipeline: Pipeline,
    runner: PipelineRunner,
}

impl TriagePipeline {
    /// Wires the three stages from explicit capabilities.
    ///
    /// Lifecycle is owned by the caller; nothing here is process-global.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage graph fails validation.
    pub fn new(
        classifier: Arc<dyn Capability>,
        matcher: Arc<dyn Capability>,
        adviser: Arc<dyn Capability>,
        stage_timeout: Duration,
    ) -> Result<Self, PipelineValidationError> {
        let pipeline = PipelineBuilder::new("symptom-triage")
            .stage(StageSpec::new(CLASSIFY_STAGE, CLASSIFY_INSTRUCTION, classifier))?
            .stage(
                StageSpec::new(MATCH_STAGE, MATCH_INSTRUCTION, matcher)
                    .with_dependency(CLASSIFY_STAGE),
            )?
            .stage(
                StageSpec::new(ADVISE_STAGE, ADVISE_INSTRUCTION, adviser)
                    .with_dependency(MATCH_STAGE),
            )?
            .build()?;

        Ok(Self {
            pipeline,
            runner: PipelineRunner::new().with_stage_timeout(stage_timeout),
        })
    }

    /// Builds the production pipeline from configuration: language-model
    /// capabilities for classify and advise, the local disease lookup for
    /// match.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage graph fails validation.
    pub fn from_config(config: &SymtriageConfig) -> Result<Self, PipelineValidationError> {
        let classifier = ChatCompletionsCapability::new(&config.llm.api_key)
            .with_base_url(&config.llm.base_url)
            .with_model(&config.llm.model);
        let adviser = classifier.clone();
        let matcher = LookupCapability::new(DiseaseLookup::new(&config.disease_table));

        Self::new(
            Arc::new(classifier),
            Arc::new(matcher),
            Arc::new(adviser),
            config.stage_timeout,
        )
    }

    /// Runs the pipeline for one query, returning the advisory text.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` when a stage fails; `user_message` on the
    /// error yields the generic caller-facing text.
    pub async fn run(&self, query: impl Into<SymptomQuery>) -> Result<String, PipelineError> {
        self.runner
            .run(&self.pipeline, query.into())
            .await
            .map(|result| result.text)
    }

    /// Runs the pipeline under an authenticated user's identity.
    ///
    /// # Errors
    ///
    /// See [`TriagePipeline::run`].
    pub async fn run_for_user(
        &self,
        query: impl Into<SymptomQuery>,
        username: &str,
    ) -> Result<String, PipelineError> {
        let run = RunIdentity::new().with_username(username);
        self.runner
            .run_identified(&self.pipeline, query.into(), run)
            .await
            .map(|result| result.text)
    }

    /// Returns the underlying pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
