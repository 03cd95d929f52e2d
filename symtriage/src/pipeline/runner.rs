//! Sequential pipeline execution.

use super::Pipeline;
use crate::capability::CapabilityInput;
use crate::context::{PipelineContext, RunIdentity, StageResult, SymptomQuery};
use crate::errors::{ContextError, PipelineError};
use std::time::{Duration, Instant};

/// Default bound on a single capability invocation.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes a pipeline end-to-end for one query.
///
/// Stages run strictly in declared order; a stage starts only after every
/// dependency holds a result. The first failure aborts the remaining
/// stages with no partial output. Capability calls are external and
/// unbounded by default, so each invocation is wrapped in a timeout and
/// expiry is treated as a stage failure.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    stage_timeout: Duration,
}

impl PipelineRunner {
    /// Creates a runner with the default stage timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    /// Sets the per-stage timeout.
    #[must_use]
    pub const fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Runs the pipeline, returning the final stage's result.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::StageInvocation` when a capability call
    /// fails or times out; no automatic retry is attempted.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        query: SymptomQuery,
    ) -> Result<StageResult, PipelineError> {
        self.run_identified(pipeline, query, RunIdentity::new()).await
    }

    /// Runs the pipeline under an existing run identity.
    ///
    /// # Errors
    ///
    /// See [`PipelineRunner::run`].
    pub async fn run_identified(
        &self,
        pipeline: &Pipeline,
        query: SymptomQuery,
        run: RunIdentity,
    ) -> Result<StageResult, PipelineError> {
        let run_id = run.run_id;
        let mut ctx = PipelineContext::new(run, query);

        tracing::info!(%run_id, pipeline = pipeline.name(), "pipeline started");
        let pipeline_start = Instant::now();

        for spec in pipeline.stages() {
            let mut deps: Vec<&StageResult> = Vec::with_capacity(spec.dependencies.len());
            for dep in &spec.dependencies {
                deps.push(ctx.get(dep).ok_or_else(|| ContextError::MissingDependency {
                    stage: spec.id.clone(),
                    dependency: dep.clone(),
                })?);
            }

            let input = CapabilityInput {
                instruction: &spec.instruction,
                query: ctx.query().text(),
                context: &deps,
            };

            tracing::info!(%run_id, stage = %spec.id, "stage started");
            let stage_start = Instant::now();

            let invocation =
                tokio::time::timeout(self.stage_timeout, spec.capability.invoke(&input)).await;

            let text = match invocation {
                Err(_) => {
                    let reason = format!(
                        "timed out after {}s",
                        self.stage_timeout.as_secs_f64()
                    );
                    tracing::error!(%run_id, stage = %spec.id, %reason, "stage failed");
                    return Err(PipelineError::StageInvocation {
                        stage: spec.id.clone(),
                        reason,
                    });
                }
                Ok(Err(err)) => {
                    tracing::error!(%run_id, stage = %spec.id, error = %err, "stage failed");
                    return Err(PipelineError::StageInvocation {
                        stage: spec.id.clone(),
                        reason: err.to_string(),
                    });
                }
                Ok(Ok(text)) => text,
            };

            tracing::info!(
                %run_id,
                stage = %spec.id,
                duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0,
                "stage completed"
            );

            ctx.record(StageResult::new(&spec.id, text))?;
        }

        tracing::info!(
            %run_id,
            pipeline = pipeline.name(),
            duration_ms = pipeline_start.elapsed().as_secs_f64() * 1000.0,
            "pipeline completed"
        );

        // The builder guarantees at least one stage.
        ctx.into_final().ok_or_else(|| {
            PipelineError::Validation(crate::errors::PipelineValidationError::new(
                "pipeline produced no results",
            ))
        })
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}
