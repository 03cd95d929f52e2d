//! Pipeline builder with validation.

use super::{Pipeline, StageSpec};
use crate::errors::PipelineValidationError;
use std::collections::HashSet;

/// Builder for creating validated pipelines.
///
/// Dependencies must name stages added earlier, so the declared order is
/// already topological and a dependency cycle cannot be expressed.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageSpec>,
    ids: HashSet<String>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Adds a stage to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is invalid, the id is already taken,
    /// or a dependency names a stage that has not been added yet.
    pub fn stage(mut self, spec: StageSpec) -> Result<Self, PipelineValidationError> {
        spec.validate()?;

        if self.ids.contains(&spec.id) {
            return Err(PipelineValidationError::new(format!(
                "duplicate stage id '{}'",
                spec.id
            ))
            .with_stages(vec![spec.id]));
        }

        for dep in &spec.dependencies {
            if !self.ids.contains(dep) {
                return Err(PipelineValidationError::new(format!(
                    "stage '{}' depends on unknown stage '{dep}'; add the dependency first",
                    spec.id
                ))
                .with_stages(vec![spec.id.clone(), dep.clone()]));
            }
        }

        self.ids.insert(spec.id.clone());
        self.stages.push(spec);
        Ok(self)
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline name is empty or no stages were
    /// added.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "pipeline name cannot be empty or whitespace-only",
            ));
        }
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new(
                "pipeline must contain at least one stage",
            ));
        }
        Ok(Pipeline::new(self.name, self.stages))
    }
}
