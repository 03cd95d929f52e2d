//! Stage specifications.

use crate::capability::Capability;
use crate::errors::PipelineValidationError;
use std::sync::Arc;

/// Specification for a single stage: identity, task instruction, ordered
/// upstream dependencies, and the capability that does the work.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub id: String,
    /// The task instruction handed to the capability.
    pub instruction: String,
    /// Names of stages whose results this stage consumes, in the order
    /// their outputs are assembled into the effective input.
    pub dependencies: Vec<String>,
    /// The unit of work.
    pub capability: Arc<dyn Capability>,
}

impl StageSpec {
    /// Creates a stage specification with no dependencies.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        instruction: impl Into<String>,
        capability: Arc<dyn Capability>,
    ) -> Self {
        Self {
            id: id.into(),
            instruction: instruction.into(),
            dependencies: Vec::new(),
            capability,
        }
    }

    /// Adds an upstream dependency.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    /// Validates the specification in isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, the stage depends on itself,
    /// or a dependency is declared twice.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.id.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "stage id cannot be empty or whitespace-only",
            ));
        }
        if self.dependencies.iter().any(|d| d == &self.id) {
            return Err(PipelineValidationError::new(format!(
                "stage '{}' cannot depend on itself",
                self.id
            ))
            .with_stages(vec![self.id.clone()]));
        }
        for (i, dep) in self.dependencies.iter().enumerate() {
            if self.dependencies[..i].contains(dep) {
                return Err(PipelineValidationError::new(format!(
                    "stage '{}' declares dependency '{dep}' more than once",
                    self.id
                ))
                .with_stages(vec![self.id.clone(), dep.clone()]));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCapability;

    fn mock() -> Arc<dyn Capability> {
        Arc::new(MockCapability::replying("ok"))
    }

    #[test]
    fn test_spec_creation() {
        let spec = StageSpec::new("match", "search the table", mock())
            .with_dependency("classify");

        assert_eq!(spec.id, "match");
        assert_eq!(spec.dependencies, vec!["classify"]);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        let spec = StageSpec::new("  ", "task", mock());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let spec = StageSpec::new("classify", "task", mock()).with_dependency("classify");
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let spec = StageSpec::new("advise", "task", mock())
            .with_dependency("match")
            .with_dependency("match");
        assert!(spec.validate().is_err());
    }
}
