//! Error types for the symtriage pipeline and its account boundary.

use thiserror::Error;

/// Error raised when pipeline construction fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

/// Errors raised by the pipeline context.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// A result was recorded twice for the same stage.
    #[error("stage '{stage}' already has a recorded result")]
    DuplicateStage {
        /// The stage name.
        stage: String,
    },

    /// A stage's declared dependency has no recorded result yet.
    #[error("stage '{stage}' requires '{dependency}', which has not completed")]
    MissingDependency {
        /// The stage being executed.
        stage: String,
        /// The dependency with no recorded result.
        dependency: String,
    },
}

/// Errors raised by a capability invocation.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The underlying request failed (transport or non-success status).
    #[error("capability request failed: {0}")]
    Request(String),

    /// The capability responded without usable text content.
    #[error("capability response contained no text content")]
    EmptyResponse,
}

/// The main error type for pipeline execution.
///
/// `user_message` yields the only text ever shown to callers; internal
/// detail stays in logs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Pipeline construction failed validation.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// The pipeline context rejected an operation.
    #[error("{0}")]
    Context(#[from] ContextError),

    /// A stage's capability invocation failed or timed out. Remaining
    /// stages are aborted; no partial results are returned.
    #[error("stage '{stage}' invocation failed: {reason}")]
    StageInvocation {
        /// The stage whose capability failed.
        stage: String,
        /// The underlying reason.
        reason: String,
    },
}

impl PipelineError {
    /// The generic message surfaced to callers for any pipeline failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        "An unexpected error occurred while processing your request. Please try again later."
    }
}

/// Errors raised while loading the disease table.
///
/// Never propagated out of the lookup: the search recovers by returning
/// the "no data" sentinel text.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The table file could not be read.
    #[error("disease table unreadable at '{path}': {source}")]
    Unreadable {
        /// The configured table path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The table file could not be parsed.
    #[error("disease table at '{path}' is not valid JSON: {source}")]
    Malformed {
        /// The configured table path.
        path: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

/// Errors raised by the account gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Registration conflict; reported as a client error, never retried.
    #[error("Username already registered")]
    DuplicateUsername,

    /// Login rejection; reported as unauthorized, never retried. Absent
    /// usernames and wrong passwords are indistinguishable to callers.
    #[error("Incorrect username or password")]
    InvalidCredentials,
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required environment variable is absent. Surfaced at startup,
    /// never mid-request.
    #[error("required environment variable '{name}' is not set")]
    MissingVar {
        /// The variable name.
        name: String,
    },

    /// An environment variable holds an unparsable value.
    #[error("environment variable '{name}' has invalid value '{value}'")]
    InvalidVar {
        /// The variable name.
        name: String,
        /// The offending value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = PipelineValidationError::new("bad graph")
            .with_stages(vec!["classify".to_string()]);
        assert_eq!(err.to_string(), "bad graph");
        assert_eq!(err.stages, vec!["classify"]);
    }

    #[test]
    fn test_pipeline_error_user_message_is_generic() {
        let err = PipelineError::StageInvocation {
            stage: "classify".to_string(),
            reason: "connection reset by peer".to_string(),
        };
        assert!(!err.user_message().contains("classify"));
        assert!(!err.user_message().contains("connection"));
    }

    #[test]
    fn test_account_error_details_match_service_contract() {
        assert_eq!(
            AccountError::DuplicateUsername.to_string(),
            "Username already registered"
        );
        assert_eq!(
            AccountError::InvalidCredentials.to_string(),
            "Incorrect username or password"
        );
    }

    #[test]
    fn test_context_error_display() {
        let err = ContextError::DuplicateStage {
            stage: "match".to_string(),
        };
        assert!(err.to_string().contains("match"));
    }

    #[test]
    fn test_config_error_names_variable() {
        let err = ConfigError::MissingVar {
            name: "SYMTRIAGE_TOKEN_KEY".to_string(),
        };
        assert!(err.to_string().contains("SYMTRIAGE_TOKEN_KEY"));
    }
}
