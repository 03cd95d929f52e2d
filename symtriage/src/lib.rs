//! # Symtriage
//!
//! A symptom-to-advice pipeline: free-text input runs through three
//! ordered language-model-backed stages (classify → match → advise),
//! with the match stage calling a deterministic local disease lookup,
//! and the advice stage prefixing a mandatory disclaimer. A thin account
//! gate (register / login / bearer tokens) fronts the pipeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use symtriage::prelude::*;
//!
//! let config = SymtriageConfig::from_env()?;
//! let pipeline = TriagePipeline::from_config(&config)?;
//!
//! let advice = pipeline.run("I have a fever and a cough").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod account;
pub mod capability;
pub mod config;
pub mod context;
pub mod errors;
pub mod lookup;
pub mod pipeline;
pub mod telemetry;
pub mod testing;
pub mod triage;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::{
        AccessToken, Account, AccountGate, AccountProfile, InMemoryUserStore, TokenClaims,
        TokenSigner, UserStore,
    };
    pub use crate::capability::{
        Capability, CapabilityInput, ChatCompletionsCapability, LookupCapability,
        PubMedSearchCapability,
    };
    pub use crate::config::SymtriageConfig;
    pub use crate::context::{PipelineContext, RunIdentity, StageResult, SymptomQuery};
    pub use crate::errors::{
        AccountError, CapabilityError, ConfigError, ContextError, PipelineError,
        PipelineValidationError,
    };
    pub use crate::lookup::{DiseaseLookup, DiseaseRecord, DiseaseTable};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRunner, StageSpec};
    pub use crate::triage::TriagePipeline;
}
