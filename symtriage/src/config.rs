//! Environment-driven configuration.
//!
//! Secrets and knobs come from environment variables (`.env` files are
//! honored). Missing required secrets fail at startup, never
//! mid-request.

use crate::errors::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Required: API key for the chat-completions provider.
pub const LLM_API_KEY_VAR: &str = "SYMTRIAGE_LLM_API_KEY";
/// Required: signing key for bearer tokens.
pub const TOKEN_KEY_VAR: &str = "SYMTRIAGE_TOKEN_KEY";
/// Optional: chat-completions API base URL.
pub const LLM_BASE_URL_VAR: &str = "SYMTRIAGE_LLM_BASE_URL";
/// Optional: model identifier.
pub const LLM_MODEL_VAR: &str = "SYMTRIAGE_LLM_MODEL";
/// Optional: path to the disease table.
pub const DISEASE_TABLE_VAR: &str = "SYMTRIAGE_DISEASE_TABLE";
/// Optional: per-stage timeout in seconds.
pub const STAGE_TIMEOUT_VAR: &str = "SYMTRIAGE_STAGE_TIMEOUT_SECS";
/// Optional: token lifetime in seconds.
pub const TOKEN_TTL_VAR: &str = "SYMTRIAGE_TOKEN_TTL_SECS";

const DEFAULT_DISEASE_TABLE: &str = "data/diseases.json";
const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 30;

/// Chat-completions provider settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider API key.
    pub api_key: String,
    /// API base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct SymtriageConfig {
    /// Language-model provider settings.
    pub llm: LlmConfig,
    /// Bearer-token signing key.
    pub token_key: String,
    /// Bearer-token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Path to the disease table.
    pub disease_table: PathBuf,
    /// Bound on a single stage invocation.
    pub stage_timeout: Duration,
}

impl SymtriageConfig {
    /// Loads configuration from the process environment, reading a
    /// `.env` file first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` when a required secret is
    /// absent, or `ConfigError::InvalidVar` for unparsable numeric
    /// overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_resolver(|key| std::env::var(key).ok())
    }

    /// Loads configuration through a custom resolver (for testing).
    ///
    /// # Errors
    ///
    /// See [`SymtriageConfig::from_env`].
    pub fn from_resolver(
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = require(&env, LLM_API_KEY_VAR)?;
        let token_key = require(&env, TOKEN_KEY_VAR)?;

        let base_url = env(LLM_BASE_URL_VAR)
            .unwrap_or_else(|| crate::capability::DEFAULT_BASE_URL.to_string());
        let model = env(LLM_MODEL_VAR)
            .unwrap_or_else(|| crate::capability::DEFAULT_MODEL.to_string());
        let disease_table = env(DISEASE_TABLE_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_DISEASE_TABLE), PathBuf::from);

        let stage_timeout_secs =
            parse_or_default(&env, STAGE_TIMEOUT_VAR, DEFAULT_STAGE_TIMEOUT_SECS)?;
        let token_ttl_secs = parse_or_default(
            &env,
            TOKEN_TTL_VAR,
            crate::account::DEFAULT_TOKEN_TTL_SECS,
        )?;

        Ok(Self {
            llm: LlmConfig {
                api_key,
                base_url,
                model,
            },
            token_key,
            token_ttl_secs,
            disease_table,
            stage_timeout: Duration::from_secs(stage_timeout_secs),
        })
    }
}

fn require(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, ConfigError> {
    match env(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar {
            name: name.to_string(),
        }),
    }
}

fn parse_or_default<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
            name: name.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_minimal_environment() {
        let config = SymtriageConfig::from_resolver(resolver(&[
            (LLM_API_KEY_VAR, "sk-test"),
            (TOKEN_KEY_VAR, "signing-key"),
        ]))
        .unwrap();

        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.stage_timeout, Duration::from_secs(30));
        assert_eq!(config.token_ttl_secs, 30 * 60);
        assert_eq!(config.disease_table, PathBuf::from("data/diseases.json"));
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = SymtriageConfig::from_resolver(resolver(&[(TOKEN_KEY_VAR, "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar { name } if name == LLM_API_KEY_VAR));
    }

    #[test]
    fn test_missing_token_key_fails_fast() {
        let err =
            SymtriageConfig::from_resolver(resolver(&[(LLM_API_KEY_VAR, "sk")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar { name } if name == TOKEN_KEY_VAR));
    }

    #[test]
    fn test_blank_secret_treated_as_missing() {
        let err = SymtriageConfig::from_resolver(resolver(&[
            (LLM_API_KEY_VAR, "   "),
            (TOKEN_KEY_VAR, "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar { .. }));
    }

    #[test]
    fn test_overrides_applied() {
        let config = SymtriageConfig::from_resolver(resolver(&[
            (LLM_API_KEY_VAR, "sk"),
            (TOKEN_KEY_VAR, "k"),
            (LLM_MODEL_VAR, "other-model"),
            (STAGE_TIMEOUT_VAR, "5"),
            (DISEASE_TABLE_VAR, "/srv/diseases.json"),
        ]))
        .unwrap();

        assert_eq!(config.llm.model, "other-model");
        assert_eq!(config.stage_timeout, Duration::from_secs(5));
        assert_eq!(config.disease_table, PathBuf::from("/srv/diseases.json"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let err = SymtriageConfig::from_resolver(resolver(&[
            (LLM_API_KEY_VAR, "sk"),
            (TOKEN_KEY_VAR, "k"),
            (STAGE_TIMEOUT_VAR, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));
    }
}
