//! Configuration management
//!
//! All configuration comes from the process environment (optionally seeded
//! from a `.env` file by the binary). A missing or malformed API key fails
//! fast here, before any generation call is attempted.

use anyhow::{Context, Result, bail};

use crate::openai::{ApiKey, OpenAiModel};

/// Environment variable holding the API key (preferred)
const API_KEY_VAR: &str = "BENKYO_OPENAI_API_KEY";
/// Fallback variable shared with other OpenAI tooling
const API_KEY_FALLBACK_VAR: &str = "OPENAI_API_KEY";
/// Optional model selection
const MODEL_VAR: &str = "BENKYO_MODEL";
/// Optional sampling temperature override
const TEMPERATURE_VAR: &str = "BENKYO_TEMPERATURE";
/// Optional completion budget override
const MAX_TOKENS_VAR: &str = "BENKYO_MAX_TOKENS";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key
    pub api_key: String,

    /// Selected model
    pub model: OpenAiModel,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Maximum tokens per completion (100 - 4000)
    pub max_tokens: u32,
}

impl Config {
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    /// Default completion budget
    pub const DEFAULT_MAX_TOKENS: u32 = 2500;

    /// Load and validate configuration from the environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .or_else(|_| std::env::var(API_KEY_FALLBACK_VAR))
            .unwrap_or_default();
        ApiKey::validate(&api_key)?;

        let model = match std::env::var(MODEL_VAR) {
            Ok(s) => s
                .parse::<OpenAiModel>()
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("Invalid {}", MODEL_VAR))?,
            Err(_) => OpenAiModel::default(),
        };

        let temperature = match std::env::var(TEMPERATURE_VAR) {
            Ok(s) => {
                let t: f32 =
                    s.parse().with_context(|| format!("Invalid {}: {}", TEMPERATURE_VAR, s))?;
                Self::validate_temperature(t)?;
                t
            }
            Err(_) => Self::DEFAULT_TEMPERATURE,
        };

        let max_tokens = match std::env::var(MAX_TOKENS_VAR) {
            Ok(s) => {
                let n: u32 =
                    s.parse().with_context(|| format!("Invalid {}: {}", MAX_TOKENS_VAR, s))?;
                Self::validate_max_tokens(n)?;
                n
            }
            Err(_) => Self::DEFAULT_MAX_TOKENS,
        };

        Ok(Self { api_key, model, temperature, max_tokens })
    }

    fn validate_temperature(t: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&t) {
            bail!("Temperature must be between 0.0 and 2.0, got {}", t);
        }
        Ok(())
    }

    fn validate_max_tokens(n: u32) -> Result<()> {
        if !(100..=4000).contains(&n) {
            bail!("Max tokens must be between 100 and 4000, got {}", n);
        }
        Ok(())
    }

    /// Display-safe summary for logging (never logs the full key)
    pub fn summary(&self) -> String {
        format!(
            "model={} temperature={} max_tokens={} key={}",
            self.model.model_id(),
            self.temperature,
            self.max_tokens,
            ApiKey::mask_key(&self.api_key)
        )
    }
}
