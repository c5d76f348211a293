//! API credential validation
//!
//! The key itself comes from the process environment (see [`crate::config`]);
//! this module only checks shape and provides a display-safe masking helper.

use super::error::OpenAiError;

/// Validates the configured OpenAI API key before any network call
pub struct ApiKey;

impl ApiKey {
    /// Validate a key read from the environment, failing fast on bad shape
    pub fn validate(key: &str) -> Result<(), OpenAiError> {
        if key.is_empty() {
            return Err(OpenAiError::ApiKeyNotFound);
        }
        if !Self::validate_key_format(key) {
            return Err(OpenAiError::InvalidKeyFormat);
        }
        Ok(())
    }

    /// Check the key shape without distinguishing missing from malformed
    pub fn validate_key_format(key: &str) -> bool {
        // OpenAI API keys start with "sk-"
        key.starts_with("sk-") && key.len() > 20
    }

    /// Mask an API key for display (show first and last 4 chars)
    pub fn mask_key(key: &str) -> String {
        if key.len() <= 12 {
            return "*".repeat(key.len());
        }
        let prefix = &key[..8];
        let suffix = &key[key.len() - 4..];
        format!("{}...{}", prefix, suffix)
    }
}
