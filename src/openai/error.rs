//! Error types for OpenAI API integration

use thiserror::Error;

/// Errors that can occur when interacting with the OpenAI API
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// API key is not configured
    #[error("OpenAI API key is missing. Set OPENAI_API_KEY in your environment or .env file")]
    ApiKeyNotFound,

    /// Invalid API key format
    #[error("Invalid OpenAI API key format. Key should start with 'sk-'")]
    InvalidKeyFormat,

    /// API key rejected by the upstream service
    #[error("Invalid OpenAI API key. Please check your API key configuration")]
    InvalidApiKey,

    /// Account quota exhausted
    #[error("OpenAI API quota exceeded. Please check your billing details")]
    QuotaExceeded,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Rate limited by the API
    #[error("Rate limited. Retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_seconds: u64,
    },

    /// Upstream returned no text content
    #[error("No content generated")]
    EmptyResponse,

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpenAiError {
    /// Check if this error is recoverable (user can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OpenAiError::RateLimited { .. }
                | OpenAiError::Request(_)
                | OpenAiError::Cancelled
                | OpenAiError::EmptyResponse
        )
    }

    /// Check if this error requires fixing the configured credential
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            OpenAiError::ApiKeyNotFound
                | OpenAiError::InvalidKeyFormat
                | OpenAiError::InvalidApiKey
                | OpenAiError::Api { status: 401, .. }
        )
    }
}
