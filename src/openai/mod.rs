//! OpenAI API integration module
//!
//! Provides credential validation, the HTTP client, and the wire types
//! for the chat completions API.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use auth::ApiKey;
pub use client::OpenAiClient;
pub use error::OpenAiError;
pub use models::{ChatCompletionRequest, Message, OpenAiModel, Role};
