//! Data models for OpenAI chat-completion requests and responses

use serde::{Deserialize, Serialize};

/// Available OpenAI models
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OpenAiModel {
    /// GPT-3.5 Turbo - fast and cost-effective
    #[default]
    Gpt35Turbo,
    /// GPT-4 - more capable, slower and pricier
    Gpt4,
}

impl OpenAiModel {
    /// Get the API model identifier
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4 => "gpt-4",
        }
    }

    /// Get a human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gpt35Turbo => "GPT-3.5 Turbo",
            Self::Gpt4 => "GPT-4",
        }
    }

    /// Parse model from string (for command line or environment)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gpt-3.5-turbo" | "gpt-3.5" | "gpt35" | "3.5" => Some(Self::Gpt35Turbo),
            "gpt-4" | "gpt4" | "4" => Some(Self::Gpt4),
            _ => None,
        }
    }

    /// List all available models
    pub fn all() -> &'static [OpenAiModel] {
        &[Self::Gpt35Turbo, Self::Gpt4]
    }
}

impl std::str::FromStr for OpenAiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown model: {}. Options: gpt-3.5-turbo, gpt-4", s))
    }
}

/// Message role in conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Message content
    pub content: String,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Request body for the chat completions API
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    /// Default completion budget
    pub const DEFAULT_MAX_TOKENS: u32 = 2500;

    /// Create a new request with default settings
    pub fn new(model: OpenAiModel, messages: Vec<Message>) -> Self {
        Self {
            model: model.model_id().to_string(),
            messages,
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Response from the chat completions API
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion ID
    pub id: String,
    /// Completion choices (usually one)
    pub choices: Vec<Choice>,
    /// Usage statistics
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Get the text content of the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A single completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Generated message
    pub message: Message,
    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Input tokens used
    pub prompt_tokens: u32,
    /// Output tokens generated
    pub completion_tokens: u32,
    /// Total tokens billed
    pub total_tokens: u32,
}

/// Error envelope returned by the API on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload
    pub error: ApiErrorBody,
}

/// Error payload inside the envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message
    pub message: String,
    /// Machine-readable code, e.g. "insufficient_quota" or "invalid_api_key"
    pub code: Option<String>,
}
