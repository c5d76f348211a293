//! Generation seam between the store and the OpenAI client

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::model::{Flashcard, StudyMaterials};
use super::{parser, prompt};
use crate::config::Config;
use crate::openai::{ChatCompletionRequest, Message, OpenAiClient, OpenAiError};

/// Produces study materials for a topic
///
/// The store depends on this trait rather than the HTTP client directly so
/// its transitions can be exercised without a network.
#[async_trait]
pub trait MaterialsGenerator: Send + Sync {
    /// Generate a full set of materials for a topic
    async fn generate(
        &self,
        topic: &str,
        cancel_token: CancellationToken,
    ) -> Result<StudyMaterials, OpenAiError>;

    /// Generate additional flashcards, avoiding duplicates with `existing`
    ///
    /// Returns only the new cards; append semantics belong to the caller.
    async fn generate_more_flashcards(
        &self,
        topic: &str,
        existing: &[Flashcard],
        cancel_token: CancellationToken,
    ) -> Result<Vec<Flashcard>, OpenAiError>;
}

/// [`MaterialsGenerator`] backed by the OpenAI chat completions API
pub struct OpenAiGenerator {
    client: OpenAiClient,
    config: Config,
}

impl OpenAiGenerator {
    /// Create a generator from validated configuration
    pub fn new(config: Config) -> Self {
        let client = OpenAiClient::new(config.api_key.clone());
        Self { client, config }
    }

    fn request(&self, system: &str, user: String) -> ChatCompletionRequest {
        ChatCompletionRequest::new(
            self.config.model,
            vec![Message::system(system), Message::user(user)],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens)
    }
}

#[async_trait]
impl MaterialsGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        topic: &str,
        cancel_token: CancellationToken,
    ) -> Result<StudyMaterials, OpenAiError> {
        tracing::info!(topic, model = self.config.model.model_id(), "Generating study materials");

        let request = self.request(prompt::GENERATE_SYSTEM, prompt::generate_user(topic));
        let content = self.client.complete(request, cancel_token).await?;

        let materials = parser::parse_study_materials(&content);
        tracing::info!(
            quiz = materials.quiz.len(),
            flashcards = materials.flashcards.len(),
            "Parsed study materials"
        );
        Ok(materials)
    }

    async fn generate_more_flashcards(
        &self,
        topic: &str,
        existing: &[Flashcard],
        cancel_token: CancellationToken,
    ) -> Result<Vec<Flashcard>, OpenAiError> {
        tracing::info!(topic, existing = existing.len(), "Generating additional flashcards");

        let request = self
            .request(prompt::MORE_FLASHCARDS_SYSTEM, prompt::more_flashcards_user(topic, existing));
        let content = self.client.complete(request, cancel_token).await?;

        Ok(parser::parse_flashcards_response(&content))
    }
}
