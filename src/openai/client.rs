//! HTTP client for the OpenAI chat completions API

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::error::OpenAiError;
use super::models::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, Message, OpenAiModel,
};

/// OpenAI API client
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API key for authentication
    api_key: String,
}

impl OpenAiClient {
    /// Chat completions endpoint
    const API_URL: &'static str = "https://api.openai.com/v1/chat/completions";
    /// Hard request timeout; a hung upstream call must not hang the session
    const REQUEST_TIMEOUT_SECS: u64 = 120;

    /// Create a new client with the given API key
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(Self::REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    /// Send a chat completion request and return the generated text
    ///
    /// The cancellation token interrupts an in-flight request; a cancelled
    /// call returns [`OpenAiError::Cancelled`] without touching any state.
    pub async fn complete(
        &self,
        request: ChatCompletionRequest,
        cancel_token: CancellationToken,
    ) -> Result<String, OpenAiError> {
        let send = self
            .client
            .post(Self::API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send();

        let response = tokio::select! {
            _ = cancel_token.cancelled() => return Err(OpenAiError::Cancelled),
            response = send => response?,
        };

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            // Quota exhaustion also arrives as 429, distinguished by the body code
            let body = response.text().await.unwrap_or_default();
            if let Some(err) = Self::map_error_body(&body) {
                return Err(err);
            }
            return Err(OpenAiError::RateLimited { retry_after_seconds: retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Some(err) = Self::map_error_body(&body) {
                return Err(err);
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(OpenAiError::InvalidApiKey);
            }
            return Err(OpenAiError::Api { status: status.as_u16(), message: body });
        }

        let body = response.text().await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;

        completion.content().map(str::to_string).ok_or(OpenAiError::EmptyResponse)
    }

    /// Map the API's machine-readable error code to a dedicated variant
    fn map_error_body(body: &str) -> Option<OpenAiError> {
        let envelope: ApiErrorResponse = serde_json::from_str(body).ok()?;
        match envelope.error.code.as_deref() {
            Some("insufficient_quota") => Some(OpenAiError::QuotaExceeded),
            Some("invalid_api_key") => Some(OpenAiError::InvalidApiKey),
            _ => None,
        }
    }

    /// Test the API key by sending a minimal request
    pub async fn test_connection(&self) -> Result<(), OpenAiError> {
        let request = ChatCompletionRequest::new(OpenAiModel::Gpt35Turbo, vec![Message::user("Hi")])
            .with_max_tokens(10);

        self.complete(request, CancellationToken::new()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = OpenAiClient::new("sk-test-key".to_string());
        assert_eq!(client.api_key, "sk-test-key");
    }

    #[test]
    fn quota_code_maps_to_quota_exceeded() {
        let body = r#"{"error":{"message":"You exceeded your current quota","code":"insufficient_quota"}}"#;
        assert!(matches!(
            OpenAiClient::map_error_body(body),
            Some(OpenAiError::QuotaExceeded)
        ));
    }

    #[test]
    fn invalid_key_code_maps_to_invalid_api_key() {
        let body = r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#;
        assert!(matches!(
            OpenAiClient::map_error_body(body),
            Some(OpenAiError::InvalidApiKey)
        ));
    }

    #[test]
    fn unknown_code_is_not_mapped() {
        let body = r#"{"error":{"message":"server had an error","code":"server_error"}}"#;
        assert!(OpenAiClient::map_error_body(body).is_none());
        assert!(OpenAiClient::map_error_body("not json").is_none());
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let client = OpenAiClient::new("sk-test-key-abcdefghij".to_string());
        let request =
            ChatCompletionRequest::new(OpenAiModel::Gpt35Turbo, vec![Message::user("Hi")]);
        let token = CancellationToken::new();
        token.cancel();

        let result = client.complete(request, token).await;
        assert!(matches!(result, Err(OpenAiError::Cancelled)));
    }
}
