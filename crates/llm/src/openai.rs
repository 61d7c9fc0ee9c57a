//! OpenAI Chat Completions API implementation
//!
//! Calls the chat-completions endpoint (https://api.openai.com/v1/chat/completions)
//! using the reqwest HTTP client, wrapped in the backoff combinator so
//! HTTP 429 responses are retried and everything else fails fast.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::retry::retry_with_backoff;
use crate::{
    ChatService, CompletionError, CompletionRequest, CompletionResponse, LlmConfig,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat Completions API request body
#[derive(Debug, Serialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<MessageBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MessageBody {
    role: String,
    content: String,
}

/// Chat Completions API response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

/// OpenAI chat completion service
pub struct OpenAiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl OpenAiService {
    /// Create a new OpenAI service
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    /// One attempt against the completion endpoint.
    ///
    /// HTTP 429 maps to the transient `RateLimited`; every other failure
    /// (transport, non-2xx, malformed body) is terminal `Upstream`.
    async fn attempt_completion(
        &self,
        body: &ChatCompletionBody,
    ) -> Result<CompletionResponse, CompletionError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(body);

        if let Some(org) = &self.config.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CompletionError::Upstream(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(CompletionError::Upstream(format!(
                    "OpenAI API error ({}): {}",
                    error_response.error.error_type.as_deref().unwrap_or("unknown"),
                    error_response.error.message
                )));
            }

            return Err(CompletionError::Upstream(format!(
                "OpenAI API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Upstream(format!("Failed to parse response: {}", e)))?;

        let usage = api_response.usage;
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Upstream("response contained no choices".to_string()))?;

        Ok(CompletionResponse {
            content: choice.message.content,
            model: api_response.model,
            prompt_tokens: usage.as_ref().map_or(0, |u| u.prompt_tokens),
            completion_tokens: usage.as_ref().map_or(0, |u| u.completion_tokens),
        })
    }
}

#[async_trait::async_trait]
impl ChatService for OpenAiService {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let messages: Vec<MessageBody> = request
            .messages
            .iter()
            .map(|m| MessageBody {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        let body = ChatCompletionBody {
            model: model.clone(),
            messages,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(model = %model, messages = body.messages.len(), "Sending chat completion request");

        let result = retry_with_backoff(
            &self.config.retry,
            CompletionError::is_retryable,
            || self.attempt_completion(&body),
        )
        .await;

        // A retryable error surviving the loop means the budget is spent
        result.map_err(|e| match e {
            CompletionError::RateLimited => CompletionError::RetriesExhausted,
            other => other,
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
