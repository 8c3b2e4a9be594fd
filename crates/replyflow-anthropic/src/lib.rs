// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for the Replyflow pipeline.
//!
//! Implements [`ProviderAdapter`] over the non-streaming Messages API.

pub mod client;
pub mod types;

use async_trait::async_trait;
use replyflow_config::ReplyflowConfig;
use replyflow_core::ReplyflowError;
use replyflow_core::traits::{PluginAdapter, ProviderAdapter};
use replyflow_core::types::{AdapterType, CompletionRequest, CompletionResponse, HealthStatus};
use tracing::info;

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, ResponseContentBlock};

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    pub fn new(config: &ReplyflowConfig) -> Result<Self, ReplyflowError> {
        let api_key = resolve_api_key(&config.anthropic.api_key)?;
        let client = AnthropicClient::new(
            api_key,
            config.anthropic.api_version.clone(),
            config.anthropic.model.clone(),
        )?;

        info!(model = %config.anthropic.model, "Anthropic provider initialized");

        Ok(Self {
            client,
            max_tokens: config.anthropic.max_tokens,
        })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: AnthropicClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    fn to_message_request(&self, request: &CompletionRequest) -> MessageRequest {
        MessageRequest {
            model: self.client.model().to_string(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            system: Some(request.system.clone()),
            max_tokens: request.max_tokens.min(self.max_tokens),
            temperature: Some(request.temperature),
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError> {
        // A full check would make a lightweight API call, but we avoid
        // consuming tokens on health checks.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ReplyflowError> {
        let api_request = self.to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        let text = response
            .content
            .iter()
            .map(|block| match block {
                ResponseContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse { text })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &str) -> Result<String, ReplyflowError> {
    if !config_key.is_empty() {
        return Ok(config_key.to_string());
    }

    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        ReplyflowError::Config(
            "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_provider(base_url: &str) -> AnthropicProvider {
        let client = AnthropicClient::new(
            "test-key".into(),
            "2023-06-01".into(),
            "claude-sonnet-4-20250514".into(),
        )
        .unwrap()
        .with_base_url(base_url.to_string());
        AnthropicProvider::with_client(client, 512)
    }

    fn completion_request() -> CompletionRequest {
        CompletionRequest {
            system: "You write review replies.".into(),
            prompt: "Write a reply for this review.".into(),
            temperature: 0.7,
            max_tokens: 512,
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key("sk-test-123").unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let result = resolve_api_key("");
        // Will succeed only when ANTHROPIC_API_KEY is set in the test env.
        if let Err(e) = result {
            assert!(e.to_string().contains("API key not found"));
        }
    }

    #[test]
    fn message_request_carries_prompt_and_temperature() {
        let provider = test_provider("http://unused.test");
        let api_req = provider.to_message_request(&completion_request());
        assert_eq!(api_req.model, "claude-sonnet-4-20250514");
        assert_eq!(api_req.messages.len(), 1);
        assert_eq!(api_req.messages[0].role, "user");
        assert_eq!(api_req.system.as_deref(), Some("You write review replies."));
        assert_eq!(api_req.temperature, Some(0.7));
    }

    #[test]
    fn max_tokens_is_capped_by_config() {
        let provider = test_provider("http://unused.test");
        let mut request = completion_request();
        request.max_tokens = 4096;
        let api_req = provider.to_message_request(&request);
        assert_eq!(api_req.max_tokens, 512);
    }

    #[tokio::test]
    async fn complete_concatenates_text_blocks() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Hi Jordan, "},
                {"type": "text", "text": "thanks for coming in!"}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 9}
        });
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(
                serde_json::json!({"system": "You write review replies."}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let response = provider.complete(completion_request()).await.unwrap();
        assert_eq!(response.text, "Hi Jordan, thanks for coming in!");
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = test_provider("http://unused.test");
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }
}
