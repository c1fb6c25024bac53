use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{ChatRequest, Provider, ProviderCompleteResponse};
use super::errors::ProviderError;
use super::utils::{emit_debug_trace, get_model, get_usage, handle_response};
use crate::message::{Message, Role};

pub const ANTHROPIC_DEFAULT_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
/// Output cap sent with every request
pub const ANTHROPIC_MAX_TOKENS: u32 = 1024;

#[derive(Debug)]
pub struct AnthropicProvider {
    client: Client,
    host: String,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key: api_key.into(),
        })
    }

    /// The Messages API takes the system prompt as a top-level field and
    /// rejects system-role entries in the list
    fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .filter(|message| message.role != Role::System)
            .map(|message| {
                json!({
                    "role": message.role.as_str(),
                    "content": message.content,
                })
            })
            .collect()
    }

    fn create_request(request: &ChatRequest) -> Value {
        json!({
            "model": request.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "system": request.system,
            "messages": Self::messages_to_anthropic_spec(&request.messages),
        })
    }

    fn parse_anthropic_response(response: &Value) -> Result<String, ProviderError> {
        let content_blocks = response
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                ProviderError::ResponseParseError(
                    "Invalid response format: missing content array".to_string(),
                )
            })?;

        content_blocks
            .iter()
            .find(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
            .and_then(|block| block.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::ResponseParseError("no text block in response content".to_string())
            })
    }

    async fn post(&self, payload: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}/v1/messages", self.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(payload)
            .send()
            .await?;

        handle_response(payload, response).await
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    #[tracing::instrument(
        skip(self, request),
        fields(model = %request.model, messages = request.messages.len())
    )]
    async fn complete(
        &self,
        request: &ChatRequest,
    ) -> Result<ProviderCompleteResponse, ProviderError> {
        let payload = Self::create_request(request);

        let response = self.post(&payload).await?;

        let text = Self::parse_anthropic_response(&response)?;
        let usage = get_usage(&response, "input_tokens", "output_tokens");
        let model = get_model(&response);
        emit_debug_trace(&payload, &response, &usage);
        Ok(ProviderCompleteResponse::new(text, model, usage))
    }
}
