use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{ChatRequest, Provider, ProviderCompleteResponse};
use super::errors::ProviderError;
use super::utils::{emit_debug_trace, get_model, get_usage, handle_response};

pub const OPEN_AI_DEFAULT_HOST: &str = "https://api.openai.com";

#[derive(Debug)]
pub struct OpenAiProvider {
    client: Client,
    host: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key: api_key.into(),
        })
    }

    async fn post(&self, payload: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await?;

        handle_response(payload, response).await
    }

    /// The system prompt already leads the message list, so it is sent as-is
    fn create_request(request: &ChatRequest) -> Value {
        json!({
            "model": request.model,
            "messages": request.messages,
        })
    }

    fn response_to_text(response: &Value) -> Result<String, ProviderError> {
        response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::ResponseParseError(
                    "missing choices[0].message.content in response".to_string(),
                )
            })
    }
}

fn api_error_to_provider_error(error: &Value) -> ProviderError {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();
    match error.get("code").and_then(|c| c.as_str()) {
        Some("context_length_exceeded") => ProviderError::ContextLengthExceeded(message),
        _ => ProviderError::RequestFailed(format!("OpenAI API error: {}", error)),
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
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

        if let Some(error) = response.get("error") {
            return Err(api_error_to_provider_error(error));
        }

        let text = Self::response_to_text(&response)?;
        let usage = get_usage(&response, "prompt_tokens", "completion_tokens");
        let model = get_model(&response);
        emit_debug_trace(&payload, &response, &usage);
        Ok(ProviderCompleteResponse::new(text, model, usage))
    }
}
