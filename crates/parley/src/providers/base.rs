use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::ProviderError;
use crate::message::Message;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// A fully assembled chat request, ready for an adapter to translate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    /// The system instructions, also present as the leading entry of `messages`
    pub system: String,
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCompleteResponse {
    pub text: String,
    pub model: String,
    pub usage: Usage,
}

impl ProviderCompleteResponse {
    pub fn new(text: String, model: String, usage: Usage) -> Self {
        Self { text, model, usage }
    }
}

/// Base trait for AI providers (OpenAI, Anthropic, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Issue a chat completion for the assembled request
    ///
    /// # Arguments
    /// * `request` - model, system instructions and the dispatch message list.
    ///   The message list starts with a system entry; adapters whose API takes
    ///   the system prompt out-of-band must drop it.
    ///
    /// # Errors
    /// ProviderError
    ///   - `InvalidRequest` must be raised for request-validation rejections
    ///     since the orchestrator answers those differently
    async fn complete(
        &self,
        request: &ChatRequest,
    ) -> Result<ProviderCompleteResponse, ProviderError>;
}
