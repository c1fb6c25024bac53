use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::base::{ChatRequest, Provider, ProviderCompleteResponse, Usage};
use super::errors::ProviderError;

/// A mock provider that returns pre-configured responses and records every request
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<String, ProviderError>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Create a mock whose calls resolve to the given results, in order
    pub fn with_results(results: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(results.into_iter().collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that fails its first call with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self::with_results([Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        request: &ChatRequest,
    ) -> Result<ProviderCompleteResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut responses = self.responses.lock().unwrap();
        // Return empty text if no more pre-configured responses
        let next = if responses.is_empty() {
            Ok(String::new())
        } else {
            responses.remove(0)
        };

        next.map(|text| {
            ProviderCompleteResponse::new(
                text,
                request.model.clone(),
                Usage::new(Some(1), Some(1), Some(2)),
            )
        })
    }
}
