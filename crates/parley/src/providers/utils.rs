use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::base::Usage;
use super::errors::ProviderError;

// Maps a non-ok response status to a ProviderError
pub async fn non_ok_response_to_provider_error(
    payload: &Value,
    response: Response,
) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::InvalidRequest(format!("Status: {}. Response: {}", status, body))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Authentication(format!("Authentication failed. Please ensure your API keys are valid and have the required permissions. \
                Status: {}. Response: {}", status, body))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::RateLimitExceeded(format!("Rate limit exceeded. Please retry after some time. Status: {}", status))
        }
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => {
            ProviderError::ServerError(format!("Server error occurred. Status: {}", status))
        }
        _ => {
            debug!(
                "Provider request failed with status: {}. Body: {}. Payload: {}",
                status, body, payload
            );
            ProviderError::RequestFailed(format!("Request failed with status: {}.", status))
        }
    }
}

pub async fn handle_response(payload: &Value, response: Response) -> Result<Value, ProviderError> {
    match response.status() {
        StatusCode::OK => response
            .json()
            .await
            .map_err(|e| ProviderError::ResponseParseError(e.to_string())),
        _ => Err(non_ok_response_to_provider_error(payload, response).await),
    }
}

/// Extract the model name from a JSON object. Common with most providers to have this top level attribute.
pub fn get_model(data: &Value) -> String {
    data.get("model")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown")
        .to_string()
}

/// Read a `usage` block whose input and output counters live under the given keys
pub fn get_usage(data: &Value, input_key: &str, output_key: &str) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };
    let read = |key: &str| usage.get(key).and_then(|v| v.as_u64()).map(|v| v as i32);

    let input_tokens = read(input_key);
    let output_tokens = read(output_key);
    let total_tokens = read("total_tokens").or(match (input_tokens, output_tokens) {
        (Some(i), Some(o)) => Some(i + o),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

pub fn emit_debug_trace(payload: &Value, response: &Value, usage: &Usage) {
    debug!(
        input = %serde_json::to_string_pretty(payload).unwrap_or_default(),
        output = %serde_json::to_string_pretty(response).unwrap_or_default(),
        input_tokens = ?usage.input_tokens.unwrap_or_default(),
        output_tokens = ?usage.output_tokens.unwrap_or_default(),
        total_tokens = ?usage.total_tokens.unwrap_or_default(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_model() {
        assert_eq!(get_model(&json!({"model": "gpt-4o"})), "gpt-4o");
        assert_eq!(get_model(&json!({"model": 3})), "Unknown");
        assert_eq!(get_model(&json!({})), "Unknown");
    }

    #[test]
    fn test_get_usage_openai_shape() {
        let data = json!({
            "usage": {"prompt_tokens": 12, "completion_tokens": 15, "total_tokens": 27}
        });
        let usage = get_usage(&data, "prompt_tokens", "completion_tokens");
        assert_eq!(usage, Usage::new(Some(12), Some(15), Some(27)));
    }

    #[test]
    fn test_get_usage_derives_total() {
        let data = json!({"usage": {"input_tokens": 3, "output_tokens": 4}});
        let usage = get_usage(&data, "input_tokens", "output_tokens");
        assert_eq!(usage.total_tokens, Some(7));
    }

    #[test]
    fn test_get_usage_missing() {
        let usage = get_usage(&json!({}), "input_tokens", "output_tokens");
        assert_eq!(usage, Usage::default());
    }
}
