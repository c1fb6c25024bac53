use anyhow::Result;
use parley::credentials::Credentials;
use parley::reply::{INVALID_REQUEST_MESSAGE, PROVIDER_FAILURE_MESSAGE};
use parley::{Message, ProviderRegistry, ReplyOrchestrator, ReplyOutcome, ReplyRequest};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INSTRUCTIONS: &str = "You are a friendly research assistant.";

fn history() -> Vec<Message> {
    vec![
        Message::assistant("Hi! Would you like to talk about your comment?"),
        Message::user("Yes, I have a few thoughts."),
    ]
}

fn credentials_for(server: &MockServer) -> Credentials {
    let mut credentials = Credentials::default()
        .with_openai_key("sk-test")
        .with_anthropic_key("ant-test");
    credentials.openai_host = server.uri();
    credentials.anthropic_host = server.uri();
    credentials
}

#[tokio::test]
async fn openai_round_trip_sends_system_first() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": INSTRUCTIONS},
                {"role": "assistant", "content": "Hi! Would you like to talk about your comment?"},
                {"role": "user", "content": "Yes, I have a few thoughts."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o",
            "choices": [{"message": {"role": "assistant", "content": "Go ahead!"}}],
            "usage": {"prompt_tokens": 30, "completion_tokens": 2, "total_tokens": 32}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::from_credentials(&credentials_for(&server));
    let messages = history();
    let request = ReplyRequest::new(&messages, INSTRUCTIONS, "openai", "gpt-4o");

    let outcome = ReplyOrchestrator::new(&registry).reply(&request).await;
    assert_eq!(outcome, ReplyOutcome::Generated("Go ahead!".to_string()));
    Ok(())
}

#[tokio::test]
async fn claude_round_trip_sends_system_out_of_band() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_json(json!({
            "model": "claude-sonnet-4-5",
            "max_tokens": 1024,
            "system": INSTRUCTIONS,
            "messages": [
                {"role": "assistant", "content": "Hi! Would you like to talk about your comment?"},
                {"role": "user", "content": "Yes, I have a few thoughts."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "claude-sonnet-4-5",
            "content": [{"type": "text", "text": "I'm listening."}],
            "usage": {"input_tokens": 30, "output_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::from_credentials(&credentials_for(&server));
    let messages = history();
    let request = ReplyRequest::new(&messages, INSTRUCTIONS, "claude", "claude-sonnet-4-5");

    let text = ReplyOrchestrator::new(&registry).reply_text(&request).await;
    assert_eq!(text, "I'm listening.");
    Ok(())
}

#[tokio::test]
async fn provider_errors_become_sanitized_text() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "secret upstream detail", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::from_credentials(&credentials_for(&server));
    let orchestrator = ReplyOrchestrator::new(&registry);
    let messages = history();

    let openai_request = ReplyRequest::new(&messages, INSTRUCTIONS, "openai", "gpt-4o");
    let openai = orchestrator.reply_text(&openai_request).await;
    assert_eq!(openai, INVALID_REQUEST_MESSAGE);
    assert!(!openai.contains("secret upstream detail"));

    let claude = orchestrator
        .reply_text(&ReplyRequest::new(
            &messages,
            INSTRUCTIONS,
            "claude",
            "claude-sonnet-4-5",
        ))
        .await;
    assert_eq!(claude, PROVIDER_FAILURE_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn unreachable_host_is_generic_failure() {
    let mut credentials = Credentials::default().with_openai_key("sk-test");
    credentials.openai_host = "http://127.0.0.1:9".to_string();
    let registry = ProviderRegistry::from_credentials(&credentials);
    let messages = history();

    let request = ReplyRequest::new(&messages, INSTRUCTIONS, "openai", "gpt-4o");
    let orchestrator = ReplyOrchestrator::new(&registry);
    let text = orchestrator.reply_text(&request).await;
    assert_eq!(text, PROVIDER_FAILURE_MESSAGE);
}
