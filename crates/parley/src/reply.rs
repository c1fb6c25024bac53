//! Reply orchestration: interaction limits, budget truncation and dispatch.
//!
//! Every path through [`ReplyOrchestrator::reply`] ends in a [`ReplyOutcome`]
//! whose text is safe to show as conversation content. Provider error bodies
//! are logged, never returned.

use tracing::{debug, error, warn};

use crate::message::{word_count, Message};
use crate::providers::registry::{Platform, ProviderRegistry, RegistryError};
use crate::providers::ChatRequest;

/// Budget used when the configuration has no entry for a model
pub const DEFAULT_MAX_TOKENS: usize = 7000;

pub const DEFAULT_GOODBYE_MESSAGE: &str = "Thank you for the conversation.";
pub const TOO_LONG_MESSAGE: &str =
    "I'm sorry, but your response is too long. Can you try something shorter?";
pub const ERROR_OCCURRED_MESSAGE: &str = "Error occurred.";
pub const INVALID_REQUEST_MESSAGE: &str =
    "I can't figure out how to respond to your message. Could you try again?";
pub const PROVIDER_FAILURE_MESSAGE: &str =
    "I encountered an error and can't figure out how to respond to your message. Could you try again?";

/// Appended to the instructions once for every message dropped from the front
pub const CONTINUATION_CLAUSE: &str = " You are in the middle of a conversation with the user.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The platform is known but no client was configured for it
    MissingCredential(Platform),
    UnsupportedPlatform(String),
    /// The provider rejected the request as invalid
    InvalidRequest,
    /// Network, auth, rate limit, server or response-parsing failure
    ProviderFailure,
}

impl From<RegistryError> for FailureKind {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::UnsupportedPlatform(name) => FailureKind::UnsupportedPlatform(name),
            RegistryError::MissingCredential { platform } => {
                FailureKind::MissingCredential(platform)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The interaction ceiling was passed
    Goodbye(String),
    /// A single remaining message is over budget on its own
    TooLong,
    Generated(String),
    Failed(FailureKind),
}

impl ReplyOutcome {
    /// Displayable text for this outcome
    pub fn text(&self) -> &str {
        match self {
            ReplyOutcome::Goodbye(text) | ReplyOutcome::Generated(text) => text,
            ReplyOutcome::TooLong => TOO_LONG_MESSAGE,
            ReplyOutcome::Failed(
                FailureKind::MissingCredential(_) | FailureKind::UnsupportedPlatform(_),
            ) => ERROR_OCCURRED_MESSAGE,
            ReplyOutcome::Failed(FailureKind::InvalidRequest) => INVALID_REQUEST_MESSAGE,
            ReplyOutcome::Failed(FailureKind::ProviderFailure) => PROVIDER_FAILURE_MESSAGE,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ReplyOutcome::Goodbye(text) | ReplyOutcome::Generated(text) => text,
            other => other.text().to_string(),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, ReplyOutcome::Generated(_))
    }
}

impl std::fmt::Display for ReplyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Inputs for one reply. The interaction limit only applies when both
/// `max_interactions` and `conversation_length` are set and non-zero.
#[derive(Debug, Clone)]
pub struct ReplyRequest<'a> {
    pub messages: &'a [Message],
    pub bot_instructions: &'a str,
    pub platform: &'a str,
    pub model: &'a str,
    pub max_tokens: usize,
    pub max_interactions: Option<usize>,
    pub goodbye_message: Option<&'a str>,
    pub conversation_length: Option<usize>,
}

impl<'a> ReplyRequest<'a> {
    pub fn new(
        messages: &'a [Message],
        bot_instructions: &'a str,
        platform: &'a str,
        model: &'a str,
    ) -> Self {
        Self {
            messages,
            bot_instructions,
            platform,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_interactions: None,
            goodbye_message: None,
            conversation_length: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_interaction_limit(
        mut self,
        max_interactions: usize,
        goodbye_message: Option<&'a str>,
    ) -> Self {
        self.max_interactions = Some(max_interactions);
        self.goodbye_message = goodbye_message;
        self
    }

    pub fn with_conversation_length(mut self, conversation_length: usize) -> Self {
        self.conversation_length = Some(conversation_length);
        self
    }
}

/// What to do with a request once limits and budget have been applied
#[derive(Debug, PartialEq, Eq)]
enum Plan<'a> {
    Goodbye,
    TooLong,
    Dispatch {
        instructions: String,
        messages: &'a [Message],
        dropped: usize,
    },
}

/// Approximate request size: words in the instructions plus words in every message.
pub fn estimate_size(bot_instructions: &str, messages: &[Message]) -> usize {
    word_count(bot_instructions) + messages.iter().map(Message::word_count).sum::<usize>()
}

fn interactions_exhausted(
    max_interactions: Option<usize>,
    conversation_length: Option<usize>,
) -> bool {
    matches!(
        (max_interactions, conversation_length),
        (Some(max), Some(length)) if max > 0 && length > max
    )
}

fn plan<'a>(request: &ReplyRequest<'a>) -> Plan<'a> {
    let mut messages = request.messages;
    let mut instructions = request.bot_instructions.to_string();
    let mut conversation_length = request.conversation_length;
    let mut dropped = 0;

    loop {
        if interactions_exhausted(request.max_interactions, conversation_length) {
            return Plan::Goodbye;
        }

        let size = estimate_size(&instructions, messages);
        if size <= request.max_tokens {
            break;
        }
        if messages.len() <= 1 {
            return Plan::TooLong;
        }

        debug!(
            size,
            max_tokens = request.max_tokens,
            "conversation over budget, dropping oldest message"
        );
        messages = &messages[1..];
        instructions.push_str(CONTINUATION_CLAUSE);
        conversation_length = conversation_length.map(|length| length.saturating_sub(1));
        dropped += 1;
    }

    Plan::Dispatch {
        instructions,
        messages,
        dropped,
    }
}

/// Routes replies to the provider clients held by a [`ProviderRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct ReplyOrchestrator<'r> {
    registry: &'r ProviderRegistry,
}

impl<'r> ReplyOrchestrator<'r> {
    pub fn new(registry: &'r ProviderRegistry) -> Self {
        Self { registry }
    }

    pub async fn reply(&self, request: &ReplyRequest<'_>) -> ReplyOutcome {
        match plan(request) {
            Plan::Goodbye => ReplyOutcome::Goodbye(
                request
                    .goodbye_message
                    .unwrap_or(DEFAULT_GOODBYE_MESSAGE)
                    .to_string(),
            ),
            Plan::TooLong => ReplyOutcome::TooLong,
            Plan::Dispatch {
                instructions,
                messages,
                dropped,
            } => {
                if dropped > 0 {
                    warn!(
                        dropped,
                        max_tokens = request.max_tokens,
                        "Conversation history exceeded the budget. Dropped oldest messages."
                    );
                }
                self.dispatch(request, instructions, messages).await
            }
        }
    }

    /// Same as [`reply`](Self::reply), reduced to the displayable text
    pub async fn reply_text(&self, request: &ReplyRequest<'_>) -> String {
        self.reply(request).await.into_text()
    }

    async fn dispatch(
        &self,
        request: &ReplyRequest<'_>,
        instructions: String,
        working: &[Message],
    ) -> ReplyOutcome {
        let mut messages = Vec::with_capacity(working.len() + 1);
        messages.push(Message::system(instructions.as_str()));
        messages.extend_from_slice(working);
        let chat = ChatRequest::new(request.model, instructions, messages);

        let (platform, provider) = match self.registry.get(request.platform) {
            Ok(found) => found,
            Err(e) => {
                error!("{}", e);
                return ReplyOutcome::Failed(e.into());
            }
        };

        match provider.complete(&chat).await {
            Ok(response) => ReplyOutcome::Generated(response.text),
            Err(e) if e.is_validation() => {
                warn!(
                    "Got a validation error for {:?}. Error is {}",
                    chat.messages, e
                );
                ReplyOutcome::Failed(FailureKind::InvalidRequest)
            }
            Err(e) => {
                error!("Error calling {} API: {}", platform, e);
                ReplyOutcome::Failed(FailureKind::ProviderFailure)
            }
        }
    }
}
