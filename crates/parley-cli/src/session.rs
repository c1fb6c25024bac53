use anyhow::Result;
use parley::{Message, ReplyOrchestrator, ReplyRequest, Role};
use tracing::debug;

use crate::prompt::{InputType, Prompt};

/// Everything the conversation loop needs, resolved from config and menu choices
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub platform: String,
    pub model: String,
    pub bot_prompt: String,
    pub first_message: String,
    pub max_tokens: usize,
    pub max_interactions: usize,
    pub goodbye_message: String,
}

/// Messages exchanged so far and the number of user turns consumed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub messages: Vec<Message>,
    pub interaction_count: usize,
}

/// Run one test conversation until the user leaves or the interaction cap is hit
pub async fn run(
    prompt: &mut dyn Prompt,
    orchestrator: &ReplyOrchestrator<'_>,
    settings: &SessionSettings,
) -> Result<Conversation> {
    let mut conversation = Conversation::default();

    prompt.render(Role::Assistant, &settings.first_message);
    conversation
        .messages
        .push(Message::assistant(settings.first_message.as_str()));

    while conversation.interaction_count < settings.max_interactions {
        let input = prompt.get_input()?;
        let text = match (input.input_type, input.content) {
            (InputType::Exit, _) => {
                prompt.notice("Ending conversation...");
                break;
            }
            (InputType::Message, Some(text)) => text,
            _ => {
                prompt.notice("Please enter a message.");
                continue;
            }
        };

        conversation.messages.push(Message::user(text));
        conversation.interaction_count += 1;

        prompt.show_busy();
        let request = ReplyRequest::new(
            &conversation.messages,
            &settings.bot_prompt,
            &settings.platform,
            &settings.model,
        )
        .with_max_tokens(settings.max_tokens)
        .with_interaction_limit(
            settings.max_interactions,
            Some(settings.goodbye_message.as_str()),
        )
        .with_conversation_length(conversation.interaction_count);
        let outcome = orchestrator.reply(&request).await;
        prompt.hide_busy();

        debug!(?outcome, turn = conversation.interaction_count, "reply received");
        let reply = outcome.into_text();
        prompt.render(Role::Assistant, &reply);
        conversation.messages.push(Message::assistant(reply));

        if conversation.interaction_count >= settings.max_interactions {
            prompt.notice("Maximum interactions reached. Ending conversation.");
            break;
        }
    }

    Ok(conversation)
}
