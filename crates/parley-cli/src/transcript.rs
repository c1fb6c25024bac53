use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use parley::Message;
use tracing::{error, info};

const RULE_WIDTH: usize = 80;

/// A finished test conversation and the settings that produced it
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    pub timestamp: DateTime<Local>,
    pub platform: &'a str,
    pub model: &'a str,
    pub prompt_key: &'a str,
    pub first_message_key: &'a str,
    pub system_prompt: &'a str,
    pub messages: &'a [Message],
}

impl Transcript<'_> {
    pub fn render(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        let mut out = String::new();
        out.push('\n');
        out.push_str(&format!("{}\n", heavy));
        out.push_str(&format!("Conversation at {}\n", self.timestamp.to_rfc3339()));
        out.push_str(&format!("GAI Platform: {}\n", self.platform));
        out.push_str(&format!("GAI Model: {}\n", self.model));
        out.push_str(&format!("Prompt Key: {}\n", self.prompt_key));
        out.push_str(&format!("First Consented Message Key: {}\n", self.first_message_key));
        out.push_str(&format!("{}\n\n", heavy));

        out.push_str("System Prompt:\n");
        out.push_str(&format!("{}\n\n", self.system_prompt));

        out.push_str("Conversation:\n");
        out.push_str(&format!("{}\n", light));
        for message in self.messages {
            out.push_str(&format!(
                "{}: {}\n",
                message.role.as_str().to_uppercase(),
                message.content
            ));
            out.push_str(&format!("{}\n", light));
        }
        out.push('\n');
        out
    }

    pub fn append_to(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.render().as_bytes())
    }

    /// Append to `path`, logging rather than returning failures
    pub fn save(&self, path: &Path) -> bool {
        match self.append_to(path) {
            Ok(()) => {
                info!("Conversation saved to {}", path.display());
                true
            }
            Err(e) => {
                error!("Error saving conversation: {}", e);
                false
            }
        }
    }
}
