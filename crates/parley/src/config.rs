use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reply::{DEFAULT_GOODBYE_MESSAGE, DEFAULT_MAX_TOKENS};

pub const DEFAULT_MAX_INTERACTIONS: usize = 50;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Error parsing config file: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Bot configuration loaded from YAML. Section order is kept as written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BotConfig {
    /// Platform name to the model identifiers offered for it
    #[serde(default)]
    pub gai_models: IndexMap<String, Vec<String>>,
    /// Prompt key to bot instruction text
    #[serde(default)]
    pub gai_prompt: IndexMap<String, String>,
    /// Greeting key to first-message text
    #[serde(default)]
    pub first_consented_message: IndexMap<String, String>,
    /// Model identifier to word budget
    #[serde(default)]
    pub max_tokens: HashMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interactions: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goodbye_message: Option<String>,
}

impl BotConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Every configured `(platform, model)` pair, in file order
    pub fn list_available_models(&self) -> Vec<(String, String)> {
        self.gai_models
            .iter()
            .flat_map(|(platform, models)| {
                models
                    .iter()
                    .map(move |model| (platform.clone(), model.clone()))
            })
            .collect()
    }

    pub fn max_tokens_for(&self, model: &str) -> usize {
        self.max_tokens
            .get(model)
            .copied()
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn max_interactions(&self) -> usize {
        self.max_interactions.unwrap_or(DEFAULT_MAX_INTERACTIONS)
    }

    pub fn goodbye_message(&self) -> &str {
        self.goodbye_message
            .as_deref()
            .unwrap_or(DEFAULT_GOODBYE_MESSAGE)
    }
}

/// Substitute `{name}` placeholders for the given names. Templates without a
/// `{` are returned untouched, as are placeholders not in `values`.
pub fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    values
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}
