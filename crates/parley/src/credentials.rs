use std::env;
use std::fmt;

use crate::providers::anthropic::ANTHROPIC_DEFAULT_HOST;
use crate::providers::openai::OPEN_AI_DEFAULT_HOST;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_HOST: &str = "OPENAI_HOST";
pub const ANTHROPIC_HOST: &str = "ANTHROPIC_HOST";

/// Provider credentials resolved once at process start
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_host: String,
    pub anthropic_host: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            openai_host: OPEN_AI_DEFAULT_HOST.to_string(),
            anthropic_host: ANTHROPIC_DEFAULT_HOST.to_string(),
        }
    }
}

impl Credentials {
    /// Read credentials from the environment, loading a `.env` file first if one exists
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_process_env()
    }

    /// Read credentials from the current process environment only
    pub fn from_process_env() -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: non_empty_var(OPENAI_API_KEY),
            anthropic_api_key: non_empty_var(ANTHROPIC_API_KEY),
            openai_host: non_empty_var(OPENAI_HOST).unwrap_or(defaults.openai_host),
            anthropic_host: non_empty_var(ANTHROPIC_HOST).unwrap_or(defaults.anthropic_host),
        }
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_anthropic_key(mut self, key: impl Into<String>) -> Self {
        self.anthropic_api_key = Some(key.into());
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn redact(key: &Option<String>) -> &'static str {
    if key.is_some() {
        "<set>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("openai_host", &self.openai_host)
            .field("anthropic_host", &self.anthropic_host)
            .finish()
    }
}
