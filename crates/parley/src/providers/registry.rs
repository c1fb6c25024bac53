use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::anthropic::AnthropicProvider;
use super::base::Provider;
use super::openai::OpenAiProvider;
use crate::credentials::{Credentials, ANTHROPIC_API_KEY, OPENAI_API_KEY};

/// The LLM provider families an adapter exists for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    OpenAi,
    Claude,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::OpenAi, Platform::Claude];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::OpenAi => "openai",
            Platform::Claude => "claude",
        }
    }

    /// Environment variable holding this platform's API key
    pub fn credential_var(&self) -> &'static str {
        match self {
            Platform::OpenAi => OPENAI_API_KEY,
            Platform::Claude => ANTHROPIC_API_KEY,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Platform::OpenAi),
            "claude" | "anthropic" => Ok(Platform::Claude),
            _ => Err(RegistryError::UnsupportedPlatform(s.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown GAI platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{platform} client not initialized. Check {var} in .env", var = .platform.credential_var())]
    MissingCredential { platform: Platform },
}

/// Provider clients keyed by platform, built once at startup and shared read-only
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Platform, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one client per platform whose credential is present.
    /// A client that fails to build leaves its platform unregistered.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let mut registry = Self::new();

        if let Some(api_key) = &credentials.openai_api_key {
            match OpenAiProvider::new(&credentials.openai_host, api_key) {
                Ok(provider) => {
                    info!("OpenAI client initialized successfully");
                    registry.insert(Platform::OpenAi, Arc::new(provider));
                }
                Err(e) => warn!("Failed to initialize OpenAI client: {}", e),
            }
        }

        if let Some(api_key) = &credentials.anthropic_api_key {
            match AnthropicProvider::new(&credentials.anthropic_host, api_key) {
                Ok(provider) => {
                    info!("Anthropic client initialized successfully");
                    registry.insert(Platform::Claude, Arc::new(provider));
                }
                Err(e) => warn!("Failed to initialize Anthropic client: {}", e),
            }
        }

        registry
    }

    pub fn with_provider(mut self, platform: Platform, provider: Arc<dyn Provider>) -> Self {
        self.insert(platform, provider);
        self
    }

    fn insert(&mut self, platform: Platform, provider: Arc<dyn Provider>) {
        self.providers.insert(platform, provider);
    }

    pub fn is_available(&self, platform: Platform) -> bool {
        self.providers.contains_key(&platform)
    }

    /// Platforms with a live client, in declaration order
    pub fn available_platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.is_available(*p))
            .collect()
    }

    /// Resolve a platform name to its client
    pub fn get(&self, platform: &str) -> Result<(Platform, Arc<dyn Provider>), RegistryError> {
        let platform = platform.parse::<Platform>()?;
        self.providers
            .get(&platform)
            .cloned()
            .map(|provider| (platform, provider))
            .ok_or(RegistryError::MissingCredential { platform })
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("platforms", &self.available_platforms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("openai".parse::<Platform>(), Ok(Platform::OpenAi));
        assert_eq!("Claude".parse::<Platform>(), Ok(Platform::Claude));
        assert_eq!("anthropic".parse::<Platform>(), Ok(Platform::Claude));
        assert_eq!(
            "gemini".parse::<Platform>(),
            Err(RegistryError::UnsupportedPlatform("gemini".to_string()))
        );
    }

    #[test]
    fn test_from_credentials_registers_only_configured_platforms() {
        let registry =
            ProviderRegistry::from_credentials(&Credentials::default().with_anthropic_key("key"));
        assert!(registry.is_available(Platform::Claude));
        assert!(!registry.is_available(Platform::OpenAi));
        assert_eq!(registry.available_platforms(), vec![Platform::Claude]);
    }

    #[test]
    fn test_empty_credentials_register_nothing() {
        let registry = ProviderRegistry::from_credentials(&Credentials::default());
        assert!(registry.available_platforms().is_empty());
    }

    #[test]
    fn test_get_reports_missing_credential_and_unknown_platform() {
        let registry = ProviderRegistry::new()
            .with_provider(Platform::OpenAi, Arc::new(MockProvider::default()));

        let (platform, _) = registry.get("openai").unwrap();
        assert_eq!(platform, Platform::OpenAi);

        let err = registry.get("claude").err().unwrap();
        assert_eq!(
            err,
            RegistryError::MissingCredential {
                platform: Platform::Claude
            }
        );
        assert_eq!(
            err.to_string(),
            "claude client not initialized. Check ANTHROPIC_API_KEY in .env"
        );

        assert!(matches!(
            registry.get("llama"),
            Err(RegistryError::UnsupportedPlatform(_))
        ));
    }
}
