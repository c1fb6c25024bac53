pub mod anthropic;
pub mod base;
pub mod errors;
pub mod mock;
pub mod openai;
pub mod registry;
pub mod utils;

pub use base::{ChatRequest, Provider, ProviderCompleteResponse, Usage};
pub use errors::ProviderError;
pub use registry::{Platform, ProviderRegistry, RegistryError};
