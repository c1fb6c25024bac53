pub mod config;
pub mod credentials;
pub mod message;
pub mod providers;
pub mod reply;

pub use config::BotConfig;
pub use credentials::Credentials;
pub use message::{Message, Role};
pub use providers::{Platform, ProviderRegistry};
pub use reply::{FailureKind, ReplyOrchestrator, ReplyOutcome, ReplyRequest};
