mod credentials;
mod loader;
mod store;
mod types;

pub use credentials::{
    CredentialStatus, SecureString, CHAT_API_KEY_ENV, NEWS_API_KEY_ENV,
};
pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{default_relays, ChatConfig, Config, GatewayConfig, NewsConfig, RelayProxy};
