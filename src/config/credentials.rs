//! Credential resolution from configuration and environment.
//!
//! Keys are resolved on demand and never cached, so a changed environment
//! variable is picked up by the next request.

use super::types::{ChatConfig, NewsConfig};

pub const NEWS_API_KEY_ENV: &str = "NEWSDESK_NEWS_API_KEY";
pub const CHAT_API_KEY_ENV: &str = "NEWSDESK_CHAT_API_KEY";

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to APIs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Result of resolving a credential.
#[derive(Debug, Clone)]
pub enum CredentialStatus {
    Configured(SecureString),
    Unconfigured { reason: String },
}

impl CredentialStatus {
    pub fn secret(&self) -> Option<&SecureString> {
        match self {
            CredentialStatus::Configured(secret) => Some(secret),
            CredentialStatus::Unconfigured { .. } => None,
        }
    }
}

/// Environment value wins over the inline value; empty strings count as unset.
fn resolve(env_var: &str, inline: Option<&str>) -> CredentialStatus {
    let from_env = std::env::var(env_var).ok().filter(|v| !v.trim().is_empty());
    let inline = inline.filter(|v| !v.trim().is_empty()).map(str::to_string);

    match from_env.or(inline) {
        Some(key) => CredentialStatus::Configured(SecureString::new(key)),
        None => CredentialStatus::Unconfigured {
            reason: format!("api_key is not set and {} is empty", env_var),
        },
    }
}

impl NewsConfig {
    pub fn resolve_credential(&self) -> CredentialStatus {
        resolve(NEWS_API_KEY_ENV, self.api_key.as_deref())
    }
}

impl ChatConfig {
    pub fn resolve_credential(&self) -> CredentialStatus {
        resolve(CHAT_API_KEY_ENV, self.api_key.as_deref())
    }
}
