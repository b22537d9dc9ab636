//! Failure taxonomy for news fetches.
//!
//! Every variant except [`FetchError::Cancelled`] ends up as the `error`
//! text of an Error state via [`FetchError::user_message`].

use std::time::Duration;

use thiserror::Error;

/// Failure of a single relay attempt. Triggers fallback to the next relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS, TLS or connection failure.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The attempt exceeded its own timeout.
    #[error("attempt timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The relay answered with a non-success status and no API envelope.
    #[error("relay answered HTTP {0}")]
    Status(u16),

    /// The response body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),
}

/// Errors that can end a logical fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Superseded by a newer request. Never shown to the user.
    #[error("request superseded")]
    Cancelled,

    /// Every relay in the pool failed.
    #[error("all {attempts} relay attempts failed")]
    ProxyExhausted {
        attempts: usize,
        #[source]
        last: Option<TransportError>,
    },

    /// The API answered with a structured error envelope.
    #[error("news API error ({}): {}", .code.as_deref().unwrap_or("unknown"), .message.as_deref().unwrap_or("no message"))]
    RemoteApi {
        code: Option<String>,
        message: Option<String>,
    },

    /// The payload was not a recognizable envelope.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The whole relay sequence exceeded the hard ceiling.
    #[error("hard timeout after {}ms", .after.as_millis())]
    HardTimeout { after: Duration },
}

impl FetchError {
    /// Short identifier for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Cancelled => "cancelled",
            FetchError::ProxyExhausted { .. } => "proxy_exhausted",
            FetchError::RemoteApi { .. } => "remote_api",
            FetchError::Malformed(_) => "malformed_response",
            FetchError::HardTimeout { .. } => "hard_timeout",
        }
    }

    /// Human-readable text for the Error state.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Cancelled => "The request was replaced by a newer one.".to_string(),
            FetchError::ProxyExhausted { .. } => {
                "Couldn't reach the news service through any relay. \
                 Check your internet connection, disable blockers for this page, \
                 or try again in a moment."
                    .to_string()
            }
            FetchError::RemoteApi { code, message } => match message {
                Some(message) if !message.trim().is_empty() => message.trim().to_string(),
                _ => remote_code_message(code.as_deref()),
            },
            FetchError::Malformed(_) => {
                "The news service sent a response that couldn't be read. Please try again later."
                    .to_string()
            }
            FetchError::HardTimeout { after } => format!(
                "The news service took too long to respond (gave up after {}s). Please try again.",
                after.as_secs()
            ),
        }
    }
}

fn remote_code_message(code: Option<&str>) -> String {
    match code {
        Some("apiKeyInvalid") => {
            "Your API key is invalid or has been revoked. Check the news API key in settings."
                .to_string()
        }
        Some("apiKeyMissing") => {
            "No API key was sent to the news service. Add one in settings.".to_string()
        }
        Some("apiKeyDisabled") => "Your API key has been disabled by the news service.".to_string(),
        Some("apiKeyExhausted") | Some("rateLimited") => {
            "The news service rate limit was reached. Wait a while before trying again."
                .to_string()
        }
        Some("parameterInvalid") | Some("parametersMissing") => {
            "The news service rejected the request parameters.".to_string()
        }
        Some("sourcesTooMany") | Some("sourceDoesNotExist") => {
            "The requested news source is not available.".to_string()
        }
        Some(other) => format!("The news service reported an error ({}).", other),
        None => "The news service reported an unspecified error.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_preferred_over_code() {
        let err = FetchError::RemoteApi {
            code: Some("apiKeyInvalid".into()),
            message: Some("Your key is bad.".into()),
        };
        assert_eq!(err.user_message(), "Your key is bad.");
    }

    #[test]
    fn invalid_key_fallback_mentions_key() {
        let err = FetchError::RemoteApi {
            code: Some("apiKeyInvalid".into()),
            message: None,
        };
        assert!(err.user_message().to_lowercase().contains("api key is invalid"));
    }

    #[test]
    fn unknown_code_is_named() {
        let err = FetchError::RemoteApi {
            code: Some("weird".into()),
            message: Some("  ".into()),
        };
        assert!(err.user_message().contains("weird"));
    }

    #[test]
    fn exhaustion_suggests_connectivity_check() {
        let err = FetchError::ProxyExhausted {
            attempts: 3,
            last: Some(TransportError::Status(502)),
        };
        assert!(err.user_message().contains("internet connection"));
        assert_eq!(err.kind(), "proxy_exhausted");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn hard_timeout_reports_budget() {
        let err = FetchError::HardTimeout {
            after: Duration::from_secs(15),
        };
        assert!(err.user_message().contains("15s"));
    }
}
