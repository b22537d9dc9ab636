//! Gateway failures and their JSON rendering.
//!
//! Every failure leaves the gateway as `{ "error": <summary>, "details": <detail> }`
//! with a status chosen by [`GatewayError::status_code`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server holds no credential for the upstream.
    #[error("{service} credential not configured: {reason}")]
    MissingCredential { service: &'static str, reason: String },

    /// The client sent a body the gateway cannot forward.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream could not be reached.
    #[error("Connection to {service} failed: {source}")]
    Connection {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream did not answer within the gateway timeout.
    #[error("{service} did not answer within {duration}s")]
    Timeout { service: &'static str, duration: u64 },

    /// The upstream answered with a non-success status.
    #[error("{service} returned {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The upstream answered 2xx with something that is not JSON.
    #[error("{service} sent an unreadable body: {reason}")]
    BadUpstreamBody { service: &'static str, reason: String },
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingCredential { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Connection { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::BadUpstreamBody { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short summary used as the `error` field.
    pub fn summary(&self) -> &'static str {
        match self {
            GatewayError::MissingCredential { .. } => "Server is not configured",
            GatewayError::InvalidRequest(_) => "Invalid request",
            GatewayError::Connection { .. } => "Upstream unreachable",
            GatewayError::Timeout { .. } => "Upstream timed out",
            GatewayError::Upstream { .. } => "Upstream request failed",
            GatewayError::BadUpstreamBody { .. } => "Upstream response unreadable",
        }
    }

    /// Text used as the `details` field.
    pub fn details(&self) -> String {
        match self {
            GatewayError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Gateway request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Gateway request rejected");
        }
        let body = serde_json::json!({
            "error": self.summary(),
            "details": self.details(),
        });
        (status, Json(body)).into_response()
    }
}
