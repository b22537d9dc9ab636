//! Route table and request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{CredentialStatus, ConfigStore};
use crate::gateway::error::GatewayError;
use crate::gateway::upstream::{UpstreamClient, UpstreamReply};
use crate::news::params::{encode_pairs, Mode};

#[derive(Clone)]
pub struct GatewayState {
    config: ConfigStore,
    upstream: Arc<UpstreamClient>,
}

impl GatewayState {
    pub fn new(config: ConfigStore, upstream: UpstreamClient) -> Self {
        Self {
            config,
            upstream: Arc::new(upstream),
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/news", post(news))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: "newsdesk",
    })
}

async fn chat(
    State(state): State<GatewayState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request_id = Uuid::new_v4();
    let Json(mut body) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;

    let has_messages = body
        .get("messages")
        .and_then(Value::as_array)
        .is_some_and(|m| !m.is_empty());
    if !has_messages {
        return Err(GatewayError::InvalidRequest(
            "messages must be a non-empty array".to_string(),
        ));
    }

    let chat = state.config.get().chat;
    let key = match chat.resolve_credential() {
        CredentialStatus::Configured(key) => key,
        CredentialStatus::Unconfigured { reason } => {
            return Err(GatewayError::MissingCredential {
                service: "chat",
                reason,
            })
        }
    };

    if let Some(obj) = body.as_object_mut() {
        obj.entry("model")
            .or_insert_with(|| Value::String(chat.model.clone()));
    }

    let url = format!("{}/chat/completions", chat.base_url.trim_end_matches('/'));
    tracing::info!(%request_id, model = ?body.get("model"), "Forwarding chat completion");
    let reply = state
        .upstream
        .post_json("chat", &url, key.expose(), &body)
        .await?;
    Ok(pass_through(reply))
}

#[derive(Debug, Deserialize)]
struct NewsRequest {
    endpoint: String,
    #[serde(default)]
    params: Map<String, Value>,
}

async fn news(
    State(state): State<GatewayState>,
    body: Result<Json<NewsRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request_id = Uuid::new_v4();
    let Json(request) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;

    let mode = match request.endpoint.as_str() {
        "top-headlines" => Mode::TopHeadlines,
        "everything" => Mode::Everything,
        other => {
            return Err(GatewayError::InvalidRequest(format!(
                "unknown endpoint '{}'",
                other
            )))
        }
    };
    let pairs = query_pairs(&request.params)?;

    let news = state.config.get().news;
    let key = match news.resolve_credential() {
        CredentialStatus::Configured(key) => key,
        CredentialStatus::Unconfigured { reason } => {
            return Err(GatewayError::MissingCredential {
                service: "news",
                reason,
            })
        }
    };

    let mut query = encode_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str("apiKey=");
    query.push_str(&urlencoding::encode(key.expose()));
    let url = format!(
        "{}/{}?{}",
        news.base_url.trim_end_matches('/'),
        mode.endpoint(),
        query
    );

    tracing::info!(%request_id, endpoint = mode.endpoint(), params = pairs.len(), "Forwarding news request");
    let reply = state.upstream.get_json("news", &url).await?;
    Ok(pass_through(reply))
}

/// Flatten scalar params into query pairs. A client-supplied `apiKey` is
/// dropped; nulls are skipped; nested values are rejected.
fn query_pairs(params: &Map<String, Value>) -> Result<Vec<(String, String)>, GatewayError> {
    let mut pairs = Vec::with_capacity(params.len());
    for (name, value) in params {
        if name.eq_ignore_ascii_case("apikey") {
            continue;
        }
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(GatewayError::InvalidRequest(format!(
                    "param '{}' must be a string, number or boolean",
                    name
                )))
            }
        };
        pairs.push((name.clone(), value));
    }
    Ok(pairs)
}

fn pass_through(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    (status, Json(reply.body)).into_response()
}
