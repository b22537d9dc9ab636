use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tokio::time::timeout;

use crate::config::GatewayConfig;
use crate::gateway::error::GatewayError;

/// Status and JSON body of a successful upstream exchange.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

/// Shared reqwest client with the gateway's timeouts.
pub struct UpstreamClient {
    client: Client,
    request_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            request_timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    /// POST `body` as JSON with a bearer token.
    pub async fn post_json(
        &self,
        service: &'static str,
        url: &str,
        bearer: &str,
        body: &Value,
    ) -> Result<UpstreamReply, GatewayError> {
        let request = self.client.post(url).bearer_auth(bearer).json(body);
        self.execute(service, request).await
    }

    pub async fn get_json(
        &self,
        service: &'static str,
        url: &str,
    ) -> Result<UpstreamReply, GatewayError> {
        self.execute(service, self.client.get(url)).await
    }

    async fn execute(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<UpstreamReply, GatewayError> {
        match timeout(self.request_timeout, self.send(service, request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout {
                service,
                duration: self.request_timeout.as_secs(),
            }),
        }
    }

    async fn send(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<UpstreamReply, GatewayError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    GatewayError::Timeout {
                        service,
                        duration: self.request_timeout.as_secs(),
                    }
                } else {
                    GatewayError::Connection { service, source }
                }
            })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Connection { service, source })?;
        let body = serde_json::from_slice::<Value>(&bytes);

        if !(200..300).contains(&status) {
            let message = body
                .ok()
                .and_then(|v| upstream_message(&v))
                .unwrap_or_else(|| format!("{} answered HTTP {}", service, status));
            return Err(GatewayError::Upstream {
                service,
                status,
                message,
            });
        }

        let body = body.map_err(|e| GatewayError::BadUpstreamBody {
            service,
            reason: e.to_string(),
        })?;
        Ok(UpstreamReply { status, body })
    }
}

/// Error text from `{error: {message}}`, `{error: "..."}` or `{message}`.
pub fn upstream_message(body: &Value) -> Option<String> {
    let candidates = [
        body.pointer("/error/message"),
        body.get("error").filter(|v| v.is_string()),
        body.get("message"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
