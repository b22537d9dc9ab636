//! Shared test utilities: a scripted in-memory transport and builders.

#![allow(dead_code, unused_imports)]

pub mod mock_upstream;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use newsdesk::config::{Config, ConfigStore, RelayProxy, SecureString};
use newsdesk::news::{
    FetchOrchestrator, FetchSettings, Locale, ProxyPool, RawResponse, StateRecorder, Transport,
    TransportError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const BASE_URL: &str = "https://news.test/v2";
pub const PAGE_SIZE: u32 = 20;

/// One scripted answer.
#[derive(Debug, Clone)]
pub struct Reply {
    result: Result<RawResponse, TransportError>,
    delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            result: Ok(RawResponse {
                status,
                body: body.to_string().into_bytes(),
            }),
            delay: Duration::ZERO,
        }
    }

    /// `{status: "ok"}` envelope with `count` articles under `tag`.
    pub fn articles(tag: &str, count: usize) -> Self {
        Self::json(200, ok_envelope(tag, count))
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            result: Ok(RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(error: TransportError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub fn ok_envelope(tag: &str, count: usize) -> Value {
    let articles: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "source": { "id": null, "name": "Wire" },
                "title": format!("{} story {}", tag, i),
                "description": "desc",
                "url": format!("https://example.com/{}/{}", tag, i),
                "urlToImage": null,
                "publishedAt": "2024-05-01T12:00:00Z"
            })
        })
        .collect();
    json!({ "status": "ok", "totalResults": count, "articles": articles })
}

struct Rule {
    pattern: String,
    reply: Reply,
    remaining: Option<usize>,
}

/// Transport answering from rules matched by URL substring, in insertion
/// order. Unmatched URLs fail with a connection error.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every URL containing `pattern` with `reply`.
    pub fn on(&self, pattern: &str, reply: Reply) {
        self.push(pattern, reply, None);
    }

    /// Answer the next URL containing `pattern` with `reply`, once.
    pub fn once(&self, pattern: &str, reply: Reply) {
        self.push(pattern, reply, Some(1));
    }

    fn push(&self, pattern: &str, reply: Reply, remaining: Option<usize>) {
        self.rules.lock().push(Rule {
            pattern: pattern.to_string(),
            reply,
            remaining,
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut rules = self.rules.lock();
        let rule = rules
            .iter_mut()
            .find(|r| url.contains(&r.pattern) && r.remaining != Some(0))?;
        if let Some(n) = rule.remaining.as_mut() {
            *n -= 1;
        }
        Some(rule.reply.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        self.calls.lock().push(url.to_string());
        let Some(reply) = self.next_reply(url) else {
            return Err(TransportError::Connect(format!("no route for {}", url)));
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

pub fn settings() -> FetchSettings {
    FetchSettings {
        base_url: BASE_URL.to_string(),
        api_key: Some(SecureString::new("test-key".to_string())),
        locale: Locale {
            country: "us".to_string(),
            language: "en".to_string(),
        },
        page_size: PAGE_SIZE,
        cache_ttl: Duration::from_secs(300),
        hard_timeout: Duration::from_secs(15),
    }
}

pub fn relay(name: &str) -> RelayProxy {
    RelayProxy {
        name: name.to_string(),
        url_prefix: format!("https://{}.relay/?url=", name),
    }
}

/// Orchestrator over a single direct relay, so rule patterns see the
/// plain upstream URL.
pub fn direct_orchestrator(
    transport: Arc<ScriptedTransport>,
) -> (FetchOrchestrator, Arc<StateRecorder>) {
    orchestrator_with(transport, vec![RelayProxy::direct()])
}

pub fn orchestrator_with(
    transport: Arc<ScriptedTransport>,
    relays: Vec<RelayProxy>,
) -> (FetchOrchestrator, Arc<StateRecorder>) {
    let recorder = Arc::new(StateRecorder::new());
    let pool = ProxyPool::new(relays, Duration::from_secs(8));
    let orchestrator = FetchOrchestrator::new(settings(), pool, transport, recorder.clone());
    (orchestrator, recorder)
}

/// Write `content` as a config file in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Config store whose news and chat upstreams point at `base_url`.
pub fn gateway_store(base_url: &str) -> ConfigStore {
    ConfigStore::new(gateway_config(base_url), PathBuf::from("unused.toml"))
}

pub fn gateway_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.news.base_url = base_url.to_string();
    config.news.api_key = Some("news-key".to_string());
    config.chat.base_url = base_url.to_string();
    config.chat.api_key = Some("chat-key".to_string());
    config.gateway.timeout_seconds = 2;
    config.gateway.connect_timeout_seconds = 1;
    config
}
