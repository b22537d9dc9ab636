use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    /// Ordered relay list used to reach the news API.
    #[serde(default = "default_relays")]
    pub relays: Vec<RelayProxy>,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// News API settings consumed by the fetch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Base URL of the news API (e.g., "https://newsapi.org/v2").
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// Inline API key. `NEWSDESK_NEWS_API_KEY` takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Country used for top headlines (default: "us").
    #[serde(default = "default_country")]
    pub country: String,
    /// Language used for searches (default: "en").
    #[serde(default = "default_language")]
    pub language: String,
    /// Articles per page, 1..=100 (default: 20).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// How long a non-search page stays cached (default: 300).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Timeout for a single relay attempt (default: 8).
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_seconds: u64,
    /// Ceiling for the whole relay sequence (default: 15).
    #[serde(default = "default_hard_timeout")]
    pub hard_timeout_seconds: u64,
}

/// A relay endpoint able to forward a GET to the news API.
///
/// The relayed URL is `url_prefix` followed by the percent-encoded target.
/// An empty prefix means the target is requested directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayProxy {
    pub name: String,
    #[serde(default)]
    pub url_prefix: String,
}

/// Bind address and upstream timeouts for the HTTP gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind address for the gateway (host:port).
    #[serde(default = "default_gateway_bind_addr")]
    pub bind_addr: String,
    /// Total upstream request timeout in seconds (default: 30).
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,
    /// Upstream connect timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Chat-completion upstream behind `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL (e.g., "https://api.openai.com/v1").
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,
    /// Inline API key. `NEWSDESK_CHAT_API_KEY` takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model filled in when the request body does not name one.
    #[serde(default = "default_chat_model")]
    pub model: String,
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_attempt_timeout() -> u64 {
    8
}

fn default_hard_timeout() -> u64 {
    15
}

fn default_gateway_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_chat_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_relays() -> Vec<RelayProxy> {
    vec![
        RelayProxy {
            name: "allorigins".to_string(),
            url_prefix: "https://api.allorigins.win/get?url=".to_string(),
        },
        RelayProxy {
            name: "corsproxy".to_string(),
            url_prefix: "https://corsproxy.io/?url=".to_string(),
        },
        RelayProxy {
            name: "codetabs".to_string(),
            url_prefix: "https://api.codetabs.com/v1/proxy?quest=".to_string(),
        },
    ]
}

impl RelayProxy {
    /// A relay entry that requests the target URL as-is.
    pub fn direct() -> Self {
        Self {
            name: "direct".to_string(),
            url_prefix: String::new(),
        }
    }

    pub fn is_direct(&self) -> bool {
        self.url_prefix.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news: NewsConfig::default(),
            relays: default_relays(),
            gateway: GatewayConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key: None,
            country: default_country(),
            language: default_language(),
            page_size: default_page_size(),
            cache_ttl_seconds: default_cache_ttl(),
            attempt_timeout_seconds: default_attempt_timeout(),
            hard_timeout_seconds: default_hard_timeout(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_gateway_bind_addr(),
            timeout_seconds: default_gateway_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            api_key: None,
            model: default_chat_model(),
        }
    }
}
