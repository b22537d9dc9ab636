mod common;

use common::temp_config;
use newsdesk::config::{default_relays, Config, ConfigError, ConfigStore, RelayProxy};

/// Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.news.base_url, "https://newsapi.org/v2");
    assert_eq!(config.news.country, "us");
    assert_eq!(config.news.language, "en");
    assert_eq!(config.news.page_size, 20);
    assert_eq!(config.news.cache_ttl_seconds, 300);
    assert_eq!(config.news.attempt_timeout_seconds, 8);
    assert_eq!(config.news.hard_timeout_seconds, 15);
    assert!(config.news.api_key.is_none());

    assert_eq!(config.relays, default_relays());
    assert_eq!(config.relays.len(), 3);
    assert_eq!(config.relays[0].name, "allorigins");

    assert_eq!(config.gateway.bind_addr, "127.0.0.1:8787");
    assert_eq!(config.gateway.timeout_seconds, 30);
    assert_eq!(config.chat.model, "gpt-4o-mini");

    assert!(config.validate().is_ok());
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("newsdesk/config.toml"));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.news.page_size, 20);
    assert_eq!(config.relays.len(), 3);
}

#[test]
fn test_partial_file_keeps_defaults_for_the_rest() {
    let (_dir, path) = temp_config(
        r#"
[news]
api_key = "inline"
page_size = 50

[[relays]]
name = "direct"

[[relays]]
name = "mine"
url_prefix = "https://relay.example/?u="
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.news.api_key.as_deref(), Some("inline"));
    assert_eq!(config.news.page_size, 50);
    assert_eq!(config.news.country, "us");
    assert_eq!(config.news.hard_timeout_seconds, 15);
    assert_eq!(config.relays.len(), 2);
    assert!(config.relays[0].is_direct());
    assert_eq!(config.relays[1].url_prefix, "https://relay.example/?u=");
    assert_eq!(config.gateway.bind_addr, "127.0.0.1:8787");
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let (_dir, path) = temp_config("[news\npage_size = ");
    match Config::load_from(&path) {
        Err(ConfigError::ParseError { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected ParseError, got {:?}", other.map(|_| ())),
    }
}

fn validation_message(config: &Config) -> String {
    match config.validate() {
        Err(ConfigError::ValidationError { message }) => message,
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_validation_fails_without_relays() {
    let mut config = Config::default();
    config.relays.clear();
    assert!(validation_message(&config).contains("At least one relay"));
}

#[test]
fn test_validation_fails_on_duplicate_relay_names() {
    let mut config = Config::default();
    config.relays.push(RelayProxy {
        name: "allorigins".to_string(),
        url_prefix: "https://elsewhere/?u=".to_string(),
    });
    assert!(validation_message(&config).contains("Duplicate relay name"));
}

#[test]
fn test_validation_bounds_page_size() {
    let mut config = Config::default();
    config.news.page_size = 0;
    assert!(validation_message(&config).contains("page_size"));
    config.news.page_size = 101;
    assert!(validation_message(&config).contains("page_size"));
    config.news.page_size = 100;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_requires_attempt_timeout_under_ceiling() {
    let mut config = Config::default();
    config.news.attempt_timeout_seconds = 20;
    assert!(validation_message(&config).contains("exceeds"));

    config.news.attempt_timeout_seconds = 0;
    assert!(validation_message(&config).contains("greater than zero"));
}

#[test]
fn test_validation_rejects_bad_bind_addr() {
    let mut config = Config::default();
    config.gateway.bind_addr = "localhost".to_string();
    assert!(validation_message(&config).contains("bind_addr"));
}

#[test]
fn test_invalid_values_in_file_fail_to_load() {
    let (_dir, path) = temp_config("[news]\npage_size = 500\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_store_reload_replaces_config_and_keeps_old_on_error() {
    let (_dir, path) = temp_config("[news]\ncountry = \"gb\"\n");
    let store = ConfigStore::open(path.clone()).unwrap();
    assert_eq!(store.get().news.country, "gb");

    std::fs::write(&path, "[news]\ncountry = \"de\"\n").unwrap();
    store.reload().unwrap();
    assert_eq!(store.get().news.country, "de");

    std::fs::write(&path, "[news]\ncountry = ").unwrap();
    assert!(store.reload().is_err());
    assert_eq!(store.get().news.country, "de");
    assert_eq!(store.path(), path.as_path());
}
