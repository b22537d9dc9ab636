//! Payload adapter: relay unwrapping and envelope inspection.
//!
//! Relays differ in how they hand back the upstream body. Some return it
//! untouched, some wrap it as `{ "contents": "<json string>" }`. The
//! orchestrator only ever sees the result of [`unwrap_and_parse`].

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::news::article::Article;
use crate::news::error::FetchError;

/// One page of normalized results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub articles: Vec<Article>,
    /// Records the upstream returned before normalization dropped any.
    pub received: usize,
    pub total_results: Option<u64>,
}

/// Parse a raw relay body into a page of articles.
///
/// Error envelopes are reported as [`FetchError::RemoteApi`] whatever the
/// HTTP status was; anything else that is not an article envelope is
/// [`FetchError::Malformed`].
pub fn unwrap_and_parse(raw: &[u8]) -> Result<Page, FetchError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| FetchError::Malformed(format!("body is not JSON: {}", e)))?;
    let value = unwrap_relay(value)?;

    let Value::Object(obj) = value else {
        return Err(FetchError::Malformed("envelope is not an object".to_string()));
    };
    parse_envelope(obj)
}

/// Whether `raw` carries a structured API error (used to tell an upstream
/// refusal apart from a failing relay).
pub fn is_api_error(raw: &[u8]) -> bool {
    matches!(unwrap_and_parse(raw), Err(FetchError::RemoteApi { .. }))
}

fn unwrap_relay(value: Value) -> Result<Value, FetchError> {
    let is_wrapped = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("contents") && !obj.contains_key("articles"));
    if !is_wrapped {
        return Ok(value);
    }

    match value.get("contents") {
        Some(Value::String(inner)) => serde_json::from_str(inner).map_err(|e| {
            FetchError::Malformed(format!("relay contents are not JSON: {}", e))
        }),
        Some(Value::Object(_)) => Ok(value["contents"].clone()),
        _ => Err(FetchError::Malformed(
            "relay returned no contents".to_string(),
        )),
    }
}

fn parse_envelope(obj: Map<String, Value>) -> Result<Page, FetchError> {
    if obj.get("status").and_then(Value::as_str) == Some("error") {
        return Err(FetchError::RemoteApi {
            code: obj.get("code").and_then(Value::as_str).map(str::to_string),
            message: obj.get("message").and_then(Value::as_str).map(str::to_string),
        });
    }

    // GNews-style `{ "errors": [...] }`
    if let Some(errors) = obj.get("errors") {
        let message = match errors {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(FetchError::RemoteApi {
            code: None,
            message: Some(message).filter(|m| !m.is_empty()),
        });
    }

    let Some(Value::Array(items)) = obj.get("articles") else {
        return Err(FetchError::Malformed(
            "envelope has no articles array".to_string(),
        ));
    };

    let mut seen = HashSet::new();
    let articles: Vec<Article> = items
        .iter()
        .filter_map(Article::from_value)
        .filter(|a| seen.insert(a.url.clone()))
        .collect();

    let total_results = obj
        .get("totalResults")
        .or_else(|| obj.get("totalArticles"))
        .and_then(Value::as_u64);

    Ok(Page {
        articles,
        received: items.len(),
        total_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_body(n: usize) -> Value {
        let articles: Vec<Value> = (0..n)
            .map(|i| json!({ "title": format!("t{}", i), "url": format!("https://e/{}", i) }))
            .collect();
        json!({ "status": "ok", "totalResults": n, "articles": articles })
    }

    #[test]
    fn plain_ok_envelope() {
        let page = unwrap_and_parse(ok_body(3).to_string().as_bytes()).unwrap();
        assert_eq!(page.articles.len(), 3);
        assert_eq!(page.total_results, Some(3));
    }

    #[test]
    fn wrapped_contents_are_reparsed() {
        let wrapped = json!({
            "contents": ok_body(2).to_string(),
            "status": { "http_code": 200 }
        });
        let page = unwrap_and_parse(wrapped.to_string().as_bytes()).unwrap();
        assert_eq!(page.articles.len(), 2);
    }

    #[test]
    fn wrapped_error_envelope_is_remote_error() {
        let inner = json!({ "status": "error", "code": "rateLimited", "message": "Slow down" });
        let wrapped = json!({ "contents": inner.to_string() });
        let err = unwrap_and_parse(wrapped.to_string().as_bytes()).unwrap_err();
        assert_eq!(
            err,
            FetchError::RemoteApi {
                code: Some("rateLimited".into()),
                message: Some("Slow down".into()),
            }
        );
    }

    #[test]
    fn null_contents_is_malformed() {
        let err = unwrap_and_parse(br#"{"contents": null}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn garbage_contents_is_malformed() {
        let err = unwrap_and_parse(br#"{"contents": "<html>blocked</html>"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            unwrap_and_parse(b"<!doctype html>"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn ok_without_articles_is_malformed() {
        assert!(matches!(
            unwrap_and_parse(br#"{"status":"ok"}"#),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn gnews_errors_array() {
        let err = unwrap_and_parse(br#"{"errors":["You did not provide an API key."]}"#).unwrap_err();
        assert_eq!(
            err.user_message(),
            "You did not provide an API key."
        );
    }

    #[test]
    fn duplicate_urls_are_dropped() {
        let body = json!({ "status": "ok", "articles": [
            { "title": "a", "url": "https://e/1" },
            { "title": "b", "url": "https://e/1" },
            { "title": "[Removed]", "url": "https://e/2" }
        ]});
        let page = unwrap_and_parse(body.to_string().as_bytes()).unwrap();
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.received, 3);
        assert_eq!(page.articles[0].title, "a");
    }

    #[test]
    fn api_error_detection() {
        assert!(is_api_error(br#"{"status":"error","code":"apiKeyInvalid"}"#));
        assert!(!is_api_error(b"Bad Gateway"));
    }
}
