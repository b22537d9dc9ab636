use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Title NewsAPI substitutes for articles that were taken down.
const REMOVED_TITLE: &str = "[Removed]";

/// Normalized article, independent of which upstream produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    /// Unique within a result set.
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
}

impl Article {
    /// Build an article from one upstream record.
    ///
    /// Accepts the NewsAPI spelling (`urlToImage`, `publishedAt`,
    /// `source.name`) as well as the GNews/RSS-bridge variants (`image`,
    /// `published_at`, `pubDate`, `source` as a bare string). Returns `None`
    /// for records without a URL and for removed placeholders.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let url = first_str(obj, &["url", "link"])?;
        let title = first_str(obj, &["title"]).unwrap_or_else(|| "Untitled".to_string());
        if title == REMOVED_TITLE {
            return None;
        }

        let published_at = first_str(obj, &["publishedAt", "published_at", "pubDate"])
            .and_then(|raw| parse_timestamp(&raw));

        Some(Self {
            title,
            description: first_str(obj, &["description", "summary"]),
            url,
            image_url: first_str(obj, &["urlToImage", "image", "image_url"]),
            published_at,
            source: Source {
                name: source_name(obj.get("source")),
            },
        })
    }
}

/// First non-blank string among `keys`, trimmed.
fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn source_name(source: Option<&Value>) -> String {
    let name = match source {
        Some(Value::String(name)) => Some(name.trim().to_string()),
        Some(Value::Object(obj)) => first_str(obj, &["name", "id"]),
        _ => None,
    };
    name.filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown source".to_string())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
