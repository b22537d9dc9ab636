//! Request resolution: user selection + locale + page → one request shape.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Upper bound the news API accepts for `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Remote endpoint shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    TopHeadlines,
    Everything,
}

impl Mode {
    pub fn endpoint(self) -> &'static str {
        match self {
            Mode::TopHeadlines => "top-headlines",
            Mode::Everything => "everything",
        }
    }
}

/// What the user is currently looking at, before resolution.
///
/// Both fields may be set at once; [`RequestParameters::resolve`] decides
/// which one is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub category: Option<String>,
    pub query: Option<String>,
}

impl Selection {
    /// Category selection with search cleared. `"all"` and blank mean none.
    pub fn category(category: &str) -> Self {
        let category = category.trim().to_lowercase();
        let category = (!category.is_empty() && category != ALL_CATEGORIES).then_some(category);
        Self {
            category,
            query: None,
        }
    }

    /// Search selection. Blank queries are treated as no search.
    pub fn search(query: &str) -> Self {
        let query = query.trim();
        Self {
            category: None,
            query: (!query.is_empty()).then(|| query.to_string()),
        }
    }

    pub fn is_search(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }
}

/// Locale filters applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub country: String,
    pub language: String,
}

/// Fully resolved description of one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestParameters {
    pub mode: Mode,
    pub category: Option<String>,
    pub query: Option<String>,
    pub country: String,
    pub language: String,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl RequestParameters {
    /// Resolve a selection into a request.
    ///
    /// Precedence: a non-blank query forces `Everything` and drops the
    /// category; otherwise a category gives category headlines; otherwise
    /// headlines for the locale's country.
    pub fn resolve(selection: &Selection, locale: &Locale, page: u32, page_size: u32) -> Self {
        let query = selection
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let (mode, category) = match query {
            Some(_) => (Mode::Everything, None),
            None => (
                Mode::TopHeadlines,
                selection
                    .category
                    .as_deref()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty() && c != ALL_CATEGORIES),
            ),
        };

        Self {
            mode,
            category,
            query,
            country: locale.country.clone(),
            language: locale.language.clone(),
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn is_search(&self) -> bool {
        self.mode == Mode::Everything
    }

    /// Query string pairs for the endpoint, without the API key.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        match self.mode {
            Mode::TopHeadlines => {
                pairs.push(("country", self.country.clone()));
                if let Some(category) = &self.category {
                    pairs.push(("category", category.clone()));
                }
            }
            Mode::Everything => {
                pairs.push(("q", self.query.clone().unwrap_or_default()));
                pairs.push(("language", self.language.clone()));
                pairs.push(("sortBy", "publishedAt".to_string()));
            }
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("pageSize", self.page_size.to_string()));
        pairs
    }

    /// Full upstream URL, including the key when one is configured.
    pub fn endpoint_url(&self, base_url: &str, api_key: Option<&str>) -> String {
        let mut query = encode_pairs(self.query_pairs().iter().map(|(k, v)| (*k, v.as_str())));
        if let Some(key) = api_key {
            query.push_str("&apiKey=");
            query.push_str(&urlencoding::encode(key));
        }
        format!(
            "{}/{}?{}",
            base_url.trim_end_matches('/'),
            self.mode.endpoint(),
            query
        )
    }

    /// Cache key: every field that distinguishes one response from another.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RequestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}?category={}&q={}&country={}&language={}&page={}&pageSize={}",
            self.mode.endpoint(),
            self.category.as_deref().unwrap_or(""),
            self.query.as_deref().unwrap_or(""),
            self.country,
            self.language,
            self.page,
            self.page_size
        )
    }
}

pub(crate) fn encode_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Mask the `apiKey` query value, plain or percent-encoded inside a relay URL.
pub fn redact_api_key(url: &str) -> String {
    let mut out = url.to_string();
    for (marker, terminator) in [("apiKey=", "&"), ("apiKey%3D", "%26")] {
        let mut from = 0;
        while let Some(pos) = out[from..].find(marker) {
            let start = from + pos + marker.len();
            let end = out[start..]
                .find(terminator)
                .map(|i| start + i)
                .unwrap_or(out.len());
            out.replace_range(start..end, "***");
            from = start + 3;
        }
    }
    out
}
