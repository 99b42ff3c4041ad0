use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of news origin: an RSS/Atom feed, or an API that lists item ids
/// which must be fetched one by one (Hacker News style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Feed,
    ItemApi,
}

/// Static descriptor of one configured news source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub endpoint: String,
    pub category: String,
    pub domain: String,
}

impl SourceConfig {
    pub fn new(
        name: impl Into<String>,
        kind: SourceKind,
        endpoint: impl Into<String>,
        category: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            endpoint: endpoint.into(),
            category: category.into(),
            domain: domain.into(),
        }
    }
}

/// One normalized news item. Built fresh on every fetch cycle; the only
/// sanctioned mutation afterwards is backfilling `content` from a deeper
/// body fetch before single-article summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub description: String,
    pub content: String,
    pub published: Option<DateTime<Utc>>,
    pub source: String,
    /// Inherited 1:1 from the source's static category.
    pub category: String,
    pub domain: String,
    /// Estimated reading time in minutes (word count / 200, at least 1).
    pub reading_time: u32,
    pub score: Option<i64>,
    pub comments: Option<i64>,
}

impl Article {
    /// Word count / 200 rounded up, floored at one minute.
    pub fn reading_time_minutes(text: &str) -> u32 {
        let words = text.split_whitespace().count();
        ((words + 199) / 200).max(1) as u32
    }
}

/// Closed sentiment label set. Anything a model emits outside this set is
/// coerced to `Neutral` before it reaches a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Lightweight result from the external news-search feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub source: String,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a chat session. History is append-only and scoped to the
/// session; the core never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Structured answer produced by the chat router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub found: bool,
    pub matched_articles: Vec<Article>,
    pub web_results: Vec<SearchResult>,
    pub brief: String,
    pub response: String,
}

impl ChatAnswer {
    /// Terminal shape for top-level chat failures: empty collections plus a
    /// human-readable explanation.
    pub fn failure(response: impl Into<String>) -> Self {
        Self {
            found: false,
            matched_articles: Vec::new(),
            web_results: Vec::new(),
            brief: String::new(),
            response: response.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Source unavailable: {name}: {reason}")]
    SourceUnavailable { name: String, reason: String },

    #[error("Item fetch failed: {0}")]
    ItemFetchFailed(String),

    #[error("No model credential configured")]
    ModelUnavailable,

    #[error("Model call failed: {0}")]
    ModelCallFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
