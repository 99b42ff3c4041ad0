use chrono::Utc;
use feed_rs::parser;
use tracing::{info, warn};

use crate::fetcher::Fetcher;
use crate::types::SearchResult;
use crate::utils::text;

pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Recency window appended to every query.
const TIME_WINDOW: &str = "when:2d";

const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";

/// Client for the external news-search feed, used when a question is not
/// covered by the local corpus. Every call is independent; failures yield
/// an empty result list, which callers treat as "no evidence found".
pub struct NewsSearchClient {
    base_url: String,
}

impl NewsSearchClient {
    pub fn new() -> Self {
        Self {
            base_url: GOOGLE_NEWS_RSS.to_string(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Search recent third-party coverage of `query`, capped at `limit`.
    pub async fn search(&self, fetcher: &Fetcher, query: &str, limit: usize) -> Vec<SearchResult> {
        let url = format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            self.base_url,
            urlencoding::encode(&format!("{} {}", query, TIME_WINDOW)),
        );

        let body = match fetcher.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("news search failed for '{}': {}", query, e);
                return Vec::new();
            }
        };

        let feed = match parser::parse(body.as_bytes()) {
            Ok(feed) => feed,
            Err(e) => {
                warn!("news search feed unparsable for '{}': {}", query, e);
                return Vec::new();
            }
        };

        let results: Vec<SearchResult> = feed
            .entries
            .into_iter()
            .take(limit)
            .map(|entry| {
                let raw_title = entry.title.map(|t| t.content).unwrap_or_default();
                let (title, source) = split_source_suffix(&raw_title);
                SearchResult {
                    title,
                    url: entry.links.first().map(|l| l.href.clone()).unwrap_or_default(),
                    description: entry
                        .summary
                        .map(|s| text::strip_html(&s.content))
                        .unwrap_or_default(),
                    source,
                    published: entry.published.map(|dt| dt.with_timezone(&Utc)),
                }
            })
            .collect();

        info!("news search for '{}' returned {} results", query, results.len());
        results
    }
}

impl Default for NewsSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Search-feed titles carry the publisher as a trailing " - SourceName";
/// split it off when present.
fn split_source_suffix(title: &str) -> (String, String) {
    match title.rfind(" - ") {
        Some(pos) => (
            title[..pos].trim().to_string(),
            title[pos + 3..].trim().to_string(),
        ),
        None => (title.to_string(), "Google News".to_string()),
    }
}
