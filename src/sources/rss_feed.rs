use async_trait::async_trait;
use chrono::Utc;
use feed_rs::parser;
use tracing::{debug, info};

use super::NewsSource;
use crate::fetcher::Fetcher;
use crate::types::{AggregatorError, Article, Result, SourceConfig};
use crate::utils::{text, url as url_util};

/// Character cap applied to feed-derived description/content text.
const TEXT_CAP: usize = 2000;

/// Adapter for RSS/Atom sources. Takes the first `limit` entries in feed
/// order and normalizes each into an `Article`.
pub struct RssFeedSource {
    config: SourceConfig,
}

impl RssFeedSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn entry_to_article(&self, entry: feed_rs::model::Entry) -> Article {
        let title = entry
            .title
            .map(|t| t.content)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let url = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        let description = entry
            .summary
            .map(|s| text::truncate_chars(&text::strip_html(&s.content), TEXT_CAP))
            .unwrap_or_default();

        // Prefer full content; mirror the description when absent.
        let content = entry
            .content
            .and_then(|c| c.body)
            .map(|body| text::truncate_chars(&text::strip_html(&body), TEXT_CAP))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| description.clone());

        // Best available timestamp: published, else updated, else none.
        let published = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc));

        let richest = if content.len() >= description.len() {
            &content
        } else {
            &description
        };
        let reading_time = Article::reading_time_minutes(richest);

        let domain = if self.config.domain.is_empty() {
            url_util::extract_domain(&url).unwrap_or_default()
        } else {
            self.config.domain.clone()
        };

        Article {
            title,
            url,
            description,
            content,
            published,
            source: self.config.name.clone(),
            category: self.config.category.clone(),
            domain,
            reading_time,
            score: None,
            comments: None,
        }
    }
}

#[async_trait]
impl NewsSource for RssFeedSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self, fetcher: &Fetcher, limit: usize) -> Result<Vec<Article>> {
        debug!("fetching feed for {}: {}", self.config.name, self.config.endpoint);
        let body = fetcher.get_text(&self.config.endpoint).await?;

        let feed = parser::parse(body.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("{}: {}", self.config.name, e)))?;

        let articles: Vec<Article> = feed
            .entries
            .into_iter()
            .take(limit)
            .map(|entry| self.entry_to_article(entry))
            .collect();

        info!("{}: {} articles from feed", self.config.name, articles.len());
        Ok(articles)
    }
}
