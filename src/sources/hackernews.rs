use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, info};

use super::NewsSource;
use crate::fetcher::Fetcher;
use crate::types::{Article, Result, SourceConfig};
use crate::utils::{text, url as url_util};

const DESCRIPTION_CAP: usize = 500;
const CONTENT_CAP: usize = 2000;

/// Adapter for item-based APIs in the Hacker News shape: an ordered id list
/// endpoint, then one fetch per item. Only real stories with an external URL
/// are kept; a failed item fetch skips that item, never the batch.
pub struct HackerNewsSource {
    config: SourceConfig,
}

#[derive(Debug, Deserialize)]
struct HnItem {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
    time: Option<i64>,
    score: Option<i64>,
    descendants: Option<i64>,
}

impl HackerNewsSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn item_to_article(&self, item: HnItem) -> Option<Article> {
        if item.kind.as_deref() != Some("story") {
            return None;
        }
        let url = item.url.filter(|u| !u.is_empty())?;

        let title = item
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let body = item.text.map(|t| text::strip_html(&t)).unwrap_or_default();
        let description = text::truncate_chars(&body, DESCRIPTION_CAP);
        let content = text::truncate_chars(&body, CONTENT_CAP);

        let published = item.time.and_then(|t| DateTime::from_timestamp(t, 0));

        let domain = if self.config.domain.is_empty() {
            url_util::extract_domain(&url).unwrap_or_default()
        } else {
            self.config.domain.clone()
        };

        Some(Article {
            title,
            url,
            description,
            // Empty text still floors at a one-minute read.
            reading_time: Article::reading_time_minutes(&content),
            content,
            published,
            source: self.config.name.clone(),
            category: self.config.category.clone(),
            domain,
            score: item.score,
            comments: item.descendants,
        })
    }
}

#[async_trait]
impl NewsSource for HackerNewsSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self, fetcher: &Fetcher, limit: usize) -> Result<Vec<Article>> {
        let list_url = format!("{}topstories.json", self.config.endpoint);
        let story_ids: Vec<u64> = fetcher.get_json(&list_url).await?;

        let mut articles = Vec::new();
        for id in story_ids.into_iter().take(limit) {
            let item_url = format!("{}item/{}.json", self.config.endpoint, id);
            match fetcher.get_json::<Option<HnItem>>(&item_url).await {
                Ok(Some(item)) => {
                    if let Some(article) = self.item_to_article(item) {
                        articles.push(article);
                    }
                }
                Ok(None) => debug!("{}: item {} is null, skipping", self.config.name, id),
                Err(e) => debug!("{}: item {} fetch failed, skipping: {}", self.config.name, id, e),
            }
        }

        info!("{}: {} articles from item API", self.config.name, articles.len());
        Ok(articles)
    }
}
