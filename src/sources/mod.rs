pub mod hackernews;
pub mod rss_feed;

use async_trait::async_trait;

use crate::fetcher::Fetcher;
use crate::types::{Article, Result, SourceConfig, SourceKind};

pub use hackernews::HackerNewsSource;
pub use rss_feed::RssFeedSource;

/// One configured news origin. Adapters normalize heterogeneous upstream
/// payloads into `Article` at this boundary; nothing duck-typed leaks past.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Human-readable source name, from configuration.
    fn name(&self) -> &str;

    /// Fetch up to `limit` articles. Item-level failures are absorbed
    /// internally (partial success is preserved); a source-level failure
    /// returns `Err` and is isolated by the orchestrator.
    async fn fetch(&self, fetcher: &Fetcher, limit: usize) -> Result<Vec<Article>>;
}

/// Build the adapter matching a source descriptor's kind.
pub fn build_source(config: SourceConfig) -> Box<dyn NewsSource> {
    match config.kind {
        SourceKind::Feed => Box::new(RssFeedSource::new(config)),
        SourceKind::ItemApi => Box::new(HackerNewsSource::new(config)),
    }
}
