use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::cache::{Clock, TtlCache};
use crate::config::AppConfig;
use crate::dedup::{dedup_articles, sort_newest_first};
use crate::fetcher::Fetcher;
use crate::sources::{build_source, NewsSource};
use crate::types::{Article, Result, SourceConfig};

/// Fans one adapter invocation per configured source out onto the runtime,
/// merges whatever arrives, deduplicates and sorts. One call is one fetch
/// cycle; the returned list is an immutable snapshot for downstream
/// consumers.
pub struct NewsAggregator {
    sources: Vec<Arc<dyn NewsSource>>,
    fetcher: Arc<Fetcher>,
    cache: TtlCache<String, Vec<Article>>,
    max_articles_per_source: usize,
}

impl NewsAggregator {
    pub fn new(configs: Vec<SourceConfig>, app: &AppConfig) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(app.fetch_timeout_secs)?);
        Ok(Self {
            sources: configs.into_iter().map(|c| build_source(c).into()).collect(),
            fetcher,
            cache: TtlCache::new(Duration::from_secs(app.cache_ttl_secs)),
            max_articles_per_source: app.max_articles_per_source,
        })
    }

    /// Swap in a different clock for the result cache.
    pub fn with_cache_clock(mut self, ttl: Duration, clock: Box<dyn Clock>) -> Self {
        self.cache = TtlCache::with_clock(ttl, clock);
        self
    }

    pub fn fetcher(&self) -> Arc<Fetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Fetch from all configured sources (optionally restricted by name) in
    /// parallel, tolerate per-source failure, then dedup and sort newest
    /// first. Results are cached per selection until the TTL lapses; a
    /// failed source simply contributes nothing this cycle and is retried
    /// on the next uncached call.
    pub async fn fetch_all(&self, source_filter: Option<&[String]>) -> Vec<Article> {
        let selected: Vec<Arc<dyn NewsSource>> = self
            .sources
            .iter()
            .filter(|s| match source_filter {
                Some(names) => names.iter().any(|n| n == s.name()),
                None => true,
            })
            .cloned()
            .collect();

        let cache_key = selection_key(&selected);
        if let Some(cached) = self.cache.get(&cache_key) {
            info!("returning {} cached articles for [{}]", cached.len(), cache_key);
            return cached;
        }

        info!("fetching {} sources", selected.len());
        let mut tasks = JoinSet::new();
        for source in selected {
            let fetcher = Arc::clone(&self.fetcher);
            let limit = self.max_articles_per_source;
            tasks.spawn(async move {
                let result = source.fetch(&fetcher, limit).await;
                (source.name().to_string(), result)
            });
        }

        // Drain completions in arrival order; one source failing must never
        // abort the in-flight siblings.
        let mut merged = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(articles))) => merged.extend(articles),
                Ok((name, Err(e))) => warn!("source {} failed this cycle: {}", name, e),
                Err(e) => error!("fetch task panicked: {}", e),
            }
        }

        let mut articles = dedup_articles(merged);
        sort_newest_first(&mut articles);
        info!("fetch cycle produced {} articles", articles.len());

        self.cache.insert(cache_key, articles.clone());
        articles
    }

    /// Drop any cached fetch results, forcing the next call to refetch.
    pub fn invalidate_cache(&self) {
        self.cache.clear();
    }
}

/// Normalized selection tuple: sorted source names, order-insensitive.
fn selection_key(selected: &[Arc<dyn NewsSource>]) -> String {
    let mut names: Vec<&str> = selected.iter().map(|s| s.name()).collect();
    names.sort_unstable();
    names.join(",")
}
