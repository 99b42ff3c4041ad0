use std::env;

use crate::types::{SourceConfig, SourceKind};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/chat/completions";

/// Application-level settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_articles_per_source: usize,
    pub fetch_timeout_secs: u64,
    pub summary_max_tokens: u32,
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_articles_per_source: 5,
            fetch_timeout_secs: 15,
            summary_max_tokens: 300,
            cache_ttl_secs: 600,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_articles_per_source: env_parse(
                "MAX_ARTICLES_PER_SOURCE",
                defaults.max_articles_per_source,
            ),
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT", defaults.fetch_timeout_secs),
            summary_max_tokens: env_parse("SUMMARY_MAX_TOKENS", defaults.summary_max_tokens),
            cache_ttl_secs: env_parse("CACHE_TTL", defaults.cache_ttl_secs),
        }
    }
}

/// Model credential and endpoint. The absence of an API key deterministically
/// selects the non-LLM fallback path everywhere; it is never an error.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            model,
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// The static source registry: each source carries a fixed display name,
/// category and registrable domain. Articles inherit category and domain
/// from here; there is no article-level override.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "TechCrunch",
            SourceKind::Feed,
            "https://techcrunch.com/feed/",
            "General Tech",
            "techcrunch.com",
        ),
        SourceConfig::new(
            "The Verge",
            SourceKind::Feed,
            "https://www.theverge.com/rss/index.xml",
            "General Tech",
            "theverge.com",
        ),
        SourceConfig::new(
            "Ars Technica",
            SourceKind::Feed,
            "https://feeds.arstechnica.com/arstechnica/index",
            "Deep Tech",
            "arstechnica.com",
        ),
        SourceConfig::new(
            "Wired",
            SourceKind::Feed,
            "https://www.wired.com/feed/rss",
            "Tech & Culture",
            "wired.com",
        ),
        SourceConfig::new(
            "Hacker News",
            SourceKind::ItemApi,
            "https://hacker-news.firebaseio.com/v0/",
            "Developer & Startups",
            "news.ycombinator.com",
        ),
        SourceConfig::new(
            "MIT Technology Review",
            SourceKind::Feed,
            "https://www.technologyreview.com/feed/",
            "Research & Innovation",
            "technologyreview.com",
        ),
    ]
}
