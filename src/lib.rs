pub mod aggregator;
pub mod cache;
pub mod chat;
pub mod config;
pub mod dedup;
pub mod fetcher;
pub mod history;
pub mod llm;
pub mod search;
pub mod sources;
pub mod summarizer;
pub mod types;
pub mod utils;

pub use aggregator::NewsAggregator;
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use chat::ChatRouter;
pub use config::{default_sources, AppConfig, ModelConfig};
pub use fetcher::Fetcher;
pub use history::{BriefingHistory, BriefingRecord};
pub use llm::LlmClient;
pub use search::NewsSearchClient;
pub use sources::NewsSource;
pub use summarizer::Summarizer;
pub use types::*;
