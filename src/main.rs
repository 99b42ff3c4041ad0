use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use tech_news_aggregator::{
    default_sources, AppConfig, BriefingHistory, ChatRouter, ModelConfig, NewsAggregator,
    Summarizer,
};

#[derive(Parser)]
#[command(name = "tech-news-aggregator")]
#[command(about = "Aggregate, deduplicate and summarize tech news", long_about = None)]
struct Cli {
    /// Restrict fetching to these source names (default: all registered sources)
    #[arg(short, long)]
    sources: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, deduplicate and list the latest articles
    Fetch,
    /// Generate an executive briefing across all fetched articles
    Brief {
        /// File used to persist past briefings
        #[arg(long, default_value = "briefing_history.json")]
        history: String,
    },
    /// Extract the trending topics from today's headlines
    Topics,
    /// Classify headline sentiment per article
    Sentiment,
    /// Ask a question about today's news
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let app = AppConfig::from_env();
    let model = ModelConfig::from_env();

    let aggregator = NewsAggregator::new(default_sources(), &app)?;
    let filter = if cli.sources.is_empty() {
        None
    } else {
        Some(cli.sources.as_slice())
    };

    let articles = aggregator.fetch_all(filter).await;
    info!("fetched {} articles after deduplication", articles.len());

    match cli.command {
        Command::Fetch => {
            for (i, article) in articles.iter().enumerate() {
                let when = article
                    .published
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "undated".to_string());
                println!("{}. [{}] {} ({})", i + 1, article.source, article.title, when);
                println!("   {}", article.url);
            }
        }
        Command::Brief { history } => {
            let summarizer = Summarizer::new(&model, &app, aggregator.fetcher());
            let briefing = summarizer.summarize_batch(&articles).await;
            println!("{}", briefing);
            BriefingHistory::new(history).append(&briefing, articles.len());
        }
        Command::Topics => {
            let summarizer = Summarizer::new(&model, &app, aggregator.fetcher());
            for topic in summarizer.extract_topics(&articles).await {
                println!("- {}", topic);
            }
        }
        Command::Sentiment => {
            let summarizer = Summarizer::new(&model, &app, aggregator.fetcher());
            let labels = summarizer.classify_sentiment(&articles).await;
            for article in &articles {
                if let Some(sentiment) = labels.get(&article.title) {
                    println!("{:8} {}", sentiment.as_str(), article.title);
                }
            }
        }
        Command::Ask { question } => {
            let router = ChatRouter::new(&model, aggregator.fetcher());
            let answer = router.ask(&articles, &question, &[]).await;
            println!("{}", answer.response);
            if !answer.matched_articles.is_empty() {
                println!("\nBased on:");
                for article in &answer.matched_articles {
                    println!("- {} ({})", article.title, article.url);
                }
            }
            if !answer.web_results.is_empty() {
                println!("\nFrom the web:");
                for result in &answer.web_results {
                    println!("- {} — {}", result.title, result.url);
                }
            }
        }
    }

    Ok(())
}
