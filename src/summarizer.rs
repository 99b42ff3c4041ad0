use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, ModelConfig};
use crate::fetcher::Fetcher;
use crate::llm::{extract_json, ChatMessage, LlmClient};
use crate::types::{Article, Sentiment};
use crate::utils::{is_stop_word, text};

/// Prompt-size caps per field; titles are never capped.
const PROMPT_DESCRIPTION_CAP: usize = 1000;
const PROMPT_CONTENT_CAP: usize = 2000;
const DIGEST_DESCRIPTION_CAP: usize = 200;

/// Articles whose content is shorter than this get a deep body fetch before
/// single-article summarization.
const ENRICH_CONTENT_THRESHOLD: usize = 200;

const TOPIC_ARTICLE_CAP: usize = 40;
const SENTIMENT_ARTICLE_CAP: usize = 50;
const MAX_TOPICS: usize = 10;
const FALLBACK_TOPIC_COUNT: usize = 8;

const BRIEFING_MAX_TOKENS: u32 = 1000;
const TOPICS_MAX_TOKENS: u32 = 200;
const SENTIMENT_MAX_TOKENS: u32 = 800;

pub const NO_CREDENTIAL_MESSAGE: &str =
    "Set your OPENAI_API_KEY environment variable to enable AI-powered summaries.";

const POSITIVE_WORDS: &[&str] = &[
    "launch", "launches", "unveils", "breakthrough", "success", "wins", "win", "growth",
    "record", "surge", "soars", "funding", "raises", "expands", "improves", "milestone",
    "partnership", "innovation", "upgrade", "free", "faster",
];

const NEGATIVE_WORDS: &[&str] = &[
    "layoffs", "lawsuit", "breach", "hack", "hacked", "outage", "fails", "failure", "decline",
    "losses", "loss", "cuts", "shutdown", "banned", "ban", "fine", "fined", "recall", "crash",
    "vulnerability", "scandal", "bankruptcy", "delays", "delay",
];

/// LLM-backed transformations over the article corpus. Every operation has a
/// deterministic non-LLM fallback selected when no credential is configured,
/// and degrades to the same fallback (or a short inline failure string) when
/// a model call errors. Nothing here returns `Err` to callers.
pub struct Summarizer {
    llm: Option<LlmClient>,
    fetcher: Arc<Fetcher>,
    summary_max_tokens: u32,
}

impl Summarizer {
    pub fn new(model: &ModelConfig, app: &AppConfig, fetcher: Arc<Fetcher>) -> Self {
        Self {
            llm: LlmClient::from_config(model),
            fetcher,
            summary_max_tokens: app.summary_max_tokens,
        }
    }

    // ── Single-article summary ──────────────────────────────────────────

    /// Summarize one article into Summary / Why it matters / Key players
    /// sections. Backfills thin `content` from a deep body fetch first;
    /// that mutation is the one sanctioned enrichment of a fetched Article.
    pub async fn summarize_one(&self, article: &mut Article) -> String {
        let llm = match &self.llm {
            Some(llm) => llm,
            None => return fallback_summary(article),
        };

        if article.content.len() < ENRICH_CONTENT_THRESHOLD && !article.url.is_empty() {
            let body = self.fetcher.fetch_article_body(&article.url).await;
            if !body.is_empty() {
                article.content = body;
            }
        }

        let mut context = vec![format!("Title: {}", article.title)];
        if !article.description.is_empty() {
            context.push(format!(
                "Description: {}",
                text::truncate_chars(&article.description, PROMPT_DESCRIPTION_CAP)
            ));
        }
        if !article.content.is_empty() {
            context.push(format!(
                "Content: {}",
                text::truncate_chars(&article.content, PROMPT_CONTENT_CAP)
            ));
        }
        context.push(format!("Source: {}", article.source));

        let messages = vec![
            ChatMessage::system(
                "You are a tech news analyst. Summarize the following article under three \
                 headed sections: 'Summary' (2-3 concise sentences of the key facts), \
                 'Why it matters' (impact for the tech community), and 'Key players' \
                 (the companies and people involved). Be objective and informative.",
            ),
            ChatMessage::user(context.join("\n")),
        ];

        match llm.chat(messages, self.summary_max_tokens, 0.3).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("article summarization failed, using fallback: {}", e);
                fallback_summary(article)
            }
        }
    }

    // ── Executive briefing ──────────────────────────────────────────────

    /// Produce a structured briefing over a batch of headlines.
    pub async fn summarize_batch(&self, articles: &[Article]) -> String {
        let llm = match &self.llm {
            Some(llm) => llm,
            None => return NO_CREDENTIAL_MESSAGE.to_string(),
        };
        if articles.is_empty() {
            return "No articles available to summarize.".to_string();
        }

        let digest: Vec<String> = articles
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let mut line = format!("{}. [{}] {}", i + 1, a.source, a.title);
                if !a.description.is_empty() {
                    line.push_str(" — ");
                    line.push_str(&text::truncate_chars(&a.description, DIGEST_DESCRIPTION_CAP));
                }
                line
            })
            .collect();

        let messages = vec![
            ChatMessage::system(
                "You are an expert tech news analyst producing a daily briefing. Given the \
                 following list of today's top tech headlines and descriptions, produce a \
                 structured summary with the following sections:\n\n\
                 1. **Top Stories** — The 3-4 most significant stories and why they matter.\n\
                 2. **Trends & Themes** — Common themes or emerging trends across stories.\n\
                 3. **Market Signals** — What the stories imply for companies and markets.\n\
                 4. **Quick Bites** — One-line summaries for remaining noteworthy articles.\n\n\
                 Use clear, concise language. Be insightful but objective. Reference specific \
                 articles by number when appropriate.",
            ),
            ChatMessage::user(digest.join("\n")),
        ];

        match llm.chat(messages, BRIEFING_MAX_TOKENS, 0.4).await {
            Ok(briefing) => briefing,
            Err(e) => format!("Failed to generate briefing: {}", e),
        }
    }

    // ── Trending topics ─────────────────────────────────────────────────

    /// Extract up to ten short trending-topic labels from the first forty
    /// headlines.
    pub async fn extract_topics(&self, articles: &[Article]) -> Vec<String> {
        let batch = &articles[..articles.len().min(TOPIC_ARTICLE_CAP)];
        if batch.is_empty() {
            return Vec::new();
        }

        let llm = match &self.llm {
            Some(llm) => llm,
            None => return fallback_topics(batch),
        };

        let headlines: Vec<String> = batch.iter().map(|a| format!("- {}", a.title)).collect();
        let messages = vec![
            ChatMessage::system(
                "You identify trending topics across tech headlines. Given the headlines, \
                 return the top trending topics as short labels of 1-3 words each. Respond \
                 with ONLY a JSON array of strings, at most 10 entries — no prose, no \
                 markdown fences.",
            ),
            ChatMessage::user(headlines.join("\n")),
        ];

        match llm.chat(messages, TOPICS_MAX_TOKENS, 0.2).await {
            Ok(raw) => match parse_topic_list(&raw) {
                Some(topics) => topics,
                None => {
                    warn!("topic extraction returned no parsable JSON array, using fallback");
                    fallback_topics(batch)
                }
            },
            Err(e) => {
                warn!("topic extraction failed, using fallback: {}", e);
                fallback_topics(batch)
            }
        }
    }

    // ── Sentiment ───────────────────────────────────────────────────────

    /// Classify the first fifty articles as positive / negative / neutral,
    /// keyed by title. Model labels outside the closed set, and titles the
    /// model skips, fall back to keyword classification.
    pub async fn classify_sentiment(&self, articles: &[Article]) -> HashMap<String, Sentiment> {
        let batch = &articles[..articles.len().min(SENTIMENT_ARTICLE_CAP)];

        // Keyword baseline first; valid model labels overlay it below.
        let mut labels: HashMap<String, Sentiment> = batch
            .iter()
            .map(|a| (a.title.clone(), keyword_sentiment(&a.title)))
            .collect();

        let llm = match &self.llm {
            Some(llm) => llm,
            None => return labels,
        };
        if batch.is_empty() {
            return labels;
        }

        let headlines: Vec<String> = batch.iter().map(|a| format!("- {}", a.title)).collect();
        let messages = vec![
            ChatMessage::system(
                "Classify the sentiment of each tech headline as exactly one of: positive, \
                 negative, neutral. Respond with ONLY a JSON object mapping each headline \
                 (verbatim, without the leading dash) to its label — no prose, no markdown \
                 fences.",
            ),
            ChatMessage::user(headlines.join("\n")),
        ];

        match llm.chat(messages, SENTIMENT_MAX_TOKENS, 0.2).await {
            Ok(raw) => {
                let parsed = extract_json(&raw)
                    .and_then(|json| serde_json::from_str::<HashMap<String, String>>(&json).ok());
                match parsed {
                    Some(model_labels) => {
                        for (title, label) in model_labels {
                            if labels.contains_key(&title) {
                                labels.insert(title, Sentiment::parse(&label));
                            }
                        }
                    }
                    None => warn!("sentiment response unparsable, keeping keyword labels"),
                }
            }
            Err(e) => warn!("sentiment classification failed, keeping keyword labels: {}", e),
        }

        info!("classified sentiment for {} titles", labels.len());
        labels
    }
}

// ── Deterministic fallbacks ─────────────────────────────────────────────

/// First three sentences of the description, or a fixed notice.
pub fn fallback_summary(article: &Article) -> String {
    if article.description.is_empty() {
        return "No summary available.".to_string();
    }
    let sentences = text::first_sentences(&article.description, 3);
    if sentences.is_empty() {
        "No summary available.".to_string()
    } else {
        sentences
    }
}

/// Frequency count of capitalized non-stopword title tokens, top eight.
/// Counting is case-insensitive; the first-seen capitalization is reported.
pub fn fallback_topics(articles: &[Article]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut display: Vec<(String, String)> = Vec::new(); // (key, first-seen form)

    for article in articles {
        for word in article.title.split_whitespace() {
            let clean: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
            if clean.len() < 3 {
                continue;
            }
            let starts_upper = word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
            if !starts_upper {
                continue;
            }
            let key = clean.to_lowercase();
            if is_stop_word(&key) {
                continue;
            }
            if !counts.contains_key(&key) {
                display.push((key.clone(), clean));
            }
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    // Sort by frequency, first-seen order breaking ties for determinism.
    let mut ranked: Vec<(usize, String, String)> = display
        .into_iter()
        .enumerate()
        .map(|(seen, (key, form))| (seen, key, form))
        .collect();
    ranked.sort_by(|a, b| counts[&b.1].cmp(&counts[&a.1]).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(FALLBACK_TOPIC_COUNT)
        .map(|(_, _, form)| form)
        .collect()
}

/// Keyword-set sentiment: more positive hits than negative is positive,
/// fewer is negative, ties and no hits are neutral.
pub fn keyword_sentiment(title: &str) -> Sentiment {
    let lower = title.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    let positive = words
        .iter()
        .filter(|w| POSITIVE_WORDS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
        .count();
    let negative = words
        .iter()
        .filter(|w| NEGATIVE_WORDS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
        .count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn parse_topic_list(raw: &str) -> Option<Vec<String>> {
    let json = extract_json(raw)?;
    let topics: Vec<String> = serde_json::from_str(&json).ok()?;
    Some(
        topics
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(MAX_TOPICS)
            .collect(),
    )
}
