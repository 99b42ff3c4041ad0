use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;

use tech_news_aggregator::summarizer::NO_CREDENTIAL_MESSAGE;
use tech_news_aggregator::types::{Article, Sentiment};
use tech_news_aggregator::{AppConfig, Fetcher, ModelConfig, Summarizer};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn article(title: &str, description: &str) -> Article {
    Article {
        title: title.to_string(),
        url: "https://example.com/story".to_string(),
        description: description.to_string(),
        // Long enough that no body enrichment fetch is attempted.
        content: "x".repeat(400),
        published: None,
        source: "Test Source".to_string(),
        category: "General Tech".to_string(),
        domain: "example.com".to_string(),
        reading_time: 2,
        score: None,
        comments: None,
    }
}

fn mock_model_config(server: &Server) -> ModelConfig {
    ModelConfig {
        api_key: Some("test-key".to_string()),
        model: "gpt-4o-mini".to_string(),
        base_url: format!("{}/chat/completions", server.url()),
    }
}

fn completion_body(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

fn offline_summarizer() -> Summarizer {
    Summarizer::new(
        &ModelConfig::disabled(),
        &AppConfig::default(),
        Arc::new(Fetcher::new(5).unwrap()),
    )
}

#[tokio::test]
async fn no_credential_falls_back_to_leading_sentences() {
    init_tracing();
    let summarizer = offline_summarizer();

    let mut article = article(
        "Big Launch",
        "First sentence here. Second sentence follows. Third one too. Fourth is dropped.",
    );
    let summary = summarizer.summarize_one(&mut article).await;

    assert!(summary.contains("First sentence here"));
    assert!(summary.contains("Third one too"));
    assert!(!summary.contains("Fourth is dropped"));
}

#[tokio::test]
async fn no_credential_with_empty_article_yields_placeholder() {
    init_tracing();
    let summarizer = offline_summarizer();

    let mut empty = article("Bare Headline", "");
    empty.content = String::new();
    let summary = summarizer.summarize_one(&mut empty).await;

    assert_eq!(summary, "No summary available.");
}

#[tokio::test]
async fn no_credential_briefing_returns_instructional_message() {
    init_tracing();
    let summarizer = offline_summarizer();

    let articles = vec![article("A Story", "Something happened.")];
    let briefing = summarizer.summarize_batch(&articles).await;

    assert_eq!(briefing, NO_CREDENTIAL_MESSAGE);
}

#[tokio::test]
async fn model_summary_is_returned_verbatim() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(
            "Summary: It shipped.\nWhy it matters: Everyone waited.\nKey players: Acme.",
        ))
        .create_async()
        .await;

    let summarizer = Summarizer::new(
        &mock_model_config(&server),
        &AppConfig::default(),
        Arc::new(Fetcher::new(5).unwrap()),
    );

    let mut a = article("Acme Ships", "The product shipped today.");
    let summary = summarizer.summarize_one(&mut a).await;

    assert!(summary.starts_with("Summary: It shipped."));
    assert!(summary.contains("Key players: Acme."));
}

#[tokio::test]
async fn model_error_degrades_to_fallback_summary() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("quota exceeded")
        .create_async()
        .await;

    let summarizer = Summarizer::new(
        &mock_model_config(&server),
        &AppConfig::default(),
        Arc::new(Fetcher::new(5).unwrap()),
    );

    let mut a = article("Outage Story", "Service went down. Users complained.");
    let summary = summarizer.summarize_one(&mut a).await;

    assert!(summary.contains("Service went down"));
}

#[tokio::test]
async fn topics_parse_fenced_json_and_cap_at_ten() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("JSON".to_string()))
        .with_status(200)
        .with_body(completion_body(
            "```json\n[\"AI\",\"Chips\",\"Funding\",\"Security\",\"Cloud\",\"Robotics\",\
             \"Batteries\",\"Quantum\",\"Privacy\",\"Space\",\"Eleventh\",\"Twelfth\"]\n```",
        ))
        .create_async()
        .await;

    let summarizer = Summarizer::new(
        &mock_model_config(&server),
        &AppConfig::default(),
        Arc::new(Fetcher::new(5).unwrap()),
    );

    let articles = vec![article("AI Chips Everywhere", "Silicon news.")];
    let topics = summarizer.extract_topics(&articles).await;

    assert_eq!(topics.len(), 10);
    assert_eq!(topics[0], "AI");
    assert!(!topics.contains(&"Eleventh".to_string()));
}

#[tokio::test]
async fn unparsable_topics_fall_back_to_headline_tokens() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body("I cannot produce a list right now, sorry."))
        .create_async()
        .await;

    let summarizer = Summarizer::new(
        &mock_model_config(&server),
        &AppConfig::default(),
        Arc::new(Fetcher::new(5).unwrap()),
    );

    let articles = vec![
        article("Nvidia Ships Faster Silicon", ""),
        article("Nvidia Doubles Datacenter Revenue", ""),
    ];
    let topics = summarizer.extract_topics(&articles).await;

    // Twice-repeated token ranks first; lowercase and short tokens never appear.
    assert_eq!(topics[0], "Nvidia");
    assert!(topics.len() <= 8);
}

#[tokio::test]
async fn offline_sentiment_covers_every_title() {
    init_tracing();
    let summarizer = offline_summarizer();

    let articles = vec![
        article("Startup Wins Breakthrough Deal", ""),
        article("Major Breach Hits Cloud Provider", ""),
        article("Company Publishes Quarterly Report", ""),
    ];
    let labels = summarizer.classify_sentiment(&articles).await;

    assert_eq!(labels.len(), 3);
    assert_eq!(labels["Startup Wins Breakthrough Deal"], Sentiment::Positive);
    assert_eq!(labels["Major Breach Hits Cloud Provider"], Sentiment::Negative);
    assert_eq!(labels["Company Publishes Quarterly Report"], Sentiment::Neutral);
}

#[tokio::test]
async fn model_sentiment_only_overrides_known_titles() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body(
            r#"{"Major Breach Hits Cloud Provider": "positive", "Invented Headline": "negative"}"#,
        ))
        .create_async()
        .await;

    let summarizer = Summarizer::new(
        &mock_model_config(&server),
        &AppConfig::default(),
        Arc::new(Fetcher::new(5).unwrap()),
    );

    let articles = vec![article("Major Breach Hits Cloud Provider", "")];
    let labels = summarizer.classify_sentiment(&articles).await;

    assert_eq!(labels.len(), 1);
    // The model's verdict replaces the keyword baseline for a real title,
    // and the hallucinated one is discarded.
    assert_eq!(labels["Major Breach Hits Cloud Provider"], Sentiment::Positive);
    assert!(!labels.contains_key("Invented Headline"));
}
