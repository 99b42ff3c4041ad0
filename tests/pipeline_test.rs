use std::sync::Arc;
use std::time::Duration;

use mockito::Server;
use tracing::info;

use tech_news_aggregator::types::{SourceConfig, SourceKind};
use tech_news_aggregator::{AppConfig, ManualClock, NewsAggregator};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn test_config() -> AppConfig {
    AppConfig {
        fetch_timeout_secs: 5,
        ..AppConfig::default()
    }
}

fn rss_body(channel: &str, items: &[(&str, Option<&str>)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, pub_date)| {
            let date = pub_date
                .map(|d| format!("<pubDate>{}</pubDate>", d))
                .unwrap_or_default();
            format!(
                "<item><title>{}</title>\
                 <link>https://example.com/{}</link>\
                 <description>Coverage of {}.</description>{}</item>",
                title,
                title.to_lowercase().replace(' ', "-"),
                title,
                date
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
         <title>{}</title><link>https://example.com</link>{}</channel></rss>",
        channel, items
    )
}

#[tokio::test]
async fn failing_source_does_not_block_healthy_ones() {
    init_tracing();

    let mut feed_server = Server::new_async().await;
    let mut broken_server = Server::new_async().await;

    feed_server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(rss_body(
            "Healthy Feed",
            &[
                ("Rust Compiler Speeds Up", Some("Tue, 16 Jan 2024 10:00:00 GMT")),
                ("New Datacenter Opens", Some("Mon, 15 Jan 2024 09:00:00 GMT")),
            ],
        ))
        .create_async()
        .await;

    broken_server
        .mock("GET", "/v0/topstories.json")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let configs = vec![
        SourceConfig::new(
            "Healthy",
            SourceKind::Feed,
            format!("{}/feed.xml", feed_server.url()),
            "General Tech",
            "example.com",
        ),
        SourceConfig::new(
            "Broken",
            SourceKind::ItemApi,
            format!("{}/v0/", broken_server.url()),
            "Community",
            "example.org",
        ),
    ];

    let aggregator = NewsAggregator::new(configs, &test_config()).unwrap();
    let articles = aggregator.fetch_all(None).await;

    info!("got {} articles despite one broken source", articles.len());
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.source == "Healthy"));
    assert!(articles.iter().all(|a| a.category == "General Tech"));
    assert_eq!(articles[0].title, "Rust Compiler Speeds Up");
}

#[tokio::test]
async fn near_duplicate_titles_collapse_across_sources() {
    init_tracing();

    let mut server_a = Server::new_async().await;
    let mut server_b = Server::new_async().await;

    server_a
        .mock("GET", "/a.xml")
        .with_status(200)
        .with_body(rss_body(
            "Feed A",
            &[
                ("Apple Vision Pro Launches in February", Some("Tue, 16 Jan 2024 10:00:00 GMT")),
                ("Rust 2024 Edition Announced", Some("Mon, 15 Jan 2024 09:00:00 GMT")),
            ],
        ))
        .create_async()
        .await;

    server_b
        .mock("GET", "/b.xml")
        .with_status(200)
        .with_body(rss_body(
            "Feed B",
            &[
                ("Apple Vision Pro launches February", Some("Sun, 14 Jan 2024 08:00:00 GMT")),
                ("Quantum Chip Milestone Reached", None),
            ],
        ))
        .create_async()
        .await;

    let configs = vec![
        SourceConfig::new("A", SourceKind::Feed, format!("{}/a.xml", server_a.url()), "General Tech", "a.com"),
        SourceConfig::new("B", SourceKind::Feed, format!("{}/b.xml", server_b.url()), "Deep Tech", "b.com"),
    ];

    let aggregator = NewsAggregator::new(configs, &test_config()).unwrap();
    let articles = aggregator.fetch_all(None).await;

    // One of the two Vision Pro variants survives, the other is dropped.
    assert_eq!(articles.len(), 3);
    let vision_count = articles
        .iter()
        .filter(|a| a.title.to_lowercase().contains("vision pro"))
        .count();
    assert_eq!(vision_count, 1);

    // Newest first, undated trailing.
    assert_eq!(articles.last().unwrap().title, "Quantum Chip Milestone Reached");
    assert!(articles.last().unwrap().published.is_none());
    assert!(articles[0].published.unwrap() >= articles[1].published.unwrap());
}

#[tokio::test]
async fn repeat_fetch_is_served_from_cache() {
    init_tracing();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_body(
            "Cached Feed",
            &[("Storage Prices Drop Again", Some("Tue, 16 Jan 2024 10:00:00 GMT"))],
        ))
        .expect(1)
        .create_async()
        .await;

    let configs = vec![SourceConfig::new(
        "Cached",
        SourceKind::Feed,
        format!("{}/feed.xml", server.url()),
        "General Tech",
        "example.com",
    )];

    let aggregator = NewsAggregator::new(configs, &test_config()).unwrap();
    let first = aggregator.fetch_all(None).await;
    let second = aggregator.fetch_all(None).await;

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].title, second[0].title);
    mock.assert_async().await;
}

#[tokio::test]
async fn expired_cache_triggers_a_refetch() {
    init_tracing();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_body(
            "Expiring Feed",
            &[("Chips Get Cheaper", Some("Tue, 16 Jan 2024 10:00:00 GMT"))],
        ))
        .expect(2)
        .create_async()
        .await;

    let configs = vec![SourceConfig::new(
        "Expiring",
        SourceKind::Feed,
        format!("{}/feed.xml", server.url()),
        "General Tech",
        "example.com",
    )];

    let clock = Arc::new(ManualClock::new());
    let aggregator = NewsAggregator::new(configs, &test_config())
        .unwrap()
        .with_cache_clock(Duration::from_secs(600), Box::new(clock.clone()));

    aggregator.fetch_all(None).await;
    clock.advance(Duration::from_secs(601));
    let refreshed = aggregator.fetch_all(None).await;

    assert_eq!(refreshed.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn manual_invalidation_forces_a_refetch() {
    init_tracing();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_body(
            "Feed",
            &[("Browser Update Released", Some("Tue, 16 Jan 2024 10:00:00 GMT"))],
        ))
        .expect(2)
        .create_async()
        .await;

    let configs = vec![SourceConfig::new(
        "Feed",
        SourceKind::Feed,
        format!("{}/feed.xml", server.url()),
        "General Tech",
        "example.com",
    )];

    let aggregator = NewsAggregator::new(configs, &test_config()).unwrap();
    aggregator.fetch_all(None).await;
    aggregator.invalidate_cache();
    aggregator.fetch_all(None).await;

    mock.assert_async().await;
}

#[tokio::test]
async fn item_api_source_keeps_only_linked_stories() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v0/topstories.json")
        .with_status(200)
        .with_body("[101, 102, 103]")
        .create_async()
        .await;
    server
        .mock("GET", "/v0/item/101.json")
        .with_status(200)
        .with_body(
            r#"{"type":"story","title":"Show HN: A tiny profiler","url":"https://example.com/profiler",
                "text":"","time":1705395600,"score":321,"descendants":87}"#,
        )
        .create_async()
        .await;
    // A job posting and a story without a link are both skipped.
    server
        .mock("GET", "/v0/item/102.json")
        .with_status(200)
        .with_body(r#"{"type":"job","title":"Hiring engineers","url":"https://jobs.example.com"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/v0/item/103.json")
        .with_status(200)
        .with_body(r#"{"type":"story","title":"Ask HN: favorite editor?","text":"tell me"}"#)
        .create_async()
        .await;

    let configs = vec![SourceConfig::new(
        "Hacker News",
        SourceKind::ItemApi,
        format!("{}/v0/", server.url()),
        "Community",
        "news.ycombinator.com",
    )];

    let aggregator = NewsAggregator::new(configs, &test_config()).unwrap();
    let articles = aggregator.fetch_all(None).await;

    assert_eq!(articles.len(), 1);
    let article = &articles[0];
    assert_eq!(article.title, "Show HN: A tiny profiler");
    assert_eq!(article.url, "https://example.com/profiler");
    assert_eq!(article.score, Some(321));
    assert_eq!(article.comments, Some(87));
    assert!(article.published.is_some());
}

#[tokio::test]
async fn source_filter_limits_which_sources_are_queried() {
    init_tracing();

    let mut wanted = Server::new_async().await;
    let mut unwanted = Server::new_async().await;

    wanted
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_body(
            "Wanted",
            &[("GPU Shortage Easing", Some("Tue, 16 Jan 2024 10:00:00 GMT"))],
        ))
        .create_async()
        .await;
    let unwanted_mock = unwanted
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_body("Unwanted", &[("Should Not Appear", None)]))
        .expect(0)
        .create_async()
        .await;

    let configs = vec![
        SourceConfig::new("Wanted", SourceKind::Feed, format!("{}/feed.xml", wanted.url()), "General Tech", "w.com"),
        SourceConfig::new("Unwanted", SourceKind::Feed, format!("{}/feed.xml", unwanted.url()), "General Tech", "u.com"),
    ];

    let aggregator = NewsAggregator::new(configs, &test_config()).unwrap();
    let filter = vec!["Wanted".to_string()];
    let articles = aggregator.fetch_all(Some(&filter)).await;

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].source, "Wanted");
    unwanted_mock.assert_async().await;
}
