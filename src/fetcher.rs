use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{AggregatorError, Result};
use crate::utils::text;

const USER_AGENT: &str = "TechNewsAggregator/1.0";

/// Maximum plain-text length returned by a deep article-body fetch.
const BODY_TEXT_CAP: usize = 3000;

/// Shared HTTP client wrapper. Every request carries the same fixed timeout;
/// a timed-out or erroring call degrades that single unit of work only.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }

    /// GET a URL and return the response body as text. Non-2xx is an error.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::General(format!(
                "HTTP {} for {}",
                status, url
            )));
        }
        Ok(response.text().await?)
    }

    /// GET a URL and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {} (json)", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::General(format!(
                "HTTP {} for {}",
                status, url
            )));
        }
        Ok(response.json().await?)
    }

    /// Best-effort fetch of an article page's readable text, used to enrich
    /// an Article's `content` before summarization. Returns an empty string
    /// on any failure; callers proceed with whatever content they had.
    pub async fn fetch_article_body(&self, url: &str) -> String {
        match self.get_text(url).await {
            Ok(html) => extract_readable_text(&html),
            Err(e) => {
                warn!("body fetch failed for {}: {}", url, e);
                String::new()
            }
        }
    }
}

/// Drop chrome elements (scripts, styles, navigation, footers) and return
/// the remaining plain text, capped at `BODY_TEXT_CAP` characters.
fn extract_readable_text(html: &str) -> String {
    let mut cleaned = html.to_string();
    for tag in ["script", "style", "nav", "footer", "header", "aside"] {
        cleaned = remove_element(&cleaned, tag);
    }
    text::truncate_chars(&text::strip_html(&cleaned), BODY_TEXT_CAP)
}

/// Remove every `<tag ...> ... </tag>` block, case-insensitively. Unclosed
/// tags drop the rest of the document, which is acceptable for best-effort
/// extraction.
fn remove_element(html: &str, tag: &str) -> String {
    // Tags are matched on the original bytes with ASCII case folding; a
    // lowercased copy can differ in byte length and misalign every index.
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let bytes = html.as_bytes();

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = find_ignore_ascii_case(bytes, pos, open.as_bytes()) {
        // Require a delimiter so "<nav" does not match "<navigation-like".
        match bytes.get(start + open.len()) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'/') => {}
            _ => {
                out.push_str(&html[pos..start + open.len()]);
                pos = start + open.len();
                continue;
            }
        }
        out.push_str(&html[pos..start]);
        match find_ignore_ascii_case(bytes, start, close.as_bytes()) {
            Some(end) => pos = end + close.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// First occurrence of an ASCII needle at or after `from`, ignoring ASCII
/// case. Every match starts at an ASCII byte, so the returned index is
/// always a char boundary.
fn find_ignore_ascii_case(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let last = haystack.len().checked_sub(needle.len())?;
    (from..=last).find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
