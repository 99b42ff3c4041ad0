use std::collections::HashSet;

use tracing::{debug, info};

use crate::types::Article;

/// Two titles whose normalized word-set overlap exceeds this ratio are the
/// same story.
pub const DUPLICATE_THRESHOLD: f64 = 0.70;

/// Lowercase, strip punctuation, tokenize into a word set.
pub fn title_words(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Intersection-over-minimum of two word sets. Empty sets never match
/// anything; over-merging on missing titles would be worse than keeping
/// the occasional duplicate.
pub fn overlap_ratio(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / a.len().min(b.len()) as f64
}

/// Collapse near-duplicate stories across sources. Articles are processed
/// in input order and compared against all previously accepted titles;
/// first seen wins. O(n²) in accepted count, fine at tens of articles.
pub fn dedup_articles(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let mut accepted: Vec<Article> = Vec::with_capacity(total);
    let mut accepted_words: Vec<HashSet<String>> = Vec::with_capacity(total);

    for article in articles {
        let words = title_words(&article.title);
        let duplicate = accepted_words
            .iter()
            .any(|seen| overlap_ratio(&words, seen) > DUPLICATE_THRESHOLD);

        if duplicate {
            debug!("dropping duplicate: {}", article.title);
        } else {
            accepted.push(article);
            accepted_words.push(words);
        }
    }

    if accepted.len() < total {
        info!("dedup removed {} of {} articles", total - accepted.len(), total);
    }
    accepted
}

/// Sort newest first; articles without a timestamp sort last. The sort is
/// stable, so equal timestamps keep their merged order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published.cmp(&a.published));
}
