/// Check if a word is a common stop word.
pub fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by"
            | "a" | "an" | "is" | "are" | "was" | "were" | "be" | "been" | "have" | "has" | "had"
            | "do" | "does" | "did" | "will" | "would" | "could" | "should" | "may" | "might"
            | "must" | "can" | "this" | "that" | "these" | "those" | "as" | "its" | "it" | "from"
            | "new" | "how" | "why" | "what" | "when" | "after" | "over" | "more" | "your"
    )
}

/// Text processing utilities
pub mod text {
    /// Strip HTML tags and decode the common entities, collapsing whitespace.
    pub fn strip_html(html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut in_tag = false;

        for c in html.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    // Tag boundaries act as separators so adjacent block
                    // elements don't run their words together.
                    out.push(' ');
                }
                '>' => in_tag = false,
                _ if !in_tag => out.push(c),
                _ => {}
            }
        }

        out.replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Truncate to a maximum number of characters on a char boundary.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        text.chars().take(max_chars).collect()
    }

    /// Extract the first N sentences from text ("." separated, like the
    /// plain-text descriptions we feed it).
    pub fn first_sentences(text: &str, count: usize) -> String {
        let sentences: Vec<&str> = text
            .split(". ")
            .filter(|s| !s.trim().is_empty())
            .take(count)
            .collect();
        sentences.join(". ").trim().to_string()
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Extract the registrable domain from a URL, dropping a leading "www.".
    pub fn extract_domain(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let domain = url.domain()?;
        Some(domain.trim_start_matches("www.").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags_and_entities() {
        let html = "<p>Apple &amp; Google announce <b>new</b> chips</p>";
        assert_eq!(text::strip_html(html), "Apple & Google announce new chips");
    }

    #[test]
    fn strip_html_keeps_plain_text() {
        assert_eq!(text::strip_html("plain words"), "plain words");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(text::truncate_chars("héllo world", 5), "héllo");
        assert_eq!(text::truncate_chars("short", 100), "short");
    }

    #[test]
    fn first_sentences_takes_leading_sentences() {
        let desc = "One thing happened. Then another. And a third. A fourth too.";
        assert_eq!(
            text::first_sentences(desc, 3),
            "One thing happened. Then another. And a third"
        );
    }

    #[test]
    fn first_sentences_keeps_existing_punctuation_only() {
        // Nothing is re-punctuated; the joined text is returned as-is.
        assert_eq!(
            text::first_sentences("Only sentence without terminator", 3),
            "Only sentence without terminator"
        );
        assert_eq!(
            text::first_sentences("Ends with period. Next one.", 3),
            "Ends with period. Next one."
        );
    }

    #[test]
    fn first_sentences_empty_input() {
        assert_eq!(text::first_sentences("", 3), "");
    }

    #[test]
    fn extract_domain_strips_www() {
        assert_eq!(
            url::extract_domain("https://www.theverge.com/2024/some-story"),
            Some("theverge.com".to_string())
        );
        assert_eq!(url::extract_domain("not a url"), None);
    }
}
