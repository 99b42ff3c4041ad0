use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::fetcher::Fetcher;
use crate::llm::{extract_json, ChatMessage, LlmClient};
use crate::search::{NewsSearchClient, DEFAULT_RESULT_LIMIT};
use crate::summarizer::NO_CREDENTIAL_MESSAGE;
use crate::types::{Article, ChatAnswer, ChatRole, ChatTurn, SearchResult};
use crate::utils::text;

/// How much local corpus is serialized into the grounding context.
const CONTEXT_ARTICLE_CAP: usize = 40;
const CONTEXT_DESCRIPTION_CAP: usize = 300;

/// Trailing conversation turns carried into each question.
const HISTORY_TURN_CAP: usize = 20;

const ANSWER_MAX_TOKENS: u32 = 700;

/// The machine-readable response contract requested from the model. Treated
/// as untrusted input: field types are enforced by deserialization and
/// article numbers are bounds-checked before resolving.
#[derive(Debug, Deserialize)]
struct ContractReply {
    found_in_articles: bool,
    #[serde(default)]
    article_numbers: Vec<i64>,
    #[serde(default)]
    brief: String,
    #[serde(default)]
    response: String,
}

/// Multi-turn Q&A over the fetched corpus, with automatic fallback to live
/// web search when the corpus lacks coverage.
pub struct ChatRouter {
    llm: Option<LlmClient>,
    search: NewsSearchClient,
    fetcher: Arc<Fetcher>,
}

impl ChatRouter {
    pub fn new(model: &ModelConfig, fetcher: Arc<Fetcher>) -> Self {
        Self {
            llm: LlmClient::from_config(model),
            search: NewsSearchClient::new(),
            fetcher,
        }
    }

    /// Point the web-search fallback at a different endpoint.
    pub fn with_search(mut self, search: NewsSearchClient) -> Self {
        self.search = search;
        self
    }

    /// Answer a question grounded in `corpus`. Never returns `Err`: every
    /// failure collapses to an answer shape whose `response` explains what
    /// went wrong.
    pub async fn ask(
        &self,
        corpus: &[Article],
        question: &str,
        history: &[ChatTurn],
    ) -> ChatAnswer {
        let llm = match &self.llm {
            Some(llm) => llm,
            None => return ChatAnswer::failure(NO_CREDENTIAL_MESSAGE),
        };

        let context_articles = &corpus[..corpus.len().min(CONTEXT_ARTICLE_CAP)];
        let reply = match self.query_contract(llm, context_articles, question, history).await {
            Ok(reply) => reply,
            Err(message) => return ChatAnswer::failure(message),
        };

        if reply.found_in_articles {
            let matched = resolve_article_numbers(&reply.article_numbers, context_articles);
            info!(
                "chat answered from corpus: {} of {} referenced articles resolved",
                matched.len(),
                reply.article_numbers.len()
            );
            return ChatAnswer {
                found: true,
                matched_articles: matched,
                web_results: Vec::new(),
                brief: reply.brief,
                response: reply.response,
            };
        }

        // Not covered locally: try live search before giving up.
        let web_results = self
            .search
            .search(&self.fetcher, question, DEFAULT_RESULT_LIMIT)
            .await;
        if web_results.is_empty() {
            return ChatAnswer {
                found: false,
                matched_articles: Vec::new(),
                web_results,
                brief: String::new(),
                response: reply.response,
            };
        }

        match self.answer_from_snippets(llm, question, &web_results).await {
            Ok(response) => ChatAnswer {
                found: false,
                matched_articles: Vec::new(),
                web_results,
                brief: String::new(),
                response,
            },
            Err(message) => ChatAnswer::failure(message),
        }
    }

    /// Step 2 + 3: query the model for the strict JSON contract and parse
    /// it. Errors are returned as the human-readable failure text.
    async fn query_contract(
        &self,
        llm: &LlmClient,
        articles: &[Article],
        question: &str,
        history: &[ChatTurn],
    ) -> std::result::Result<ContractReply, String> {
        let mut messages = vec![ChatMessage::system(
            "You answer questions about today's tech news using ONLY the numbered articles \
             provided. You MUST respond with a single JSON object with exactly these four \
             fields — no prose, no markdown fences:\n\
             {\"found_in_articles\": bool, \"article_numbers\": [int], \
             \"brief\": string, \"response\": string}\n\
             Set found_in_articles to true and list the article numbers you drew on when the \
             articles cover the question; put a one-line takeaway in brief and the full \
             answer in response. If the articles do not cover the question, set \
             found_in_articles to false, article_numbers to [], and explain in response \
             what you could not find.",
        )];

        let trailing = history.len().saturating_sub(HISTORY_TURN_CAP);
        for turn in &history[trailing..] {
            messages.push(match turn.role {
                ChatRole::User => ChatMessage::user(turn.content.clone()),
                ChatRole::Assistant => ChatMessage::assistant(turn.content.clone()),
            });
        }

        messages.push(ChatMessage::user(format!(
            "Articles:\n{}\n\nQuestion: {}",
            serialize_context(articles),
            question
        )));

        let raw = llm
            .chat(messages, ANSWER_MAX_TOKENS, 0.3)
            .await
            .map_err(|e| format!("The assistant is unavailable right now: {}", e))?;

        let json = extract_json(&raw)
            .ok_or_else(|| "The assistant returned no structured answer.".to_string())?;
        serde_json::from_str::<ContractReply>(&json).map_err(|e| {
            warn!("chat contract violated: {}", e);
            "The assistant returned a malformed answer.".to_string()
        })
    }

    /// Step 4b follow-up: one more call constrained to the search snippets.
    async fn answer_from_snippets(
        &self,
        llm: &LlmClient,
        question: &str,
        results: &[SearchResult],
    ) -> std::result::Result<String, String> {
        let snippets: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. [{}] {} — {}", i + 1, r.source, r.title, r.description))
            .collect();

        let messages = vec![
            ChatMessage::system(
                "Answer the user's question using ONLY the provided web search snippets. Do \
                 not speculate beyond them. If the snippets do not actually address the \
                 question, say so plainly.",
            ),
            ChatMessage::user(format!(
                "Search snippets:\n{}\n\nQuestion: {}",
                snippets.join("\n"),
                question
            )),
        ];

        llm.chat(messages, ANSWER_MAX_TOKENS, 0.3)
            .await
            .map_err(|e| format!("Web search found coverage but summarizing it failed: {}", e))
    }
}

/// Numbered grounding context: title plus truncated description per article.
fn serialize_context(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "{}. {} — {}",
                i + 1,
                a.title,
                text::truncate_chars(&a.description, CONTEXT_DESCRIPTION_CAP)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve 1-based article numbers to records, silently dropping anything
/// outside [1, N]. A hallucinated index must never crash the router.
fn resolve_article_numbers(numbers: &[i64], articles: &[Article]) -> Vec<Article> {
    numbers
        .iter()
        .filter_map(|&n| {
            if n >= 1 && (n as usize) <= articles.len() {
                let mut article = articles[n as usize - 1].clone();
                article.description =
                    text::truncate_chars(&article.description, CONTEXT_DESCRIPTION_CAP);
                Some(article)
            } else {
                None
            }
        })
        .collect()
}
