//! Reference passages for a topic.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::error::RetrievalError;

/// One unit of retrieved reference text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub title: String,
    pub content: String,
}

impl Passage {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Join passage contents into one context block, separated by blank lines.
pub fn format_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Source of reference passages for a topic.
///
/// An empty result means "no context available" and is not an error.
#[async_trait]
pub trait ContextFetcher: Send + Sync + Debug {
    async fn fetch(&self, topic: &str) -> Result<Vec<Passage>, RetrievalError>;
}

#[async_trait]
impl ContextFetcher for Box<dyn ContextFetcher> {
    async fn fetch(&self, topic: &str) -> Result<Vec<Passage>, RetrievalError> {
        self.as_ref().fetch(topic).await
    }
}

#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// Wikipedia language edition, e.g. "en" or "ko".
    pub lang: String,
    pub top_k_results: usize,
    /// Passages longer than this are cut at a character boundary.
    pub max_chars: usize,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            top_k_results: 5,
            max_chars: 4000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    pages: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    title: String,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    extract: String,
}

/// Fetches article extracts from the MediaWiki search API.
#[derive(Debug, Clone)]
pub struct WikipediaFetcher {
    config: WikipediaConfig,
    http: reqwest::Client,
}

impl Default for WikipediaFetcher {
    fn default() -> Self {
        Self::new(WikipediaConfig::default())
    }
}

impl WikipediaFetcher {
    pub fn new(config: WikipediaConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.config.lang)
    }

    fn collect_passages(&self, response: SearchResponse) -> Vec<Passage> {
        let mut pages = response.query.map(|q| q.pages).unwrap_or_default();
        pages.sort_by_key(|p| p.index);
        pages
            .into_iter()
            .filter(|p| !p.extract.trim().is_empty())
            .take(self.config.top_k_results)
            .map(|p| {
                let content: String = p.extract.chars().take(self.config.max_chars).collect();
                Passage::new(p.title, content)
            })
            .collect()
    }
}

#[async_trait]
impl ContextFetcher for WikipediaFetcher {
    #[instrument(target = "quiz_gpt::retrieval", skip(self), fields(lang = %self.config.lang))]
    async fn fetch(&self, topic: &str) -> Result<Vec<Passage>, RetrievalError> {
        let limit = self.config.top_k_results.to_string();
        let resp = self
            .http
            .get(self.endpoint())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", topic),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Wikipedia request failed");
                RetrievalError::Http(e.to_string())
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let txt = resp.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(%status, error = %txt, "Wikipedia API error");
            return Err(RetrievalError::Api(format!("{}: {}", status, txt)));
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| RetrievalError::Api(e.to_string()))?;
        let passages = self.collect_passages(parsed);

        info!(topic, count = passages.len(), "Fetched reference passages");
        Ok(passages)
    }
}

/// Fixed passages per topic, for tests and offline runs. Counts its calls.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    passages: HashMap<String, Vec<Passage>>,
    calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: impl Into<String>, passages: Vec<Passage>) -> Self {
        self.passages.insert(topic.into(), passages);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextFetcher for StaticFetcher {
    async fn fetch(&self, topic: &str) -> Result<Vec<Passage>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let passages = self.passages.get(topic).cloned().unwrap_or_default();
        debug!(topic, count = passages.len(), "Static passages served");
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passages_are_joined_with_blank_lines() {
        let passages = vec![Passage::new("a", "First."), Passage::new("b", "Second.")];
        assert_eq!(format_passages(&passages), "First.\n\nSecond.");
        assert_eq!(format_passages(&[]), "");
    }

    #[test]
    fn search_results_are_ranked_trimmed_and_truncated() {
        let fetcher = WikipediaFetcher::new(WikipediaConfig {
            top_k_results: 2,
            max_chars: 5,
            ..WikipediaConfig::default()
        });
        let response: SearchResponse = serde_json::from_str(
            r#"{"query":{"pages":[
                {"pageid":3,"title":"Third","index":3,"extract":"third text"},
                {"pageid":1,"title":"First","index":1,"extract":"first text"},
                {"pageid":2,"title":"Empty","index":2,"extract":"  "}
            ]}}"#,
        )
        .unwrap();

        let passages = fetcher.collect_passages(response);
        assert_eq!(
            passages,
            vec![Passage::new("First", "first"), Passage::new("Third", "third")]
        );
    }

    #[test]
    fn no_search_results_is_empty_not_an_error() {
        let fetcher = WikipediaFetcher::default();
        let response: SearchResponse = serde_json::from_str(r#"{"batchcomplete":true}"#).unwrap();
        assert!(fetcher.collect_passages(response).is_empty());
    }

    #[tokio::test]
    async fn static_fetcher_serves_known_topics_and_counts_calls() {
        let fetcher = StaticFetcher::new().with_topic("ocean", vec![Passage::new("Ocean", "Blue.")]);
        assert_eq!(fetcher.fetch("ocean").await.unwrap().len(), 1);
        assert!(fetcher.fetch("unknown").await.unwrap().is_empty());
        assert_eq!(fetcher.calls(), 2);
    }
}
