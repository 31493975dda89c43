//! Wikipedia search backend
//!
//! Looks up the best matching pages for a topic through the MediaWiki
//! API and returns their plain-text introductions as one block of text.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use studyai_core::{Result, SearchBackend, SearchConfig, StudyError};

/// Returned when the search yields no pages
pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// Maximum length of a search query accepted by the API
const MAX_QUERY_CHARS: usize = 300;

/// Wikipedia search client
pub struct WikipediaSearch {
    client: Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: Option<serde_json::Value>,
}

impl WikipediaSearch {
    /// Create from config
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| StudyError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url(&config.wikipedia_lang),
            top_k: config.top_k.max(1),
            max_chars: config.max_chars,
        })
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k.to_string();
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("utf8", "1"),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_extract(&self, title: &str) -> Result<Option<Page>> {
        let response: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("utf8", "1"),
            ])
            .await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_values().find(|p| p.missing.is_none())))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| StudyError::SearchError(format!("Wikipedia request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StudyError::SearchError(format!(
                "Wikipedia returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            StudyError::SearchError(format!("Failed to parse Wikipedia response: {e}"))
        })
    }
}

#[async_trait]
impl SearchBackend for WikipediaSearch {
    async fn search(&self, query: &str) -> Result<String> {
        let query: String = query.trim().chars().take(MAX_QUERY_CHARS).collect();
        let titles = self.search_titles(&query).await?;
        tracing::debug!(query = %query, hits = titles.len(), "Wikipedia search");

        let mut blocks = Vec::with_capacity(titles.len());
        for title in titles {
            if let Some(page) = self.fetch_extract(&title).await? {
                if let Some(block) = render_page(&page) {
                    blocks.push(block);
                }
            }
        }

        if blocks.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        Ok(truncate_chars(&blocks.join("\n\n"), self.max_chars))
    }
}

fn api_url(lang: &str) -> String {
    format!("https://{lang}.wikipedia.org/w/api.php")
}

fn render_page(page: &Page) -> Option<String> {
    let extract = page.extract.as_deref()?.trim();
    if extract.is_empty() {
        return None;
    }
    Some(format!("Page: {}\nSummary: {}", page.title, extract))
}

/// Truncate to at most `max` characters on a char boundary
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
