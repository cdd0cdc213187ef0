use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::{HeartrestError, Result};
use crate::models::SearchResult;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ranked results for `query`, at most `limit` of them
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

/// Google Custom Search JSON API client
pub struct GoogleSearch {
    client: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

impl GoogleSearch {
    pub fn new(cfg: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| HeartrestError::Config(format!("Failed to build HTTP client: {e}")))?;
        let credentials = cfg.credentials();
        if credentials.is_none() {
            tracing::info!("Search credentials not configured; web search disabled");
        }
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            credentials,
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let Some((key, cx)) = &self.credentials else {
            return Err(HeartrestError::SearchUnavailable(
                "search credentials not configured".to_string(),
            ));
        };

        let num = limit.clamp(1, 10).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", key.as_str()),
                ("cx", cx.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HeartrestError::SearchUnavailable(format!("search request timed out: {e}"))
                } else {
                    HeartrestError::SearchUnavailable(format!("search request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(HeartrestError::SearchUnavailable(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body: CustomSearchResponse = response.json().await.map_err(|e| {
            HeartrestError::SearchUnavailable(format!("failed to parse search response: {e}"))
        })?;

        Ok(into_results(body, limit))
    }
}

fn into_results(body: CustomSearchResponse, limit: usize) -> Vec<SearchResult> {
    body.items
        .into_iter()
        .take(limit)
        .map(|item| SearchResult {
            title: item.title,
            snippet: item.snippet,
            link: item.link,
        })
        .collect()
}
