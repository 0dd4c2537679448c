//! Vertex AI Search (Discovery Engine) client for the research library

use crate::config::VertexSearchConfig;
use crate::error::{DataError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

pub const PROVIDER: &str = "Vertex AI Search";

/// One hit from the research data store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    document: Document,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    derived_struct_data: DerivedData,
}

#[derive(Debug, Default, Deserialize)]
struct DerivedData {
    title: Option<String>,
    link: Option<String>,
    #[serde(default)]
    snippets: Vec<Snippet>,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    snippet: String,
}

/// Map a `:search` response body to results; untitled documents get
/// `"Untitled"`, missing snippets and links become empty strings
pub fn parse_search_response(data: &Value) -> Result<Vec<SearchResult>> {
    let response: SearchResponse = serde_json::from_value(data.clone())?;

    Ok(response
        .results
        .into_iter()
        .map(|hit| {
            let doc = hit.document.derived_struct_data;
            SearchResult {
                title: doc.title.unwrap_or_else(|| "Untitled".to_string()),
                snippet: doc
                    .snippets
                    .into_iter()
                    .next()
                    .map(|s| s.snippet)
                    .unwrap_or_default(),
                link: doc.link.unwrap_or_default(),
            }
        })
        .collect())
}

/// Vertex AI Search client
#[derive(Debug, Clone)]
pub struct VertexSearchClient {
    client: Client,
    config: VertexSearchConfig,
}

impl VertexSearchClient {
    pub fn new(config: VertexSearchConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &VertexSearchConfig {
        &self.config
    }

    /// Raw `:search` call against the `default_search` serving config
    pub async fn fetch(&self, query: &str) -> Result<Value> {
        let token = self.config.access_token.as_deref().ok_or_else(|| {
            DataError::Config("VERTEX_ACCESS_TOKEN is required for research search".to_string())
        })?;

        let body = json!({
            "query": query,
            "pageSize": self.config.page_size,
        });

        tracing::debug!(query, data_store = %self.config.data_store_id, "Vertex AI Search request");
        let response = self
            .client
            .post(self.config.search_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DataError::upstream(
                PROVIDER,
                format!("HTTP error: {status} {}", detail.trim()),
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let data = self.fetch(query).await?;
        parse_search_response(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let data = json!({
            "results": [
                {
                    "id": "1",
                    "document": {
                        "derivedStructData": {
                            "title": "Owner Earnings",
                            "link": "gs://library/owner-earnings.pdf",
                            "snippets": [{"snippet": "Free cash flow after maintenance capex"}]
                        }
                    }
                },
                {"id": "2", "document": {"derivedStructData": {}}}
            ],
            "totalSize": 2
        });

        let results = parse_search_response(&data).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Owner Earnings");
        assert_eq!(results[0].snippet, "Free cash flow after maintenance capex");
        assert_eq!(results[1].title, "Untitled");
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[1].link, "");
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_search_response(&json!({})).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_is_config_error() {
        let client = VertexSearchClient::new(
            VertexSearchConfig::new("proj", "store"),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client.search("moat").await.unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }
}
