//! Search over the curated investment research library

use crate::reply::Reply;
use crate::request::{MAX_QUERY_LEN, SearchRequest};
use async_trait::async_trait;
use invest_data::{ResearchSearch, SearchResult};
use invest_tools::{Result, Tool};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

const NOT_CONFIGURED: &str = "Research search is not available. The agent will continue \
     without research context grounding. Set GCP_PROJECT_ID, VERTEX_DATA_STORE_ID and \
     VERTEX_ACCESS_TOKEN to enable it.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchResults {
    pub query: String,
    pub results_count: usize,
    pub results: Vec<SearchResult>,
}

pub struct SearchInvestmentResearchTool {
    search: Option<Arc<dyn ResearchSearch>>,
}

impl SearchInvestmentResearchTool {
    /// Without a search backend every call answers with an `info` reply
    pub fn new(search: Option<Arc<dyn ResearchSearch>>) -> Self {
        Self { search }
    }

    async fn search(&self, query: String) -> Reply<ResearchResults> {
        let Some(search) = self.search.as_ref() else {
            return Reply::info(NOT_CONFIGURED);
        };

        match search.search(&query).await {
            Ok(results) => {
                tracing::debug!(query = %query, hits = results.len(), "Research search complete");
                let empty = results.is_empty();
                let reply = Reply::success(ResearchResults {
                    query,
                    results_count: results.len(),
                    results,
                });
                if empty {
                    reply.with_message("No results found for this query.")
                } else {
                    reply
                }
            }
            Err(e) => {
                tracing::warn!(query = %query, "Research search failed: {e}");
                Reply::error(format!("Error searching investment research: {e}"))
            }
        }
    }
}

#[async_trait]
impl Tool for SearchInvestmentResearchTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request = SearchRequest::parse(params)?;
        self.search(request.query).await.into_value()
    }

    fn name(&self) -> &str {
        "search_investment_research"
    }

    fn description(&self) -> &str {
        "Search curated investment research, frameworks and methodologies. Use it to find \
         answers about investment approaches, valuation methods and best practices."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Question about investment methodology, frameworks or concepts",
                    "minLength": 1,
                    "maxLength": MAX_QUERY_LEN
                }
            },
            "required": ["query"]
        })
    }
}
