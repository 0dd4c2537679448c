//! Typed tool arguments
//!
//! Tickers are validated while deserializing, so a request that parses is a
//! request the tools can act on.

use invest_metrics::{ChecklistThresholds, PeriodKind, Ticker};
use invest_tools::{Result, ToolError, parse_params};
use serde::Deserialize;
use serde_json::Value;

/// Longest research query accepted
pub const MAX_QUERY_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TickerRequest {
    pub ticker: Ticker,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeriodRequest {
    pub ticker: Ticker,
    #[serde(default)]
    pub period: PeriodKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompareRequest {
    pub ticker1: Ticker,
    pub ticker2: Ticker,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

impl SearchRequest {
    pub fn parse(params: Value) -> Result<Self> {
        let request: Self = parse_params(params)?;
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidParams("query must not be empty".to_string()));
        }
        if query.len() > MAX_QUERY_LEN {
            return Err(ToolError::InvalidParams(format!(
                "query is longer than {MAX_QUERY_LEN} characters"
            )));
        }
        Ok(Self {
            query: query.to_string(),
        })
    }
}

/// Omitted thresholds fall back to [`ChecklistThresholds::default`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChecklistRequest {
    pub ticker: Ticker,
    #[serde(default)]
    pub thresholds: ChecklistThresholds,
}

impl ChecklistRequest {
    pub fn parse(params: Value) -> Result<Self> {
        let request: Self = parse_params(params)?;
        request
            .thresholds
            .validate()
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticker_is_normalized() {
        let req: TickerRequest = parse_params(json!({"ticker": " aapl "})).unwrap();
        assert_eq!(req.ticker.as_str(), "AAPL");
    }

    #[test]
    fn test_invalid_ticker_rejected() {
        let err = parse_params::<TickerRequest>(json!({"ticker": ""})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));

        let err = parse_params::<TickerRequest>(json!({"ticker": "AA PL"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn test_period_defaults_to_annual() {
        let req: PeriodRequest = parse_params(json!({"ticker": "MSFT"})).unwrap();
        assert_eq!(req.period, PeriodKind::Annual);

        let req: PeriodRequest =
            parse_params(json!({"ticker": "MSFT", "period": "quarterly"})).unwrap();
        assert_eq!(req.period, PeriodKind::Quarterly);

        let weekly = json!({"ticker": "MSFT", "period": "weekly"});
        assert!(parse_params::<PeriodRequest>(weekly).is_err());
    }

    #[test]
    fn test_compare_requires_both_tickers() {
        let err = parse_params::<CompareRequest>(json!({"ticker1": "AAPL"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(msg) if msg.contains("ticker2")));
    }

    #[test]
    fn test_search_query_trimmed_and_required() {
        let req = SearchRequest::parse(json!({"query": "  owner earnings "})).unwrap();
        assert_eq!(req.query, "owner earnings");

        assert!(SearchRequest::parse(json!({"query": "   "})).is_err());
        assert!(SearchRequest::parse(json!({"query": "x".repeat(MAX_QUERY_LEN + 1)})).is_err());
    }

    #[test]
    fn test_checklist_thresholds() {
        let req = ChecklistRequest::parse(json!({"ticker": "AAPL"})).unwrap();
        assert_eq!(req.thresholds, ChecklistThresholds::default());

        let req = ChecklistRequest::parse(json!({
            "ticker": "AAPL",
            "thresholds": {"max_pe": 25.0, "min_eps_growth": 0.1}
        }))
        .unwrap();
        assert_eq!(req.thresholds.max_pe, Some(25.0));
        assert_eq!(req.thresholds.min_eps_growth, Some(0.1));

        let err = ChecklistRequest::parse(json!({
            "ticker": "AAPL",
            "thresholds": {"max_pe": -1.0}
        }))
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
