//! Valuation ratios computed from the latest data

use super::{Market, fetch_failed, ticker_schema};
use crate::reply::{Reply, reported};
use crate::request::TickerRequest;
use async_trait::async_trait;
use invest_data::{MarketDataSource, MarketFetch, ProviderData};
use invest_metrics::{Gap, Metric, PeriodKind, Ticker, ValuationReport, compute_valuation_metrics};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

/// Computed valuation plus the provider's yield and analyst target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    #[serde(flatten)]
    pub report: ValuationReport,
    pub dividend_yield: Metric,
    pub analyst_target: Metric,
}

impl Valuation {
    pub fn unavailable(ticker: Ticker, message: impl Into<String>) -> Self {
        Self {
            report: ValuationReport::upstream_unavailable(ticker, message),
            dividend_yield: Metric::NotAvailable(Gap::NoData),
            analyst_target: Metric::NotAvailable(Gap::NoData),
        }
    }
}

/// Valuation over already-fetched data, on the trailing snapshot
pub(crate) fn valuation_from(data: &ProviderData, ticker: &Ticker) -> Reply<Valuation> {
    let snapshot = data.snapshot(ticker, PeriodKind::Trailing, 0);
    match compute_valuation_metrics(&snapshot) {
        Ok(report) => {
            let overview = data.overview.as_ref();
            Reply::success(Valuation {
                report,
                dividend_yield: reported(overview.and_then(|o| o.dividend_yield)),
                analyst_target: reported(overview.and_then(|o| o.analyst_target_price)),
            })
        }
        Err(e) => {
            tracing::warn!(ticker = %ticker, "Rejected provider data: {e}");
            Reply::error_with(Valuation::unavailable(
                ticker.clone(),
                format!("Provider data for {ticker} is unusable: {e}"),
            ))
        }
    }
}

/// Valuation over every dataset of one fetch; an error only when none arrived
pub(crate) fn valuation_of(fetched: &MarketFetch, ticker: &Ticker) -> Reply<Valuation> {
    let data = fetched.provider_data(ticker);
    match fetched.first_error() {
        Some(e) if data.is_empty() => Reply::error_with(Valuation::unavailable(
            ticker.clone(),
            fetch_failed("valuation data", ticker, e),
        )),
        _ => valuation_from(&data, ticker),
    }
}

pub(crate) async fn fetch_valuation(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
) -> Reply<Valuation> {
    valuation_of(&MarketFetch::fetch(market, ticker).await, ticker)
}

pub struct CalculateValuationMetricsTool {
    market: Market,
}

impl CalculateValuationMetricsTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CalculateValuationMetricsTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: TickerRequest = parse_params(params)?;
        fetch_valuation(self.market.as_ref(), &request.ticker)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "calculate_valuation_metrics"
    }

    fn description(&self) -> &str {
        "Calculate valuation metrics from the latest price and financial statements: P/E, \
         price-to-book, PEG, free cash flow and debt-to-equity, with commentary. Metrics \
         that cannot be computed are reported as \"N/A\"."
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{self, MockMarket};
    use serde_json::json;

    #[tokio::test]
    async fn test_valuation_metrics() {
        let tool = CalculateValuationMetricsTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["ticker"], "AAPL");
        let metrics = &out["metrics"];
        assert_eq!(metrics["price"], 150.0);
        assert_eq!(metrics["pe_ratio"], 30.0);
        assert_eq!(metrics["price_to_book"], 7.5);
        assert_eq!(metrics["peg_ratio"], 3.75);
        assert_eq!(metrics["free_cash_flow"], 5_000.0);
        assert_eq!(metrics["debt_to_equity"], 2.0);
        assert_eq!(out["analyst_target"], 175.0);
        assert!(!out["commentary"].as_array().unwrap().is_empty());
        assert!(out.get("message").is_none());
    }

    #[tokio::test]
    async fn test_zero_equity_is_not_available() {
        let mut market = MockMarket::new();
        market
            .expect_daily_prices()
            .returning(|_| Ok(fixtures::bars(&[150.0])));
        market.expect_company_overview().returning(|_| Ok(fixtures::overview()));
        market.expect_income_statements().returning(|_| Ok(fixtures::income()));
        market.expect_balance_sheets().returning(|_| {
            let mut reports = fixtures::balance();
            reports.annual[0].total_liabilities = Some(100.0);
            reports.annual[0].total_shareholder_equity = Some(0.0);
            Ok(reports)
        });
        market.expect_cash_flows().returning(|_| Ok(fixtures::cash_flow()));

        let out = CalculateValuationMetricsTool::new(fixtures::shared(market))
            .execute(json!({"ticker": "AAPL"}))
            .await
            .unwrap();
        assert_eq!(out["status"], "success");
        assert_eq!(out["metrics"]["debt_to_equity"], "N/A");
        assert_eq!(out["metrics"]["pe_ratio"], 30.0);
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_sentinels() {
        let tool = CalculateValuationMetricsTool::new(fixtures::shared(fixtures::failing()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "error");
        assert!(out["message"].as_str().unwrap().contains("AAPL"));
        let metrics = out["metrics"].as_object().unwrap();
        assert!(metrics.values().all(|v| v == "N/A"));
    }

    #[test]
    fn test_tool_metadata() {
        let tool = CalculateValuationMetricsTool::new(fixtures::shared(MockMarket::new()));
        assert_eq!(tool.name(), "calculate_valuation_metrics");
    }
}
