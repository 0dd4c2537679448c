//! Period-over-period growth with price momentum

use super::price::price_from;
use super::{Market, fetch_failed, ticker_period_schema};
use crate::reply::{Reply, reported};
use crate::request::PeriodRequest;
use async_trait::async_trait;
use invest_data::{MarketDataSource, MarketFetch};
use invest_metrics::{Gap, GrowthTrend, Metric, PeriodKind, Ticker, compute_growth_trend};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

/// Percent price change over the last session and the last month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceMomentum {
    #[serde(rename = "1_day_change")]
    pub one_day_change: Metric,
    #[serde(rename = "1_month_change")]
    pub one_month_change: Metric,
}

/// Forward-looking multiples as the provider reports them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationContext {
    pub peg_ratio: Metric,
    pub forward_pe: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthAnalysis {
    #[serde(flatten)]
    pub trend: GrowthTrend,
    /// Provider's quarterly year-over-year revenue growth
    pub revenue_growth_yoy: Metric,
    pub price_momentum: PriceMomentum,
    pub valuation_metrics: ValuationContext,
}

pub(crate) async fn analyze_growth(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<GrowthAnalysis> {
    let fetched = MarketFetch::fetch(market, ticker).await;
    let price = price_from(&fetched.prices, ticker);
    let data = match fetched.into_provider_data(ticker) {
        Ok(data) => data,
        Err(e) => {
            return Reply::error(format!(
                "Unable to analyze growth - financial data unavailable. {}",
                fetch_failed("financial data", ticker, &e)
            ));
        }
    };

    let (current, prior) = data.snapshot_pair(ticker, kind);
    let trend = match prior {
        Some(prior) => compute_growth_trend(&current, &prior),
        None => Ok(GrowthTrend::single_period(&current)),
    };
    let trend = match trend {
        Ok(trend) => trend,
        Err(e) => return Reply::error(format!("Unable to analyze growth for {ticker}: {e}")),
    };

    let no_price = Metric::NotAvailable(Gap::NoData);
    let price_momentum = match price.body() {
        Some(p) => PriceMomentum {
            one_day_change: p.performance.change_1day_percent,
            one_month_change: p.performance.change_1month_percent,
        },
        None => PriceMomentum {
            one_day_change: no_price,
            one_month_change: no_price,
        },
    };
    let overview = data.overview.as_ref();

    Reply::success(GrowthAnalysis {
        trend,
        revenue_growth_yoy: reported(overview.and_then(|o| o.quarterly_revenue_growth_yoy)),
        price_momentum,
        valuation_metrics: ValuationContext {
            peg_ratio: reported(overview.and_then(|o| o.peg_ratio)),
            forward_pe: reported(overview.and_then(|o| o.forward_pe)),
        },
    })
}

pub struct AnalyzeGrowthTrendsTool {
    market: Market,
}

impl AnalyzeGrowthTrendsTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for AnalyzeGrowthTrendsTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: PeriodRequest = parse_params(params)?;
        analyze_growth(self.market.as_ref(), &request.ticker, request.period)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "analyze_growth_trends"
    }

    fn description(&self) -> &str {
        "Analyze growth between the two most recent reporting periods: percent change in \
         revenue, net income, EBITDA, EPS, operating and free cash flow and book value per \
         share, with an overall assessment, price momentum and forward valuation context."
    }

    fn input_schema(&self) -> Value {
        ticker_period_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{self, MockMarket};
    use serde_json::json;

    fn change<'a>(out: &'a Value, metric: &str) -> &'a Value {
        out["changes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["metric"] == metric)
            .unwrap()
    }

    #[tokio::test]
    async fn test_annual_growth() {
        let tool = AnalyzeGrowthTrendsTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["assessment"], "strong_growth");
        assert_eq!(change(&out, "revenue")["percent_change"], 25.0);
        assert_eq!(change(&out, "revenue")["formatted"], "+25.00%");
        assert_eq!(change(&out, "eps")["percent_change"], 25.0);
        assert_eq!(out["revenue_growth_yoy"], 0.06);
        assert_eq!(out["price_momentum"]["1_day_change"], 1.35);
        assert_eq!(out["valuation_metrics"]["forward_pe"], 28.0);
    }

    #[tokio::test]
    async fn test_growth_requests_each_dataset_once() {
        let tool = AnalyzeGrowthTrendsTool::new(fixtures::shared(fixtures::healthy_once()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["price_momentum"]["1_day_change"], 1.35);
    }

    #[tokio::test]
    async fn test_single_period_is_insufficient() {
        // one quarterly income report only
        let tool = AnalyzeGrowthTrendsTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool
            .execute(json!({"ticker": "AAPL", "period": "quarterly"}))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["assessment"], "insufficient_data");
        assert!(out["prior_period"].is_null());
        assert_eq!(change(&out, "revenue")["percent_change"], "N/A");
    }

    #[tokio::test]
    async fn test_decline_is_negative() {
        let mut market = MockMarket::new();
        market
            .expect_daily_prices()
            .returning(|_| Err(fixtures::unavailable()));
        market
            .expect_company_overview()
            .returning(|_| Err(fixtures::unavailable()));
        market.expect_income_statements().returning(|_| {
            let mut reports = fixtures::income();
            reports.annual.reverse();
            Ok(reports)
        });
        market.expect_balance_sheets().returning(|_| Ok(fixtures::balance()));
        market.expect_cash_flows().returning(|_| Ok(fixtures::cash_flow()));

        let out = AnalyzeGrowthTrendsTool::new(fixtures::shared(market))
            .execute(json!({"ticker": "AAPL"}))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(change(&out, "revenue")["percent_change"], -20.0);
        assert_eq!(change(&out, "revenue")["formatted"], "-20.00%");
        assert_eq!(out["assessment"], "declining");
        assert_eq!(out["price_momentum"]["1_month_change"], "N/A");
        assert_eq!(out["revenue_growth_yoy"], "N/A");
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let tool = AnalyzeGrowthTrendsTool::new(fixtures::shared(fixtures::failing()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();
        assert_eq!(out["status"], "error");
    }

    #[test]
    fn test_tool_metadata() {
        let tool = AnalyzeGrowthTrendsTool::new(fixtures::shared(MockMarket::new()));
        assert_eq!(tool.name(), "analyze_growth_trends");
    }
}
