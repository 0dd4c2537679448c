//! Liquidity, profitability and leverage ratios

use super::{Market, fetch_failed, ticker_period_schema};
use crate::reply::Reply;
use crate::request::PeriodRequest;
use async_trait::async_trait;
use invest_data::{MarketDataSource, ProviderData};
use invest_metrics::{
    LeverageRatios, LiquidityRatios, PeriodKind, ProfitabilityRatios, ReportingPeriod, Ticker,
    compute_financial_ratios,
};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ratios {
    pub ticker: Ticker,
    pub period: ReportingPeriod,
    pub liquidity_ratios: LiquidityRatios,
    pub profitability_ratios: ProfitabilityRatios,
    pub leverage_ratios: LeverageRatios,
}

/// Ratios for the latest period of `kind`
///
/// Only the income statement and balance sheet are fetched. One of them
/// failing leaves its ratios as `"N/A"`; both failing is an error reply.
pub(crate) async fn fetch_ratios(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<Ratios> {
    let (income, balance) = tokio::join!(
        market.income_statements(ticker),
        market.balance_sheets(ticker)
    );

    let data = match (income, balance) {
        (Err(e), Err(_)) => {
            return Reply::error(format!(
                "Unable to calculate ratios - financial statement data unavailable. {}",
                fetch_failed("financial statements", ticker, &e)
            ));
        }
        (income, balance) => ProviderData {
            income: income
                .inspect_err(|e| tracing::warn!(ticker = %ticker, "No income statement: {e}"))
                .ok(),
            balance: balance
                .inspect_err(|e| tracing::warn!(ticker = %ticker, "No balance sheet: {e}"))
                .ok(),
            ..ProviderData::default()
        },
    };

    let snapshot = data.snapshot(ticker, kind, 0);
    match compute_financial_ratios(&snapshot) {
        Ok(ratios) => Reply::success(Ratios {
            ticker: ticker.clone(),
            period: snapshot.period,
            liquidity_ratios: ratios.liquidity,
            profitability_ratios: ratios.profitability,
            leverage_ratios: ratios.leverage,
        }),
        Err(e) => Reply::error(format!("Unable to calculate ratios for {ticker}: {e}")),
    }
}

pub struct CalculateFinancialRatiosTool {
    market: Market,
}

impl CalculateFinancialRatiosTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CalculateFinancialRatiosTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: PeriodRequest = parse_params(params)?;
        fetch_ratios(self.market.as_ref(), &request.ticker, request.period)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "calculate_financial_ratios"
    }

    fn description(&self) -> &str {
        "Calculate financial ratios from the latest statements: liquidity (current, quick, \
         cash), profitability (net, gross and operating margin in percent) and leverage \
         (debt-to-assets, debt-to-equity, equity multiplier)."
    }

    fn input_schema(&self) -> Value {
        ticker_period_schema()
    }
}
