//! The research tools
//!
//! Every tool takes its data source at construction and never fails on
//! upstream trouble: a provider error becomes a `"status": "error"` reply.
//! `Err` is only returned for arguments that do not validate.

mod checklist;
mod fundamentals;
mod growth;
mod market;
mod price;
mod ratios;
mod report;
mod research;
mod statements;
mod valuation;

pub use checklist::{
    BusinessQuality, Checklist, ChecklistValuation, FinancialHealth, InvestmentChecklistScreenTool,
    RiskIndicators,
};
pub use fundamentals::{Fundamentals, GetStockFundamentalsTool};
pub use growth::{AnalyzeGrowthTrendsTool, GrowthAnalysis, PriceMomentum, ValuationContext};
pub use market::{CompareStocksTool, Comparison, GetStockInfoTool, StockData, StockInfo};
pub use price::{GetStockPriceTool, StockPrice};
pub use ratios::{CalculateFinancialRatiosTool, Ratios};
pub use report::{GenerateInvestmentReportTool, InvestmentReport, ReportSections};
pub use research::{ResearchResults, SearchInvestmentResearchTool};
pub use statements::{
    BalanceSheet, CashFlow, GetBalanceSheetTool, GetCashFlowTool, GetIncomeStatementTool,
    IncomeStatement,
};
pub use valuation::{CalculateValuationMetricsTool, Valuation};

use invest_data::{DataError, MarketDataSource};
use invest_metrics::{PeriodKind, Ticker};
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared handle to the market data source
pub type Market = Arc<dyn MarketDataSource>;

/// Log a provider failure and phrase it for the agent
fn fetch_failed(what: &str, ticker: &Ticker, error: &DataError) -> String {
    tracing::warn!(ticker = %ticker, "Failed to fetch {what}: {error}");
    format!("Error fetching {what} for {ticker}: {error}")
}

fn no_reports(what: &str, ticker: &Ticker, kind: PeriodKind) -> String {
    format!("No {kind} {what} data found for {ticker}.")
}

fn ticker_property() -> Value {
    json!({
        "type": "string",
        "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT', 'GOOGL')"
    })
}

fn ticker_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ticker": ticker_property()
        },
        "required": ["ticker"]
    })
}

fn ticker_period_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ticker": ticker_property(),
            "period": {
                "type": "string",
                "enum": ["annual", "quarterly"],
                "default": "annual",
                "description": "Reporting period to read"
            }
        },
        "required": ["ticker"]
    })
}
