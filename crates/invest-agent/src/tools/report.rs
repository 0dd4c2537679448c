//! Comprehensive research report combining every data section

use super::fundamentals::{Fundamentals, fundamentals_from};
use super::price::{StockPrice, price_from};
use super::statements::{
    BalanceSheet, CashFlow, IncomeStatement, balance_from, cash_flow_from, income_from,
};
use super::valuation::{Valuation, valuation_of};
use super::{Market, ticker_schema};
use crate::reply::Reply;
use crate::request::TickerRequest;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use invest_data::MarketFetch;
use invest_metrics::{PeriodKind, Ticker};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

pub const REPORT_TYPE: &str = "Comprehensive Investment Research Report";

const REPORT_NOTE: &str = "This automated report provides real-time financial data and analysis. \
     Sections that could not be fetched carry their own error status.";

/// Every section carries its own status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSections {
    pub price_performance: Reply<StockPrice>,
    pub company_overview: Reply<Fundamentals>,
    pub income_statement: Reply<IncomeStatement>,
    pub balance_sheet: Reply<BalanceSheet>,
    pub cash_flow: Reply<CashFlow>,
    pub valuation_analysis: Reply<Valuation>,
}

impl ReportSections {
    fn succeeded(&self) -> usize {
        [
            self.price_performance.is_success(),
            self.company_overview.is_success(),
            self.income_statement.is_success(),
            self.balance_sheet.is_success(),
            self.cash_flow.is_success(),
            self.valuation_analysis.is_success(),
        ]
        .into_iter()
        .filter(|ok| *ok)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentReport {
    pub ticker: Ticker,
    pub report_date: NaiveDate,
    pub sections: ReportSections,
    pub report_type: &'static str,
    pub note: &'static str,
}

pub struct GenerateInvestmentReportTool {
    market: Market,
}

impl GenerateInvestmentReportTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }

    async fn generate(&self, ticker: Ticker) -> Reply<InvestmentReport> {
        let kind = PeriodKind::Annual;
        let fetched = MarketFetch::fetch(self.market.as_ref(), &ticker).await;
        let sections = ReportSections {
            price_performance: price_from(&fetched.prices, &ticker),
            company_overview: fundamentals_from(&fetched.overview, &ticker),
            income_statement: income_from(&fetched.income, &ticker, kind),
            balance_sheet: balance_from(&fetched.balance, &ticker, kind),
            cash_flow: cash_flow_from(&fetched.cash_flow, &ticker, kind),
            valuation_analysis: valuation_of(&fetched, &ticker),
        };

        let succeeded = sections.succeeded();
        tracing::info!(ticker = %ticker, sections = succeeded, "Generated investment report");

        let report = InvestmentReport {
            ticker,
            report_date: Utc::now().date_naive(),
            sections,
            report_type: REPORT_TYPE,
            note: REPORT_NOTE,
        };
        if succeeded == 0 {
            let message = format!("No data could be fetched for {}", report.ticker);
            Reply::error_with(report).with_message(message)
        } else {
            Reply::success(report)
        }
    }
}

#[async_trait]
impl Tool for GenerateInvestmentReportTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: TickerRequest = parse_params(params)?;
        self.generate(request.ticker).await.into_value()
    }

    fn name(&self) -> &str {
        "generate_investment_report"
    }

    fn description(&self) -> &str {
        "Generate a comprehensive investment research report combining price performance, \
         company overview, income statement, balance sheet, cash flow and valuation analysis."
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
    async fn test_full_report() {
        let tool = GenerateInvestmentReportTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["report_type"], REPORT_TYPE);
        let sections = &out["sections"];
        for name in [
            "price_performance",
            "company_overview",
            "income_statement",
            "balance_sheet",
            "cash_flow",
            "valuation_analysis",
        ] {
            assert_eq!(sections[name]["status"], "success", "section {name}");
        }
        assert_eq!(sections["valuation_analysis"]["metrics"]["pe_ratio"], 30.0);
        assert_eq!(sections["cash_flow"]["free_cash_flow"], 5_000.0);
    }

    #[tokio::test]
    async fn test_report_requests_each_dataset_once() {
        let tool = GenerateInvestmentReportTool::new(fixtures::shared(fixtures::healthy_once()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["sections"]["valuation_analysis"]["status"], "success");
        assert_eq!(out["sections"]["balance_sheet"]["status"], "success");
    }

    #[tokio::test]
    async fn test_partial_report() {
        let mut market = MockMarket::new();
        market
            .expect_daily_prices()
            .returning(|_| Ok(fixtures::bars(&[150.0, 148.0])));
        market
            .expect_company_overview()
            .returning(|_| Ok(fixtures::overview()));
        market
            .expect_income_statements()
            .returning(|_| Err(fixtures::unavailable()));
        market
            .expect_balance_sheets()
            .returning(|_| Err(fixtures::unavailable()));
        market
            .expect_cash_flows()
            .returning(|_| Err(fixtures::unavailable()));

        let out = GenerateInvestmentReportTool::new(fixtures::shared(market))
            .execute(json!({"ticker": "AAPL"}))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["sections"]["price_performance"]["status"], "success");
        assert_eq!(out["sections"]["income_statement"]["status"], "error");
        // price and overview are enough for P/E
        assert_eq!(out["sections"]["valuation_analysis"]["metrics"]["pe_ratio"], 30.0);
        assert_eq!(
            out["sections"]["valuation_analysis"]["metrics"]["debt_to_equity"],
            "N/A"
        );
    }

    #[tokio::test]
    async fn test_nothing_available() {
        let tool = GenerateInvestmentReportTool::new(fixtures::shared(fixtures::failing()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["status"], "error");
        assert_eq!(out["message"], "No data could be fetched for AAPL");
        assert_eq!(out["sections"]["valuation_analysis"]["status"], "error");
    }

    #[test]
    fn test_tool_metadata() {
        let tool = GenerateInvestmentReportTool::new(fixtures::shared(MockMarket::new()));
        assert_eq!(tool.name(), "generate_investment_report");
    }
}
