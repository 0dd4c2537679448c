//! Income statement, balance sheet and cash flow for the latest period

use super::{Market, fetch_failed, no_reports, ticker_period_schema};
use crate::reply::{Reply, date_text, reported};
use crate::request::PeriodRequest;
use async_trait::async_trait;
use invest_data::{
    BalanceReport, CashFlowReport, IncomeReport, MarketDataSource, Result as DataResult,
    StatementReports,
};
use invest_metrics::{Metric, PeriodKind, Ticker};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeStatement {
    pub ticker: Ticker,
    pub period: PeriodKind,
    pub fiscal_date: String,
    pub total_revenue: Metric,
    pub gross_profit: Metric,
    pub operating_income: Metric,
    pub net_income: Metric,
    pub ebitda: Metric,
    pub research_development: Metric,
}

impl IncomeStatement {
    fn new(ticker: Ticker, period: PeriodKind, r: &IncomeReport) -> Self {
        Self {
            ticker,
            period,
            fiscal_date: date_text(r.fiscal_date_ending),
            total_revenue: reported(r.total_revenue),
            gross_profit: reported(r.gross_profit),
            operating_income: reported(r.operating_income),
            net_income: reported(r.net_income),
            ebitda: reported(r.ebitda),
            research_development: reported(r.research_and_development),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub ticker: Ticker,
    pub period: PeriodKind,
    pub fiscal_date: String,
    pub total_assets: Metric,
    pub total_liabilities: Metric,
    pub total_shareholder_equity: Metric,
    pub current_assets: Metric,
    pub current_liabilities: Metric,
    pub cash_and_equivalents: Metric,
    pub long_term_debt: Metric,
    pub short_term_debt: Metric,
}

impl BalanceSheet {
    fn new(ticker: Ticker, period: PeriodKind, r: &BalanceReport) -> Self {
        Self {
            ticker,
            period,
            fiscal_date: date_text(r.fiscal_date_ending),
            total_assets: reported(r.total_assets),
            total_liabilities: reported(r.total_liabilities),
            total_shareholder_equity: reported(r.total_shareholder_equity),
            current_assets: reported(r.total_current_assets),
            current_liabilities: reported(r.total_current_liabilities),
            cash_and_equivalents: reported(r.cash_and_cash_equivalents_at_carrying_value),
            long_term_debt: reported(r.long_term_debt),
            short_term_debt: reported(r.short_term_debt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlow {
    pub ticker: Ticker,
    pub period: PeriodKind,
    pub fiscal_date: String,
    pub operating_cash_flow: Metric,
    pub capital_expenditures: Metric,
    /// Operating cash flow minus capital expenditures
    pub free_cash_flow: Metric,
    pub dividends_paid: Metric,
    pub change_in_cash: Metric,
}

impl CashFlow {
    fn new(ticker: Ticker, period: PeriodKind, r: &CashFlowReport) -> Self {
        let operating_cash_flow = reported(r.operating_cashflow);
        let capital_expenditures = reported(r.capital_expenditures);
        Self {
            ticker,
            period,
            fiscal_date: date_text(r.fiscal_date_ending),
            operating_cash_flow,
            capital_expenditures,
            // providers disagree on the sign of capex
            free_cash_flow: operating_cash_flow.subtract(capital_expenditures.map(f64::abs)),
            dividends_paid: reported(r.dividend_payout),
            change_in_cash: reported(r.change_in_cash_and_cash_equivalents),
        }
    }
}

/// Latest report of `kind` from a statement fetch, as a reply
fn latest<T, R>(
    fetched: &DataResult<StatementReports<T>>,
    what: &str,
    ticker: &Ticker,
    kind: PeriodKind,
    build: impl FnOnce(Ticker, PeriodKind, &T) -> R,
) -> Reply<R> {
    match fetched {
        Ok(reports) => match reports.nth(kind, 0) {
            Some(report) => Reply::success(build(ticker.clone(), kind, report)),
            None => Reply::error(no_reports(what, ticker, kind)),
        },
        Err(e) => Reply::error(fetch_failed(what, ticker, e)),
    }
}

pub(crate) fn income_from(
    fetched: &DataResult<StatementReports<IncomeReport>>,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<IncomeStatement> {
    latest(fetched, "income statement", ticker, kind, IncomeStatement::new)
}

pub(crate) fn balance_from(
    fetched: &DataResult<StatementReports<BalanceReport>>,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<BalanceSheet> {
    latest(fetched, "balance sheet", ticker, kind, BalanceSheet::new)
}

pub(crate) fn cash_flow_from(
    fetched: &DataResult<StatementReports<CashFlowReport>>,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<CashFlow> {
    latest(fetched, "cash flow", ticker, kind, CashFlow::new)
}

pub(crate) async fn fetch_income(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<IncomeStatement> {
    income_from(&market.income_statements(ticker).await, ticker, kind)
}

pub(crate) async fn fetch_balance(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<BalanceSheet> {
    balance_from(&market.balance_sheets(ticker).await, ticker, kind)
}

pub(crate) async fn fetch_cash_flow(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
    kind: PeriodKind,
) -> Reply<CashFlow> {
    cash_flow_from(&market.cash_flows(ticker).await, ticker, kind)
}

pub struct GetIncomeStatementTool {
    market: Market,
}

impl GetIncomeStatementTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GetIncomeStatementTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: PeriodRequest = parse_params(params)?;
        fetch_income(self.market.as_ref(), &request.ticker, request.period)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "get_income_statement"
    }

    fn description(&self) -> &str {
        "Get the latest income statement: revenue, gross profit, operating income, net \
         income, EBITDA and R&D spend."
    }

    fn input_schema(&self) -> Value {
        ticker_period_schema()
    }
}

pub struct GetBalanceSheetTool {
    market: Market,
}

impl GetBalanceSheetTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GetBalanceSheetTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: PeriodRequest = parse_params(params)?;
        fetch_balance(self.market.as_ref(), &request.ticker, request.period)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "get_balance_sheet"
    }

    fn description(&self) -> &str {
        "Get the latest balance sheet: assets, liabilities, shareholder equity, cash and \
         debt levels."
    }

    fn input_schema(&self) -> Value {
        ticker_period_schema()
    }
}

pub struct GetCashFlowTool {
    market: Market,
}

impl GetCashFlowTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GetCashFlowTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: PeriodRequest = parse_params(params)?;
        fetch_cash_flow(self.market.as_ref(), &request.ticker, request.period)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "get_cash_flow"
    }

    fn description(&self) -> &str {
        "Get the latest cash flow statement: operating cash flow, capital expenditures, \
         free cash flow, dividends paid and change in cash."
    }

    fn input_schema(&self) -> Value {
        ticker_period_schema()
    }
}
