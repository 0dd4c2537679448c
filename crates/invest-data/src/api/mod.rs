//! API clients for market data and research providers

pub mod alpha_vantage;
pub mod vertex;
pub mod yahoo;

pub use alpha_vantage::{
    AlphaVantageClient, BalanceReport, CashFlowReport, CompanyOverview, Function, IncomeReport,
    StatementReports,
};
pub use vertex::{SearchResult, VertexSearchClient};
pub use yahoo::YahooFinanceClient;
