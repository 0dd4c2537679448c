//! Market data access for invest-agent-rs
//!
//! Fetches raw provider data (Alpha Vantage, Yahoo Finance, Vertex AI Search),
//! caches it, and assembles it into [`invest_metrics::FinancialSnapshot`]s.
//!
//! Configuration is read once at startup into an [`InvestConfig`]:
//!
//! ```no_run
//! use invest_data::{InvestConfig, LiveMarketData};
//!
//! # fn main() -> invest_data::Result<()> {
//! let config = InvestConfig::from_env()?;
//! let _source = LiveMarketData::new(&config)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod retry;
pub mod source;

pub use api::{
    BalanceReport, CashFlowReport, CompanyOverview, IncomeReport, SearchResult, StatementReports,
};
pub use assemble::ProviderData;
pub use cache::{CacheKey, CacheManager, ResponseCache};
pub use config::{InvestConfig, InvestConfigBuilder, PriceProvider, VertexSearchConfig};
pub use error::{DataError, Result};
pub use retry::RetryPolicy;
pub use source::{
    LiveMarketData, LiveResearchSearch, MarketDataSource, MarketFetch, ResearchSearch,
    fetch_provider_data,
};
