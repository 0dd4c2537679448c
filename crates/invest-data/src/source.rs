//! Market data and research sources
//!
//! [`MarketDataSource`] and [`ResearchSearch`] are the seams the research
//! tools depend on. The live implementations put a TTL cache in front of
//! each provider call and retry transient failures.

use crate::api::alpha_vantage::{self, parse_daily, parse_overview, parse_statements};
use crate::api::{
    AlphaVantageClient, BalanceReport, CashFlowReport, CompanyOverview, Function, IncomeReport,
    SearchResult, StatementReports, VertexSearchClient, YahooFinanceClient, vertex, yahoo,
};
use crate::assemble::ProviderData;
use crate::cache::{CacheKey, CacheManager, ResponseCache};
use crate::config::{InvestConfig, PriceProvider};
use crate::error::{DataError, Result};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use invest_metrics::{PriceBar, Ticker};
use serde_json::Value;

/// Calendar days of Yahoo history requested; enough for a month of sessions
const YAHOO_HISTORY_DAYS: i64 = 45;

/// Raw market data for one ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars, newest first
    async fn daily_prices(&self, ticker: &Ticker) -> Result<Vec<PriceBar>>;

    async fn company_overview(&self, ticker: &Ticker) -> Result<CompanyOverview>;

    async fn income_statements(&self, ticker: &Ticker) -> Result<StatementReports<IncomeReport>>;

    async fn balance_sheets(&self, ticker: &Ticker) -> Result<StatementReports<BalanceReport>>;

    async fn cash_flows(&self, ticker: &Ticker) -> Result<StatementReports<CashFlowReport>>;
}

/// Search over the curated research library
#[async_trait]
pub trait ResearchSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Every provider dataset for one ticker, each with its own outcome
///
/// Tools that present several datasets fetch once into a `MarketFetch` and
/// build every section from it, so no dataset is requested twice.
#[derive(Debug)]
pub struct MarketFetch {
    pub prices: Result<Vec<PriceBar>>,
    pub overview: Result<CompanyOverview>,
    pub income: Result<StatementReports<IncomeReport>>,
    pub balance: Result<StatementReports<BalanceReport>>,
    pub cash_flow: Result<StatementReports<CashFlowReport>>,
}

impl MarketFetch {
    /// Request each dataset exactly once, concurrently
    pub async fn fetch(source: &dyn MarketDataSource, ticker: &Ticker) -> Self {
        let (prices, overview, income, balance, cash_flow) = tokio::join!(
            source.daily_prices(ticker),
            source.company_overview(ticker),
            source.income_statements(ticker),
            source.balance_sheets(ticker),
            source.cash_flows(ticker),
        );
        Self {
            prices,
            overview,
            income,
            balance,
            cash_flow,
        }
    }

    /// The datasets that arrived; failed ones are logged and left empty
    pub fn provider_data(&self, ticker: &Ticker) -> ProviderData {
        let latest_price = match &self.prices {
            Ok(bars) => bars.first().map(|b| b.close),
            Err(error) => {
                tracing::warn!(
                    ticker = %ticker,
                    dataset = "daily_prices",
                    "Dataset unavailable: {error}"
                );
                None
            }
        };
        ProviderData {
            overview: arrived(ticker, "overview", &self.overview),
            income: arrived(ticker, "income_statement", &self.income),
            balance: arrived(ticker, "balance_sheet", &self.balance),
            cash_flow: arrived(ticker, "cash_flow", &self.cash_flow),
            latest_price,
        }
    }

    /// The overview's error, else the first dataset error
    pub fn first_error(&self) -> Option<&DataError> {
        [
            self.overview.as_ref().err(),
            self.prices.as_ref().err(),
            self.income.as_ref().err(),
            self.balance.as_ref().err(),
            self.cash_flow.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .next()
    }

    /// Provider data, failing only when every dataset failed
    pub fn into_provider_data(self, ticker: &Ticker) -> Result<ProviderData> {
        let data = self.provider_data(ticker);
        let error = [
            self.overview.err(),
            self.prices.err(),
            self.income.err(),
            self.balance.err(),
            self.cash_flow.err(),
        ]
        .into_iter()
        .flatten()
        .next();

        match error {
            Some(error) if data.is_empty() => Err(error),
            _ => Ok(data),
        }
    }
}

fn arrived<T: Clone>(ticker: &Ticker, dataset: &str, outcome: &Result<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value.clone()),
        Err(error) => {
            tracing::warn!(ticker = %ticker, dataset, "Dataset unavailable: {error}");
            None
        }
    }
}

/// Fetch every provider dataset for `ticker` concurrently
///
/// A failing dataset is logged and left empty. The call only fails, with the
/// overview's error (or the first error seen), when nothing came back at all.
pub async fn fetch_provider_data(
    source: &dyn MarketDataSource,
    ticker: &Ticker,
) -> Result<ProviderData> {
    MarketFetch::fetch(source, ticker)
        .await
        .into_provider_data(ticker)
}

/// Alpha Vantage (and optionally Yahoo Finance) behind caches and retries
pub struct LiveMarketData {
    alpha_vantage: AlphaVantageClient,
    yahoo: YahooFinanceClient,
    price_provider: PriceProvider,
    cache: CacheManager,
    retry: RetryPolicy,
}

impl LiveMarketData {
    pub fn new(config: &InvestConfig) -> Result<Self> {
        if config.uses_demo_key() {
            tracing::warn!("Using the Alpha Vantage demo key; most symbols will be unavailable");
        }

        Ok(Self {
            alpha_vantage: AlphaVantageClient::from_config(config)?,
            yahoo: YahooFinanceClient::new(),
            price_provider: config.price_provider,
            cache: CacheManager::from_config(config),
            retry: config.retry_policy(),
        })
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    async fn fetch_alpha_vantage(
        &self,
        cache: &ResponseCache,
        function: Function,
        ticker: &Ticker,
    ) -> Result<Value> {
        let key = CacheKey::new(alpha_vantage::PROVIDER, function.as_str(), ticker.as_str(), ());
        cache
            .get_or_fetch(key, || {
                self.retry.run(function.as_str(), || {
                    self.alpha_vantage.fetch(function, ticker.as_str())
                })
            })
            .await
    }

    async fn yahoo_daily(&self, ticker: &Ticker) -> Result<Vec<PriceBar>> {
        let key = CacheKey::new(yahoo::PROVIDER, "history", ticker.as_str(), YAHOO_HISTORY_DAYS);
        let value = self
            .cache
            .realtime
            .get_or_fetch(key, || async {
                let bars = self
                    .retry
                    .run("yahoo_history", || {
                        self.yahoo.get_daily(ticker.as_str(), YAHOO_HISTORY_DAYS)
                    })
                    .await?;
                Ok::<_, DataError>(serde_json::to_value(bars)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl MarketDataSource for LiveMarketData {
    async fn daily_prices(&self, ticker: &Ticker) -> Result<Vec<PriceBar>> {
        match self.price_provider {
            PriceProvider::Yahoo => self.yahoo_daily(ticker).await,
            PriceProvider::AlphaVantage => {
                let data = self
                    .fetch_alpha_vantage(&self.cache.realtime, Function::DailySeries, ticker)
                    .await?;
                parse_daily(ticker.as_str(), &data)
            }
        }
    }

    async fn company_overview(&self, ticker: &Ticker) -> Result<CompanyOverview> {
        let data = self
            .fetch_alpha_vantage(&self.cache.fundamental, Function::Overview, ticker)
            .await?;
        parse_overview(ticker.as_str(), &data)
    }

    async fn income_statements(&self, ticker: &Ticker) -> Result<StatementReports<IncomeReport>> {
        let data = self
            .fetch_alpha_vantage(&self.cache.fundamental, Function::IncomeStatement, ticker)
            .await?;
        parse_statements(ticker.as_str(), &data)
    }

    async fn balance_sheets(&self, ticker: &Ticker) -> Result<StatementReports<BalanceReport>> {
        let data = self
            .fetch_alpha_vantage(&self.cache.fundamental, Function::BalanceSheet, ticker)
            .await?;
        parse_statements(ticker.as_str(), &data)
    }

    async fn cash_flows(&self, ticker: &Ticker) -> Result<StatementReports<CashFlowReport>> {
        let data = self
            .fetch_alpha_vantage(&self.cache.fundamental, Function::CashFlow, ticker)
            .await?;
        parse_statements(ticker.as_str(), &data)
    }
}

/// Vertex AI Search behind a cache and retries
pub struct LiveResearchSearch {
    client: VertexSearchClient,
    cache: ResponseCache,
    retry: RetryPolicy,
}

impl LiveResearchSearch {
    /// `None` when no Vertex AI Search data store is configured
    pub fn from_config(config: &InvestConfig) -> Result<Option<Self>> {
        let Some(vertex) = config.vertex.clone() else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: VertexSearchClient::new(vertex, config.request_timeout)?,
            cache: ResponseCache::new(config.cache_ttl_search),
            retry: config.retry_policy(),
        }))
    }
}

#[async_trait]
impl ResearchSearch for LiveResearchSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let config = self.client.config();
        let key = CacheKey::new(
            vertex::PROVIDER,
            config.data_store_id.clone(),
            query.trim().to_lowercase(),
            config.page_size,
        );
        let data = self
            .cache
            .get_or_fetch(key, || {
                self.retry
                    .run("research_search", || self.client.fetch(query))
            })
            .await?;
        vertex::parse_search_response(&data)
    }
}
