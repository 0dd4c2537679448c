//! Current price and recent performance

use super::{Market, fetch_failed, ticker_schema};
use crate::reply::Reply;
use crate::request::TickerRequest;
use async_trait::async_trait;
use invest_data::{MarketDataSource, Result as DataResult};
use invest_metrics::{PriceBar, PricePerformance, Ticker, compute_price_performance};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockPrice {
    pub ticker: Ticker,
    #[serde(flatten)]
    pub performance: PricePerformance,
}

pub(crate) fn price_from(
    fetched: &DataResult<Vec<PriceBar>>,
    ticker: &Ticker,
) -> Reply<StockPrice> {
    let bars = match fetched {
        Ok(bars) => bars,
        Err(e) => return Reply::error(fetch_failed("price data", ticker, e)),
    };
    if bars.is_empty() {
        return Reply::error(format!(
            "No price data found for {ticker}. Please verify the ticker symbol."
        ));
    }

    match compute_price_performance(bars) {
        Ok(performance) => Reply::success(StockPrice {
            ticker: ticker.clone(),
            performance,
        }),
        Err(e) => {
            tracing::warn!(ticker = %ticker, "Unusable price series: {e}");
            Reply::error(format!("Price data for {ticker} could not be used: {e}"))
        }
    }
}

pub(crate) async fn fetch_price(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
) -> Reply<StockPrice> {
    price_from(&market.daily_prices(ticker).await, ticker)
}

/// Tool for the latest close and 1-day / 1-month performance
pub struct GetStockPriceTool {
    market: Market,
}

impl GetStockPriceTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GetStockPriceTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: TickerRequest = parse_params(params)?;
        fetch_price(self.market.as_ref(), &request.ticker)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price and recent performance: 1-day and 1-month change, \
         recent high and low, and average daily volume."
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}
