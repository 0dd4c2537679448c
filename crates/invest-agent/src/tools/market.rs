//! Side-by-side comparison and quick overview

use super::fundamentals::{Fundamentals, fetch_fundamentals};
use super::price::{StockPrice, fetch_price};
use super::{Market, ticker_property, ticker_schema};
use crate::reply::Reply;
use crate::request::{CompareRequest, TickerRequest};
use async_trait::async_trait;
use invest_data::MarketDataSource;
use invest_metrics::Ticker;
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Price and fundamentals for one ticker, each with its own status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockData {
    pub price_data: Reply<StockPrice>,
    pub fundamentals: Reply<Fundamentals>,
}

async fn stock_data(market: &dyn MarketDataSource, ticker: &Ticker) -> StockData {
    let (price_data, fundamentals) =
        tokio::join!(fetch_price(market, ticker), fetch_fundamentals(market, ticker));
    StockData {
        price_data,
        fundamentals,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub comparison: BTreeMap<Ticker, StockData>,
}

pub struct CompareStocksTool {
    market: Market,
}

impl CompareStocksTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CompareStocksTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: CompareRequest = parse_params(params)?;
        let market = self.market.as_ref();

        let (first, second) = tokio::join!(
            stock_data(market, &request.ticker1),
            stock_data(market, &request.ticker2)
        );
        let comparison = BTreeMap::from([(request.ticker1, first), (request.ticker2, second)]);

        Reply::success(Comparison { comparison }).into_value()
    }

    fn name(&self) -> &str {
        "compare_stocks"
    }

    fn description(&self) -> &str {
        "Compare two stocks side by side: price performance and fundamentals for each."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker1": ticker_property(),
                "ticker2": ticker_property()
            },
            "required": ["ticker1", "ticker2"]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockInfo {
    pub ticker: Ticker,
    pub price_info: Reply<StockPrice>,
    pub company_info: Reply<Fundamentals>,
}

pub struct GetStockInfoTool {
    market: Market,
}

impl GetStockInfoTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GetStockInfoTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: TickerRequest = parse_params(params)?;
        let data = stock_data(self.market.as_ref(), &request.ticker).await;

        Reply::success(StockInfo {
            ticker: request.ticker,
            price_info: data.price_data,
            company_info: data.fundamentals,
        })
        .into_value()
    }

    fn name(&self) -> &str {
        "get_stock_info"
    }

    fn description(&self) -> &str {
        "Get a quick overview of a stock: basic company information and the latest price."
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}
