//! Company profile and reported fundamentals

use super::{Market, fetch_failed, ticker_schema};
use crate::reply::{Reply, reported, text};
use crate::request::TickerRequest;
use async_trait::async_trait;
use invest_data::{CompanyOverview, MarketDataSource, Result as DataResult};
use invest_metrics::{Metric, NOT_AVAILABLE, Ticker, format_currency};
use invest_tools::{Result, Tool, parse_params};
use serde::Serialize;
use serde_json::Value;

/// Fundamentals as the provider reports them; nothing here is recomputed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fundamentals {
    pub ticker: Ticker,
    pub company_name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: Metric,
    pub market_cap_formatted: String,
    pub pe_ratio: Metric,
    pub forward_pe: Metric,
    pub peg_ratio: Metric,
    pub price_to_book: Metric,
    pub dividend_yield: Metric,
    pub beta: Metric,
    pub profit_margin: Metric,
    pub revenue_growth: Metric,
    pub eps: Metric,
    pub analyst_target: Metric,
    #[serde(rename = "52_week_high")]
    pub week_52_high: Metric,
    #[serde(rename = "52_week_low")]
    pub week_52_low: Metric,
}

impl Fundamentals {
    pub fn from_overview(ticker: Ticker, o: &CompanyOverview) -> Self {
        Self {
            ticker,
            company_name: text(o.name.as_deref()),
            sector: text(o.sector.as_deref()),
            industry: text(o.industry.as_deref()),
            market_cap: reported(o.market_cap),
            market_cap_formatted: o
                .market_cap
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_currency),
            pe_ratio: reported(o.pe_ratio),
            forward_pe: reported(o.forward_pe),
            peg_ratio: reported(o.peg_ratio),
            price_to_book: reported(o.price_to_book),
            dividend_yield: reported(o.dividend_yield),
            beta: reported(o.beta),
            profit_margin: reported(o.profit_margin),
            revenue_growth: reported(o.quarterly_revenue_growth_yoy),
            eps: reported(o.eps),
            analyst_target: reported(o.analyst_target_price),
            week_52_high: reported(o.week_52_high),
            week_52_low: reported(o.week_52_low),
        }
    }
}

pub(crate) fn fundamentals_from(
    fetched: &DataResult<CompanyOverview>,
    ticker: &Ticker,
) -> Reply<Fundamentals> {
    match fetched {
        Ok(overview) => Reply::success(Fundamentals::from_overview(ticker.clone(), overview)),
        Err(e) => Reply::error(fetch_failed("fundamentals", ticker, e)),
    }
}

pub(crate) async fn fetch_fundamentals(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
) -> Reply<Fundamentals> {
    fundamentals_from(&market.company_overview(ticker).await, ticker)
}

pub struct GetStockFundamentalsTool {
    market: Market,
}

impl GetStockFundamentalsTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GetStockFundamentalsTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request: TickerRequest = parse_params(params)?;
        fetch_fundamentals(self.market.as_ref(), &request.ticker)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "get_stock_fundamentals"
    }

    fn description(&self) -> &str {
        "Get fundamental metrics and company information: sector, market cap, P/E, \
         forward P/E, PEG, price-to-book, dividend yield, beta, margins, EPS, analyst \
         target and 52-week range."
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}
