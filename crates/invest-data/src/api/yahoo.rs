//! Yahoo Finance price history

use crate::error::{DataError, Result};
use chrono::DateTime;
use invest_metrics::PriceBar;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

pub const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self {}
    }

    /// Daily bars covering the last `days` calendar days, newest first
    pub async fn get_daily(&self, symbol: &str, days: i64) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| DataError::upstream(PROVIDER, e.to_string()))?;

        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(days);

        tracing::debug!(symbol, days, "Yahoo Finance history request");
        let response = provider
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| DataError::upstream(PROVIDER, e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::unavailable(symbol, e.to_string()))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();

        if bars.is_empty() {
            return Err(DataError::unavailable(symbol, "no price history"));
        }
        bars.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bars)
    }
}
