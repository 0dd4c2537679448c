//! Price performance over a daily series

use crate::error::{MetricsError, Result};
use crate::metric::{Gap, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading sessions looked back for the one-month change
pub const TRADING_DAYS_PER_MONTH: usize = 21;

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePerformance {
    pub as_of: NaiveDate,
    #[serde(rename = "current_price")]
    pub latest_close: f64,
    pub change_1day: Metric,
    pub change_1day_percent: Metric,
    pub change_1month: Metric,
    pub change_1month_percent: Metric,
    pub high_recent: f64,
    pub low_recent: f64,
    pub average_volume: f64,
    pub observations: usize,
}

/// Summarize a daily series. Bars may arrive in any order.
///
/// With a single bar both changes are `NoData`. With fewer than a month of
/// bars the one-month change is measured against the oldest bar.
pub fn compute_price_performance(bars: &[PriceBar]) -> Result<PricePerformance> {
    if bars.is_empty() {
        return Err(MetricsError::invalid("prices", "series is empty"));
    }
    for bar in bars {
        let values = [bar.open, bar.high, bar.low, bar.close];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(MetricsError::invalid(
                "prices",
                format!("bar for {} has a negative or non-finite value", bar.date),
            ));
        }
    }

    let mut series = bars.to_vec();
    series.sort_by(|a, b| b.date.cmp(&a.date));
    let latest = series[0];

    let change_from = |index: usize| -> (Metric, Metric) {
        let Some(base) = series.get(index) else {
            return (Metric::NotAvailable(Gap::NoData), Metric::NotAvailable(Gap::NoData));
        };
        let base_close = Metric::Available(base.close);
        let delta = Metric::Available(latest.close).subtract(base_close);
        let percent = delta.divide(base_close).map(|v| v * 100.0);
        (delta.rounded(2), percent.rounded(2))
    };

    let (change_1day, change_1day_percent) = change_from(1);
    let month_index = TRADING_DAYS_PER_MONTH.min(series.len() - 1).max(1);
    let (change_1month, change_1month_percent) = change_from(month_index);

    let high_recent = series.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low_recent = series.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let average_volume =
        series.iter().map(|b| b.volume as f64).sum::<f64>() / series.len() as f64;

    Ok(PricePerformance {
        as_of: latest.date,
        latest_close: round2(latest.close),
        change_1day,
        change_1day_percent,
        change_1month,
        change_1month_percent,
        high_recent: round2(high_recent),
        low_recent: round2(low_recent),
        average_volume: average_volume.round(),
        observations: series.len(),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
