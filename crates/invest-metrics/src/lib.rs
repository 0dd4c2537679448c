//! Metrics & screening calculator
//!
//! Pure functions that turn a [`FinancialSnapshot`] (one period of raw
//! financial-statement data for a ticker) into:
//!
//! - valuation ratios with commentary ([`compute_valuation_metrics`])
//! - liquidity, profitability and leverage ratios ([`compute_financial_ratios`])
//! - period-over-period growth ([`compute_growth_trend`])
//! - a verdict against the 4-point investment checklist
//!   ([`screen_against_checklist`])
//! - price performance over a daily series ([`compute_price_performance`])
//!
//! Provider data is full of holes. A missing input never aborts a
//! computation: every derived value is a [`Metric`], which is either a number
//! or `NotAvailable` carrying the reason. Only malformed input (negative
//! price, NaN, mismatched tickers) is reported as a [`MetricsError`].
//!
//! Nothing here performs I/O or keeps state between calls.
//!
//! # Example
//!
//! ```
//! use invest_metrics::{FinancialSnapshot, Metric, Ticker, compute_valuation_metrics};
//!
//! let mut snapshot = FinancialSnapshot::trailing(Ticker::parse("AAPL").unwrap());
//! snapshot.price = Some(150.0);
//! snapshot.eps = Some(5.0);
//! snapshot.book_value_per_share = Some(20.0);
//!
//! let report = compute_valuation_metrics(&snapshot).unwrap();
//! assert_eq!(report.metrics.pe_ratio, Metric::Available(30.0));
//! assert_eq!(report.metrics.price_to_book, Metric::Available(7.5));
//! assert!(!report.metrics.debt_to_equity.is_available());
//! ```

pub mod error;
pub mod format;
pub mod growth;
pub mod metric;
pub mod performance;
pub mod ratios;
pub mod screening;
pub mod snapshot;
pub mod valuation;

pub use error::{DataGapError, MetricsError, Result};
pub use format::{format_currency, format_percent_change, parse_percent_change};
pub use growth::{
    GrowthChange, GrowthTrend, SnapshotSide, TrendAssessment, TrendMetric, compute_growth_trend,
};
pub use metric::{Field, Gap, Metric, NOT_AVAILABLE};
pub use performance::{PriceBar, PricePerformance, compute_price_performance};
pub use ratios::{
    FinancialRatios, LeverageRatios, LiquidityRatios, ProfitabilityRatios,
    compute_financial_ratios,
};
pub use screening::{
    ChecklistThresholds, Criterion, CriterionResult, Outcome, ScreeningVerdict, ValuationView,
    screen_against_checklist,
};
pub use snapshot::{FinancialSnapshot, PeriodKind, ReportingPeriod, Ticker};
pub use valuation::{ValuationMetrics, ValuationReport, compute_valuation_metrics};
