//! Period-over-period growth

use crate::error::{DataGapError, MetricsError, Result};
use crate::format::format_percent_change;
use crate::metric::{Field, Gap, Metric};
use crate::snapshot::{FinancialSnapshot, ReportingPeriod, Ticker};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Metrics tracked across periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Revenue,
    NetIncome,
    Ebitda,
    Eps,
    OperatingCashFlow,
    FreeCashFlow,
    BookValuePerShare,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 7] = [
        TrendMetric::Revenue,
        TrendMetric::NetIncome,
        TrendMetric::Ebitda,
        TrendMetric::Eps,
        TrendMetric::OperatingCashFlow,
        TrendMetric::FreeCashFlow,
        TrendMetric::BookValuePerShare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendMetric::Revenue => "revenue",
            TrendMetric::NetIncome => "net_income",
            TrendMetric::Ebitda => "ebitda",
            TrendMetric::Eps => "eps",
            TrendMetric::OperatingCashFlow => "operating_cash_flow",
            TrendMetric::FreeCashFlow => "free_cash_flow",
            TrendMetric::BookValuePerShare => "book_value_per_share",
        }
    }

    fn value(self, snapshot: &FinancialSnapshot) -> Metric {
        match self {
            TrendMetric::Revenue => snapshot.metric(Field::Revenue),
            TrendMetric::NetIncome => snapshot.metric(Field::NetIncome),
            TrendMetric::Ebitda => snapshot.metric(Field::Ebitda),
            TrendMetric::Eps => snapshot.metric(Field::Eps),
            TrendMetric::OperatingCashFlow => snapshot.metric(Field::OperatingCashFlow),
            TrendMetric::FreeCashFlow => snapshot.free_cash_flow(),
            TrendMetric::BookValuePerShare => snapshot.metric(Field::BookValuePerShare),
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two snapshots a gap came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSide {
    Current,
    Prior,
}

impl fmt::Display for SnapshotSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SnapshotSide::Current => "current",
            SnapshotSide::Prior => "prior",
        })
    }
}

/// Change of one metric between two periods
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthChange {
    pub metric: TrendMetric,
    pub current: Metric,
    pub prior: Metric,
    /// Signed percent change: positive = growth, negative = decline
    pub outcome: std::result::Result<f64, DataGapError>,
}

impl GrowthChange {
    fn between(metric: TrendMetric, current: Metric, prior: Metric) -> Self {
        let gap = |side, reason| DataGapError {
            metric,
            side,
            reason,
        };
        let outcome = match (current, prior) {
            (Metric::NotAvailable(reason), _) => Err(gap(SnapshotSide::Current, reason)),
            (_, Metric::NotAvailable(reason)) => Err(gap(SnapshotSide::Prior, reason)),
            (Metric::Available(_), Metric::Available(p)) if p == 0.0 => {
                Err(gap(SnapshotSide::Prior, Gap::DivisionByZero))
            }
            (Metric::Available(c), Metric::Available(p)) => {
                let change = (c - p) / p.abs() * 100.0;
                if change.is_finite() {
                    Ok(change)
                } else {
                    Err(gap(SnapshotSide::Prior, Gap::Undefined))
                }
            }
        };
        Self {
            metric,
            current,
            prior,
            outcome,
        }
    }

    pub fn percent_change(&self) -> Metric {
        match self.outcome {
            Ok(change) => Metric::Available(change),
            Err(e) => Metric::NotAvailable(e.reason),
        }
    }

    pub fn is_growth(&self) -> Option<bool> {
        self.outcome.ok().map(|c| c > 0.0)
    }
}

impl fmt::Display for GrowthChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(change) => write!(f, "{}: {}", self.metric, format_percent_change(*change)),
            Err(e) => write!(f, "{}: {}", self.metric, e),
        }
    }
}

impl Serialize for GrowthChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("GrowthChange", 6)?;
        s.serialize_field("metric", &self.metric)?;
        s.serialize_field("current", &self.current)?;
        s.serialize_field("prior", &self.prior)?;
        s.serialize_field("percent_change", &self.percent_change().rounded(2))?;
        match &self.outcome {
            Ok(change) => {
                s.serialize_field("formatted", &format_percent_change(*change))?;
                s.serialize_field("note", &Option::<String>::None)?;
            }
            Err(e) => {
                s.serialize_field("formatted", crate::metric::NOT_AVAILABLE)?;
                s.serialize_field("note", &Some(e.to_string()))?;
            }
        }
        s.end()
    }
}

/// Overall direction across revenue, net income and EPS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendAssessment {
    StrongGrowth,
    Positive,
    Mixed,
    Declining,
    InsufficientData,
}

impl fmt::Display for TrendAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendAssessment::StrongGrowth => "Strong growth across all metrics",
            TrendAssessment::Positive => "Positive trend overall",
            TrendAssessment::Mixed => "Mixed performance",
            TrendAssessment::Declining => "Declining performance",
            TrendAssessment::InsufficientData => "Insufficient data",
        })
    }
}

impl TrendAssessment {
    fn from_changes(changes: &[GrowthChange]) -> Self {
        let signals: Vec<bool> = changes
            .iter()
            .filter(|c| {
                matches!(
                    c.metric,
                    TrendMetric::Revenue | TrendMetric::NetIncome | TrendMetric::Eps
                )
            })
            .filter_map(GrowthChange::is_growth)
            .collect();

        let total = signals.len();
        if total == 0 {
            return TrendAssessment::InsufficientData;
        }
        let positive = signals.iter().filter(|g| **g).count();
        let share = positive as f64 / total as f64;

        if positive == total {
            TrendAssessment::StrongGrowth
        } else if share >= 0.66 {
            TrendAssessment::Positive
        } else if share >= 0.33 {
            TrendAssessment::Mixed
        } else {
            TrendAssessment::Declining
        }
    }
}

/// Growth of every [`TrendMetric`] between two periods of one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthTrend {
    pub ticker: Ticker,
    pub current_period: ReportingPeriod,
    pub prior_period: Option<ReportingPeriod>,
    pub changes: Vec<GrowthChange>,
    pub assessment: TrendAssessment,
}

impl GrowthTrend {
    /// Trend for a ticker with only one period of data: every metric unavailable
    pub fn single_period(current: &FinancialSnapshot) -> Self {
        let changes = TrendMetric::ALL
            .into_iter()
            .map(|metric| GrowthChange {
                metric,
                current: metric.value(current),
                prior: Metric::NotAvailable(Gap::NoData),
                outcome: Err(DataGapError {
                    metric,
                    side: SnapshotSide::Prior,
                    reason: Gap::NoData,
                }),
            })
            .collect();

        Self {
            ticker: current.ticker.clone(),
            current_period: current.period,
            prior_period: None,
            changes,
            assessment: TrendAssessment::InsufficientData,
        }
    }

    pub fn change(&self, metric: TrendMetric) -> Option<&GrowthChange> {
        self.changes.iter().find(|c| c.metric == metric)
    }

    /// Metrics that could not be computed, with the reason
    pub fn gaps(&self) -> impl Iterator<Item = &DataGapError> {
        self.changes.iter().filter_map(|c| c.outcome.as_ref().err())
    }
}

/// Signed percent change per metric between two snapshots of the same ticker
///
/// Change is `(current - prior) / |prior| * 100`, so a shrinking loss reads as
/// growth. A metric missing on either side, or with a zero prior value, is
/// reported as a [`DataGapError`] for that metric alone.
pub fn compute_growth_trend(
    current: &FinancialSnapshot,
    prior: &FinancialSnapshot,
) -> Result<GrowthTrend> {
    if current.ticker != prior.ticker {
        return Err(MetricsError::invalid(
            "ticker",
            format!(
                "snapshots belong to different tickers: {} vs {}",
                current.ticker, prior.ticker
            ),
        ));
    }
    current.validate()?;
    prior.validate()?;

    let changes: Vec<GrowthChange> = TrendMetric::ALL
        .into_iter()
        .map(|metric| GrowthChange::between(metric, metric.value(current), metric.value(prior)))
        .collect();

    for change in &changes {
        if let Err(gap) = &change.outcome {
            tracing::debug!(ticker = %current.ticker, "{gap}");
        }
    }

    Ok(GrowthTrend {
        ticker: current.ticker.clone(),
        current_period: current.period,
        prior_period: Some(prior.period),
        assessment: TrendAssessment::from_changes(&changes),
        changes,
    })
}
