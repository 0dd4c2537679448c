//! Error types for metric computation

use crate::growth::{SnapshotSide, TrendMetric};
use crate::metric::Gap;
use thiserror::Error;

/// Result type alias for metric computation
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Input the calculator refuses to work with
///
/// Missing data is not an error; see [`crate::Metric`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// A value is non-numeric or out of range
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl MetricsError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A single growth metric could not be computed
///
/// Reported alongside the other metrics of a [`crate::GrowthTrend`], never
/// retried and never fatal to the trend as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{metric} growth unavailable ({side} period): {reason}")]
pub struct DataGapError {
    pub metric: TrendMetric,
    pub side: SnapshotSide,
    pub reason: Gap,
}
