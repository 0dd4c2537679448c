//! The 4-point investment checklist
//!
//! | criterion          | measure                          | threshold                 |
//! |--------------------|----------------------------------|---------------------------|
//! | velocity of change | revenue growth (YoY fraction)    | `min_revenue_growth`      |
//! | sustainability     | debt-to-equity, free cash flow   | `max_debt_to_equity`, `require_positive_free_cash_flow` |
//! | valuation          | P/E                              | `max_pe`                  |
//! | growth             | EPS growth (YoY fraction)        | `min_eps_growth`          |

use crate::error::{MetricsError, Result};
use crate::metric::{Gap, Metric};
use crate::valuation::ValuationMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Threshold values for the checklist
///
/// A threshold left as `None` switches its criterion off. Fields missing
/// from deserialized input take their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistThresholds {
    /// Velocity of change: minimum revenue growth, as a fraction
    pub min_revenue_growth: Option<f64>,
    /// Sustainability: maximum debt-to-equity
    pub max_debt_to_equity: Option<f64>,
    /// Sustainability: free cash flow must be positive
    pub require_positive_free_cash_flow: bool,
    /// Valuation ceiling: maximum P/E
    pub max_pe: Option<f64>,
    /// Growth floor: minimum EPS growth, as a fraction
    pub min_eps_growth: Option<f64>,
}

impl Default for ChecklistThresholds {
    fn default() -> Self {
        Self {
            min_revenue_growth: Some(0.05),
            max_debt_to_equity: Some(2.0),
            require_positive_free_cash_flow: true,
            max_pe: Some(25.0),
            min_eps_growth: Some(0.10),
        }
    }
}

impl ChecklistThresholds {
    /// Every criterion switched off
    pub fn unset() -> Self {
        Self {
            min_revenue_growth: None,
            max_debt_to_equity: None,
            require_positive_free_cash_flow: false,
            max_pe: None,
            min_eps_growth: None,
        }
    }

    pub fn with_min_revenue_growth(mut self, value: f64) -> Self {
        self.min_revenue_growth = Some(value);
        self
    }

    pub fn with_max_debt_to_equity(mut self, value: f64) -> Self {
        self.max_debt_to_equity = Some(value);
        self
    }

    pub fn with_positive_free_cash_flow(mut self, required: bool) -> Self {
        self.require_positive_free_cash_flow = required;
        self
    }

    pub fn with_max_pe(mut self, value: f64) -> Self {
        self.max_pe = Some(value);
        self
    }

    pub fn with_min_eps_growth(mut self, value: f64) -> Self {
        self.min_eps_growth = Some(value);
        self
    }

    /// Ceilings must be positive and finite; floors only finite
    pub fn validate(&self) -> Result<()> {
        let finite = |name: &str, value: Option<f64>| match value {
            Some(v) if !v.is_finite() => Err(MetricsError::invalid(
                name,
                format!("{v} is not a finite number"),
            )),
            _ => Ok(()),
        };
        let positive = |name: &str, value: Option<f64>| match value {
            Some(v) if v <= 0.0 => Err(MetricsError::invalid(
                name,
                format!("{v} must be greater than zero"),
            )),
            _ => Ok(()),
        };

        finite("min_revenue_growth", self.min_revenue_growth)?;
        finite("min_eps_growth", self.min_eps_growth)?;
        finite("max_debt_to_equity", self.max_debt_to_equity)?;
        finite("max_pe", self.max_pe)?;
        positive("max_debt_to_equity", self.max_debt_to_equity)?;
        positive("max_pe", self.max_pe)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    VelocityOfChange,
    Sustainability,
    Valuation,
    Growth,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criterion::VelocityOfChange => "velocity of change",
            Criterion::Sustainability => "sustainability",
            Criterion::Valuation => "valuation",
            Criterion::Growth => "growth",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    /// The metric needed for this criterion is not available
    Unavailable,
    /// No threshold configured for this criterion
    NotEvaluated,
}

/// Result of one checklist criterion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub criterion: Criterion,
    pub outcome: Outcome,
    pub observed: Metric,
    pub threshold: Option<f64>,
    pub detail: String,
}

/// Overall reading of the price, independent of the pass/fail criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationView {
    Undervalued,
    FairlyValued,
    Overvalued,
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningVerdict {
    pub criteria: Vec<CriterionResult>,
    /// True when at least one criterion was evaluated and every evaluated
    /// criterion passed
    pub recommended: bool,
    pub valuation_view: ValuationView,
    pub summary: String,
}

impl ScreeningVerdict {
    pub fn outcome(&self, criterion: Criterion) -> Option<Outcome> {
        self.criteria
            .iter()
            .find(|c| c.criterion == criterion)
            .map(|c| c.outcome)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CriterionResult> {
        self.criteria.iter().filter(|c| c.outcome == Outcome::Fail)
    }
}

/// Compare valuation metrics against checklist thresholds
pub fn screen_against_checklist(
    metrics: &ValuationMetrics,
    thresholds: &ChecklistThresholds,
) -> Result<ScreeningVerdict> {
    thresholds.validate()?;

    let criteria = vec![
        floor(
            Criterion::VelocityOfChange,
            "revenue growth",
            metrics.revenue_growth,
            thresholds.min_revenue_growth,
        ),
        sustainability(metrics, thresholds),
        ceiling(
            Criterion::Valuation,
            "P/E",
            "no earnings to value",
            metrics.pe_ratio,
            thresholds.max_pe,
        ),
        floor(
            Criterion::Growth,
            "EPS growth",
            metrics.eps_growth,
            thresholds.min_eps_growth,
        ),
    ];

    let evaluated: Vec<&CriterionResult> = criteria
        .iter()
        .filter(|c| c.outcome != Outcome::NotEvaluated)
        .collect();
    let recommended =
        !evaluated.is_empty() && evaluated.iter().all(|c| c.outcome == Outcome::Pass);

    Ok(ScreeningVerdict {
        summary: summarize(&criteria, evaluated.len(), recommended),
        valuation_view: valuation_view(metrics, thresholds),
        recommended,
        criteria,
    })
}

fn not_evaluated(criterion: Criterion, observed: Metric) -> CriterionResult {
    CriterionResult {
        criterion,
        outcome: Outcome::NotEvaluated,
        observed,
        threshold: None,
        detail: "no threshold configured".to_string(),
    }
}

fn unavailable(
    criterion: Criterion,
    label: &str,
    observed: Metric,
    threshold: f64,
) -> CriterionResult {
    let reason = observed.gap().unwrap_or(Gap::NoData);
    CriterionResult {
        criterion,
        outcome: Outcome::Unavailable,
        observed,
        threshold: Some(threshold),
        detail: format!("{label} not available: {reason}"),
    }
}

fn floor(
    criterion: Criterion,
    label: &str,
    observed: Metric,
    min: Option<f64>,
) -> CriterionResult {
    let Some(min) = min else {
        return not_evaluated(criterion, observed);
    };
    let Some(value) = observed.value() else {
        return unavailable(criterion, label, observed, min);
    };
    let (outcome, relation) = if value >= min {
        (Outcome::Pass, "meets")
    } else {
        (Outcome::Fail, "is below")
    };
    CriterionResult {
        criterion,
        outcome,
        observed,
        threshold: Some(min),
        detail: format!(
            "{label} of {:.1}% {relation} the {:.1}% floor",
            value * 100.0,
            min * 100.0
        ),
    }
}

/// `observed` must not exceed `max`; a negative value fails with `when_negative`
fn ceiling(
    criterion: Criterion,
    label: &str,
    when_negative: &str,
    observed: Metric,
    max: Option<f64>,
) -> CriterionResult {
    let Some(max) = max else {
        return not_evaluated(criterion, observed);
    };
    let Some(value) = observed.value() else {
        return unavailable(criterion, label, observed, max);
    };
    let (outcome, detail) = if value < 0.0 {
        (
            Outcome::Fail,
            format!("{label} of {value:.1} is negative ({when_negative})"),
        )
    } else if value <= max {
        (Outcome::Pass, format!("{label} of {value:.1} is within the {max:.1} ceiling"))
    } else {
        (Outcome::Fail, format!("{label} of {value:.1} exceeds the {max:.1} ceiling"))
    };
    CriterionResult {
        criterion,
        outcome,
        observed,
        threshold: Some(max),
        detail,
    }
}

fn sustainability(
    metrics: &ValuationMetrics,
    thresholds: &ChecklistThresholds,
) -> CriterionResult {
    let criterion = Criterion::Sustainability;
    let leverage = thresholds.max_debt_to_equity.map(|max| {
        ceiling(
            criterion,
            "debt-to-equity",
            "shareholder equity is negative",
            metrics.debt_to_equity,
            Some(max),
        )
    });
    let cash_flow = thresholds
        .require_positive_free_cash_flow
        .then(|| free_cash_flow_check(metrics.free_cash_flow));

    match (leverage, cash_flow) {
        (None, None) => not_evaluated(criterion, metrics.debt_to_equity),
        (Some(one), None) | (None, Some(one)) => one,
        (Some(leverage), Some(cash_flow)) => {
            let outcomes = [leverage.outcome, cash_flow.outcome];
            let outcome = if outcomes.contains(&Outcome::Fail) {
                Outcome::Fail
            } else if outcomes.contains(&Outcome::Unavailable) {
                Outcome::Unavailable
            } else {
                Outcome::Pass
            };
            CriterionResult {
                criterion,
                outcome,
                observed: leverage.observed,
                threshold: leverage.threshold,
                detail: format!("{}; {}", leverage.detail, cash_flow.detail),
            }
        }
    }
}

fn free_cash_flow_check(fcf: Metric) -> CriterionResult {
    let criterion = Criterion::Sustainability;
    let Some(value) = fcf.value() else {
        return unavailable(criterion, "free cash flow", fcf, 0.0);
    };
    let (outcome, detail) = if value > 0.0 {
        (Outcome::Pass, "free cash flow is positive")
    } else {
        (Outcome::Fail, "free cash flow is not positive")
    };
    CriterionResult {
        criterion,
        outcome,
        observed: fcf,
        threshold: Some(0.0),
        detail: detail.to_string(),
    }
}

fn valuation_view(metrics: &ValuationMetrics, thresholds: &ChecklistThresholds) -> ValuationView {
    let Some(pe) = metrics.pe_ratio.value() else {
        return ValuationView::Indeterminate;
    };
    if pe <= 0.0 {
        return ValuationView::Indeterminate;
    }
    if thresholds.max_pe.is_some_and(|max| pe > max) {
        return ValuationView::Overvalued;
    }
    match metrics.peg_ratio.value() {
        Some(peg) if peg < 1.0 => ValuationView::Undervalued,
        Some(peg) if peg > 2.0 => ValuationView::Overvalued,
        Some(_) => ValuationView::FairlyValued,
        None if thresholds.max_pe.is_some() => ValuationView::FairlyValued,
        None => ValuationView::Indeterminate,
    }
}

fn summarize(criteria: &[CriterionResult], evaluated: usize, recommended: bool) -> String {
    if evaluated == 0 {
        return "No checklist criteria were evaluated".to_string();
    }
    let passed = criteria.iter().filter(|c| c.outcome == Outcome::Pass).count();
    let names = |outcome: Outcome| -> Vec<String> {
        criteria
            .iter()
            .filter(|c| c.outcome == outcome)
            .map(|c| c.criterion.to_string())
            .collect()
    };

    let mut summary = format!("Passes {passed} of {evaluated} evaluated checklist criteria");
    let failed = names(Outcome::Fail);
    if !failed.is_empty() {
        summary.push_str(&format!("; fails {}", failed.join(", ")));
    }
    let missing = names(Outcome::Unavailable);
    if !missing.is_empty() {
        summary.push_str(&format!("; insufficient data for {}", missing.join(", ")));
    }
    if recommended {
        summary.push_str("; meets the checklist");
    } else {
        summary.push_str("; does not meet the checklist");
    }
    summary
}
