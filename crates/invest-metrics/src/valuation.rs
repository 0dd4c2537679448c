//! Valuation ratios and commentary

use crate::error::Result;
use crate::format::format_currency;
use crate::metric::{Field, Gap, Metric};
use crate::snapshot::{FinancialSnapshot, ReportingPeriod, Ticker};
use serde::Serialize;

/// Ratios derived from a single snapshot
///
/// Growth rates are carried through unchanged (as fractions) so the checklist
/// can screen on them without going back to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationMetrics {
    pub price: Metric,
    pub eps: Metric,
    pub pe_ratio: Metric,
    pub price_to_book: Metric,
    pub peg_ratio: Metric,
    pub free_cash_flow: Metric,
    pub debt_to_equity: Metric,
    pub eps_growth: Metric,
    pub revenue_growth: Metric,
    pub market_cap: Metric,
}

impl ValuationMetrics {
    /// Every metric unavailable for the same reason
    pub fn unavailable(gap: Gap) -> Self {
        let na = Metric::NotAvailable(gap);
        Self {
            price: na,
            eps: na,
            pe_ratio: na,
            price_to_book: na,
            peg_ratio: na,
            free_cash_flow: na,
            debt_to_equity: na,
            eps_growth: na,
            revenue_growth: na,
            market_cap: na,
        }
    }

    fn all(&self) -> [Metric; 10] {
        [
            self.price,
            self.eps,
            self.pe_ratio,
            self.price_to_book,
            self.peg_ratio,
            self.free_cash_flow,
            self.debt_to_equity,
            self.eps_growth,
            self.revenue_growth,
            self.market_cap,
        ]
    }

    /// Number of metrics that could be computed
    pub fn available_count(&self) -> usize {
        self.all().iter().filter(|m| m.is_available()).count()
    }
}

/// Valuation metrics for one ticker plus human-readable commentary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub ticker: Ticker,
    pub period: ReportingPeriod,
    pub metrics: ValuationMetrics,
    pub commentary: Vec<String>,
    /// Explanation when the whole report is degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValuationReport {
    /// All-sentinel report for a ticker whose data could not be fetched
    pub fn upstream_unavailable(ticker: Ticker, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            ticker,
            period: ReportingPeriod::trailing(),
            metrics: ValuationMetrics::unavailable(Gap::NoData),
            commentary: vec![format!("Valuation metrics unavailable: {message}")],
            message: Some(message),
        }
    }
}

/// Derive valuation ratios from a snapshot
///
/// P/E = price / trailing EPS, P/B = price / book value per share,
/// PEG = P/E / (EPS growth in percent), free cash flow = operating cash flow
/// minus capital expenditures, debt-to-equity = total liabilities /
/// shareholder equity. Missing inputs and zero denominators produce
/// `NotAvailable`; only invalid input (see [`FinancialSnapshot::validate`])
/// is an error.
pub fn compute_valuation_metrics(snapshot: &FinancialSnapshot) -> Result<ValuationReport> {
    snapshot.validate()?;

    let price = snapshot.metric(Field::Price);
    let eps = snapshot.metric(Field::Eps);
    let eps_growth = snapshot.metric(Field::EpsGrowth);

    let pe_ratio = price.divide(eps);
    let price_to_book = price.divide(snapshot.metric(Field::BookValuePerShare));
    let peg_ratio = peg(pe_ratio, eps_growth);
    let debt_to_equity = snapshot
        .metric(Field::TotalLiabilities)
        .divide(snapshot.metric(Field::ShareholderEquity));

    let metrics = ValuationMetrics {
        price,
        eps,
        pe_ratio,
        price_to_book,
        peg_ratio,
        free_cash_flow: snapshot.free_cash_flow(),
        debt_to_equity,
        eps_growth,
        revenue_growth: snapshot.metric(Field::RevenueGrowth),
        market_cap: market_cap(snapshot, price),
    };

    tracing::debug!(
        ticker = %snapshot.ticker,
        available = metrics.available_count(),
        "Computed valuation metrics"
    );

    Ok(ValuationReport {
        ticker: snapshot.ticker.clone(),
        period: snapshot.period,
        commentary: commentary(&metrics),
        metrics,
        message: None,
    })
}

/// PEG is only meaningful for positive earnings growing at a positive rate
fn peg(pe_ratio: Metric, eps_growth: Metric) -> Metric {
    pe_ratio.and_then(|pe| {
        eps_growth.and_then(|growth| {
            if pe <= 0.0 || growth <= 0.0 {
                Metric::NotAvailable(Gap::Undefined)
            } else {
                Metric::Available(pe).divide(Metric::Available(growth * 100.0))
            }
        })
    })
}

/// Reported market cap, or price × shares outstanding
fn market_cap(snapshot: &FinancialSnapshot, price: Metric) -> Metric {
    match snapshot.market_cap {
        Some(cap) => Metric::Available(cap),
        None => price.and_then(|p| snapshot.metric(Field::SharesOutstanding).map(|s| p * s)),
    }
}

fn commentary(m: &ValuationMetrics) -> Vec<String> {
    vec![
        describe_pe(m.pe_ratio),
        describe_pb(m.price_to_book),
        describe_peg(m.peg_ratio),
        describe_debt_to_equity(m.debt_to_equity),
        describe_free_cash_flow(m.free_cash_flow),
    ]
}

fn unavailable(label: &str, metric: Metric) -> String {
    match metric.gap() {
        Some(gap) => format!("{label} not available: {gap}"),
        None => format!("{label} not available"),
    }
}

fn describe_pe(pe: Metric) -> String {
    let Some(pe) = pe.value() else {
        return unavailable("P/E", pe);
    };
    if pe < 0.0 {
        return format!("P/E of {pe:.1} is negative: the company is not profitable");
    }
    let view = if pe < 15.0 {
        "suggests modestly valued (potentially undervalued or slow growth)"
    } else if pe < 25.0 {
        "suggests fairly valued"
    } else if pe < 50.0 {
        "suggests richly valued"
    } else {
        "suggests very richly valued (high growth expectations priced in)"
    };
    format!("P/E of {pe:.1} {view} relative to the broad market")
}

fn describe_pb(pb: Metric) -> String {
    let Some(pb) = pb.value() else {
        return unavailable("P/B", pb);
    };
    if pb < 0.0 {
        format!("P/B of {pb:.2} is negative: book value is below zero")
    } else if pb < 1.0 {
        format!("P/B of {pb:.2}: trades below book value")
    } else if pb < 3.0 {
        format!("P/B of {pb:.2}: moderate premium to book value")
    } else {
        format!("P/B of {pb:.2}: rich premium to book value")
    }
}

fn describe_peg(peg: Metric) -> String {
    let Some(peg) = peg.value() else {
        return unavailable("PEG", peg);
    };
    if peg < 1.0 {
        format!("PEG of {peg:.2}: growth-adjusted valuation looks attractive")
    } else if peg <= 2.0 {
        format!("PEG of {peg:.2}: reasonably priced for its growth")
    } else {
        format!("PEG of {peg:.2}: expensive relative to its growth")
    }
}

fn describe_debt_to_equity(de: Metric) -> String {
    let Some(de) = de.value() else {
        return unavailable("Debt-to-equity", de);
    };
    if de < 0.0 {
        format!("Debt-to-equity of {de:.2}: shareholder equity is negative")
    } else if de < 0.5 {
        format!("Debt-to-equity of {de:.2}: conservative balance sheet")
    } else if de <= 2.0 {
        format!("Debt-to-equity of {de:.2}: moderate leverage")
    } else {
        format!("Debt-to-equity of {de:.2}: highly leveraged")
    }
}

fn describe_free_cash_flow(fcf: Metric) -> String {
    let Some(fcf) = fcf.value() else {
        return unavailable("Free cash flow", fcf);
    };
    if fcf >= 0.0 {
        format!("Generates free cash flow of {}", format_currency(fcf))
    } else {
        format!("Burns cash: free cash flow of {}", format_currency(fcf))
    }
}
