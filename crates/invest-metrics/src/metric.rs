//! Derived values that may be unavailable

use serde::{Serialize, Serializer};
use std::fmt;

/// Rendered form of an unavailable metric
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw snapshot fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Price,
    Eps,
    BookValuePerShare,
    EpsGrowth,
    RevenueGrowth,
    Revenue,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    Ebitda,
    TotalAssets,
    TotalLiabilities,
    ShareholderEquity,
    CurrentAssets,
    CurrentLiabilities,
    Inventory,
    CashAndEquivalents,
    LongTermDebt,
    OperatingCashFlow,
    CapitalExpenditures,
    DividendsPaid,
    SharesOutstanding,
    MarketCap,
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Price,
        Field::Eps,
        Field::BookValuePerShare,
        Field::EpsGrowth,
        Field::RevenueGrowth,
        Field::Revenue,
        Field::GrossProfit,
        Field::OperatingIncome,
        Field::NetIncome,
        Field::Ebitda,
        Field::TotalAssets,
        Field::TotalLiabilities,
        Field::ShareholderEquity,
        Field::CurrentAssets,
        Field::CurrentLiabilities,
        Field::Inventory,
        Field::CashAndEquivalents,
        Field::LongTermDebt,
        Field::OperatingCashFlow,
        Field::CapitalExpenditures,
        Field::DividendsPaid,
        Field::SharesOutstanding,
        Field::MarketCap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Price => "price",
            Field::Eps => "eps",
            Field::BookValuePerShare => "book_value_per_share",
            Field::EpsGrowth => "eps_growth",
            Field::RevenueGrowth => "revenue_growth",
            Field::Revenue => "revenue",
            Field::GrossProfit => "gross_profit",
            Field::OperatingIncome => "operating_income",
            Field::NetIncome => "net_income",
            Field::Ebitda => "ebitda",
            Field::TotalAssets => "total_assets",
            Field::TotalLiabilities => "total_liabilities",
            Field::ShareholderEquity => "shareholder_equity",
            Field::CurrentAssets => "current_assets",
            Field::CurrentLiabilities => "current_liabilities",
            Field::Inventory => "inventory",
            Field::CashAndEquivalents => "cash_and_equivalents",
            Field::LongTermDebt => "long_term_debt",
            Field::OperatingCashFlow => "operating_cash_flow",
            Field::CapitalExpenditures => "capital_expenditures",
            Field::DividendsPaid => "dividends_paid",
            Field::SharesOutstanding => "shares_outstanding",
            Field::MarketCap => "market_cap",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a metric has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum Gap {
    /// The provider did not supply an input field
    MissingField(Field),
    /// The denominator was zero
    DivisionByZero,
    /// The ratio exists arithmetically but carries no meaning (e.g. PEG on shrinking earnings)
    Undefined,
    /// No snapshot at all could be obtained for this period
    NoData,
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::MissingField(field) => write!(f, "missing field `{field}`"),
            Gap::DivisionByZero => f.write_str("division by zero"),
            Gap::Undefined => f.write_str("not meaningful for these inputs"),
            Gap::NoData => f.write_str("no data available"),
        }
    }
}

/// A derived number, or the reason it could not be derived
///
/// Arithmetic helpers propagate the first gap they meet, so a ratio built on a
/// missing field reports that field rather than a generic failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Available(f64),
    NotAvailable(Gap),
}

impl Metric {
    /// Wrap an optional raw field
    pub fn from_field(value: Option<f64>, field: Field) -> Self {
        match value {
            Some(v) => Metric::Available(v),
            None => Metric::NotAvailable(Gap::MissingField(field)),
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Available(v) => Some(v),
            Metric::NotAvailable(_) => None,
        }
    }

    pub fn gap(self) -> Option<Gap> {
        match self {
            Metric::Available(_) => None,
            Metric::NotAvailable(gap) => Some(gap),
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Metric::Available(_))
    }

    /// Apply `f` to an available value; non-finite results become `Undefined`
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Metric {
        match self {
            Metric::Available(v) => Metric::finite(f(v)),
            gap @ Metric::NotAvailable(_) => gap,
        }
    }

    /// Chain a computation that may itself produce a gap
    pub fn and_then(self, f: impl FnOnce(f64) -> Metric) -> Metric {
        match self {
            Metric::Available(v) => f(v),
            gap @ Metric::NotAvailable(_) => gap,
        }
    }

    /// `self / denominator`; a zero denominator yields `DivisionByZero`
    pub fn divide(self, denominator: Metric) -> Metric {
        match (self, denominator) {
            (Metric::NotAvailable(gap), _) | (_, Metric::NotAvailable(gap)) => {
                Metric::NotAvailable(gap)
            }
            (Metric::Available(_), Metric::Available(d)) if d == 0.0 => {
                Metric::NotAvailable(Gap::DivisionByZero)
            }
            (Metric::Available(n), Metric::Available(d)) => Metric::finite(n / d),
        }
    }

    pub fn subtract(self, other: Metric) -> Metric {
        match (self, other) {
            (Metric::NotAvailable(gap), _) | (_, Metric::NotAvailable(gap)) => {
                Metric::NotAvailable(gap)
            }
            (Metric::Available(a), Metric::Available(b)) => Metric::finite(a - b),
        }
    }

    /// Round an available value to `places` decimal places
    pub fn rounded(self, places: i32) -> Metric {
        let factor = 10_f64.powi(places);
        self.map(|v| (v * factor).round() / factor)
    }

    fn finite(v: f64) -> Metric {
        if v.is_finite() {
            Metric::Available(v)
        } else {
            Metric::NotAvailable(Gap::Undefined)
        }
    }
}

impl From<f64> for Metric {
    fn from(v: f64) -> Self {
        Metric::finite(v)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Available(v) => write!(f, "{v:.2}"),
            Metric::NotAvailable(_) => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Available(v) => serializer.serialize_f64(*v),
            Metric::NotAvailable(_) => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide() {
        let n = Metric::Available(150.0);
        assert_eq!(n.divide(Metric::Available(5.0)), Metric::Available(30.0));
        assert_eq!(
            n.divide(Metric::Available(0.0)),
            Metric::NotAvailable(Gap::DivisionByZero)
        );
    }

    #[test]
    fn test_divide_propagates_first_gap() {
        let missing_eps = Metric::from_field(None, Field::Eps);
        let missing_price = Metric::from_field(None, Field::Price);

        assert_eq!(
            Metric::Available(1.0).divide(missing_eps),
            Metric::NotAvailable(Gap::MissingField(Field::Eps))
        );
        assert_eq!(
            missing_price.divide(missing_eps),
            Metric::NotAvailable(Gap::MissingField(Field::Price))
        );
        // A missing numerator wins over a zero denominator
        assert_eq!(
            missing_price.divide(Metric::Available(0.0)),
            Metric::NotAvailable(Gap::MissingField(Field::Price))
        );
    }

    #[test]
    fn test_non_finite_becomes_undefined() {
        assert_eq!(Metric::from(f64::NAN), Metric::NotAvailable(Gap::Undefined));
        assert_eq!(
            Metric::Available(f64::MAX).map(|v| v * 10.0),
            Metric::NotAvailable(Gap::Undefined)
        );
    }

    #[test]
    fn test_rounded() {
        assert_eq!(Metric::Available(7.456).rounded(2), Metric::Available(7.46));
        assert!(!Metric::NotAvailable(Gap::NoData).rounded(2).is_available());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value([
            Metric::Available(7.5),
            Metric::NotAvailable(Gap::DivisionByZero),
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!([7.5, "N/A"]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Metric::Available(30.0).to_string(), "30.00");
        assert_eq!(Metric::NotAvailable(Gap::NoData).to_string(), "N/A");
        assert_eq!(
            Gap::MissingField(Field::ShareholderEquity).to_string(),
            "missing field `shareholder_equity`"
        );
    }
}
