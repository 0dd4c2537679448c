//! Point-in-time financial-statement data for one ticker

use crate::error::{MetricsError, Result};
use crate::metric::{Field, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_TICKER_LEN: usize = 12;

/// Exchange symbol identifying a listed company, upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Validate and normalise a ticker symbol
    ///
    /// Accepts 1–12 characters of ASCII letters, digits, `.`, `-` and `^`
    /// (`BRK.B`, `RDS-A`, `^GSPC`). Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let symbol = raw.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(MetricsError::invalid("ticker", "must not be empty"));
        }
        if symbol.len() > MAX_TICKER_LEN {
            return Err(MetricsError::invalid(
                "ticker",
                format!("'{symbol}' is longer than {MAX_TICKER_LEN} characters"),
            ));
        }
        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^')))
        {
            return Err(MetricsError::invalid(
                "ticker",
                format!("'{symbol}' contains unsupported character '{bad}'"),
            ));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = MetricsError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Length of the reporting window a snapshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Fiscal year (10-K)
    #[default]
    #[serde(alias = "yearly", alias = "10-k")]
    Annual,
    /// Fiscal quarter (10-Q)
    #[serde(alias = "10-q")]
    Quarterly,
    /// Trailing twelve months, as reported by company-overview endpoints
    #[serde(alias = "ttm")]
    Trailing,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PeriodKind::Annual => "annual",
            PeriodKind::Quarterly => "quarterly",
            PeriodKind::Trailing => "trailing",
        })
    }
}

/// The period a snapshot reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReportingPeriod {
    pub kind: PeriodKind,
    pub fiscal_date_ending: Option<NaiveDate>,
}

impl ReportingPeriod {
    pub fn new(kind: PeriodKind, fiscal_date_ending: Option<NaiveDate>) -> Self {
        Self {
            kind,
            fiscal_date_ending,
        }
    }

    pub fn trailing() -> Self {
        Self::new(PeriodKind::Trailing, None)
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fiscal_date_ending {
            Some(date) => write!(f, "{} {date}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// One period of raw financial data for a ticker
///
/// Every numeric field is optional because providers routinely omit values.
/// Growth rates are fractions (`0.08` = 8%). Capital expenditures may be
/// reported with either sign; they are treated as an outflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSnapshot {
    pub ticker: Ticker,
    pub period: ReportingPeriod,

    pub price: Option<f64>,
    pub eps: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub eps_growth: Option<f64>,
    pub revenue_growth: Option<f64>,

    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub ebitda: Option<f64>,

    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub shareholder_equity: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub inventory: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub long_term_debt: Option<f64>,

    pub operating_cash_flow: Option<f64>,
    pub capital_expenditures: Option<f64>,
    pub dividends_paid: Option<f64>,

    pub shares_outstanding: Option<f64>,
    pub market_cap: Option<f64>,
}

impl FinancialSnapshot {
    /// An empty snapshot for the given ticker and period
    pub fn new(ticker: Ticker, period: ReportingPeriod) -> Self {
        Self {
            ticker,
            period,
            price: None,
            eps: None,
            book_value_per_share: None,
            eps_growth: None,
            revenue_growth: None,
            revenue: None,
            gross_profit: None,
            operating_income: None,
            net_income: None,
            ebitda: None,
            total_assets: None,
            total_liabilities: None,
            shareholder_equity: None,
            current_assets: None,
            current_liabilities: None,
            inventory: None,
            cash_and_equivalents: None,
            long_term_debt: None,
            operating_cash_flow: None,
            capital_expenditures: None,
            dividends_paid: None,
            shares_outstanding: None,
            market_cap: None,
        }
    }

    /// An empty trailing-twelve-months snapshot
    pub fn trailing(ticker: Ticker) -> Self {
        Self::new(ticker, ReportingPeriod::trailing())
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => self.price,
            Field::Eps => self.eps,
            Field::BookValuePerShare => self.book_value_per_share,
            Field::EpsGrowth => self.eps_growth,
            Field::RevenueGrowth => self.revenue_growth,
            Field::Revenue => self.revenue,
            Field::GrossProfit => self.gross_profit,
            Field::OperatingIncome => self.operating_income,
            Field::NetIncome => self.net_income,
            Field::Ebitda => self.ebitda,
            Field::TotalAssets => self.total_assets,
            Field::TotalLiabilities => self.total_liabilities,
            Field::ShareholderEquity => self.shareholder_equity,
            Field::CurrentAssets => self.current_assets,
            Field::CurrentLiabilities => self.current_liabilities,
            Field::Inventory => self.inventory,
            Field::CashAndEquivalents => self.cash_and_equivalents,
            Field::LongTermDebt => self.long_term_debt,
            Field::OperatingCashFlow => self.operating_cash_flow,
            Field::CapitalExpenditures => self.capital_expenditures,
            Field::DividendsPaid => self.dividends_paid,
            Field::SharesOutstanding => self.shares_outstanding,
            Field::MarketCap => self.market_cap,
        }
    }

    /// A field as a [`Metric`], `MissingField` when absent
    pub fn metric(&self, field: Field) -> Metric {
        Metric::from_field(self.get(field), field)
    }

    /// Fields the provider did not supply
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Free cash flow: operating cash flow minus capital expenditures
    pub fn free_cash_flow(&self) -> Metric {
        let capex = self.metric(Field::CapitalExpenditures).map(f64::abs);
        self.metric(Field::OperatingCashFlow).subtract(capex)
    }

    /// Reject values that cannot come from a real statement
    ///
    /// Every present field must be finite; prices, share counts, market
    /// capitalisation and balance-sheet totals must not be negative.
    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            let Some(value) = self.get(field) else {
                continue;
            };
            if !value.is_finite() {
                return Err(MetricsError::invalid(
                    field.as_str(),
                    format!("{value} is not a finite number"),
                ));
            }
            if value < 0.0 && Self::must_be_non_negative(field) {
                return Err(MetricsError::invalid(
                    field.as_str(),
                    format!("{value} must not be negative"),
                ));
            }
        }
        Ok(())
    }

    fn must_be_non_negative(field: Field) -> bool {
        matches!(
            field,
            Field::Price
                | Field::SharesOutstanding
                | Field::MarketCap
                | Field::TotalAssets
                | Field::TotalLiabilities
                | Field::CurrentAssets
                | Field::CurrentLiabilities
                | Field::Inventory
                | Field::CashAndEquivalents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_ticker_normalised() {
        assert_eq!(ticker(" aapl ").as_str(), "AAPL");
        assert_eq!(ticker("brk.b").as_str(), "BRK.B");
        assert_eq!(ticker("^gspc").as_str(), "^GSPC");
    }

    #[test]
    fn test_ticker_rejects_bad_input() {
        assert!(Ticker::parse("").is_err());
        assert!(Ticker::parse("   ").is_err());
        assert!(Ticker::parse("AAPL; DROP").is_err());
        assert!(Ticker::parse("ABCDEFGHIJKLMN").is_err());
    }

    #[test]
    fn test_ticker_serde() {
        let t: Ticker = serde_json::from_str("\"msft\"").unwrap();
        assert_eq!(t.as_str(), "MSFT");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"MSFT\"");
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
    }

    #[test]
    fn test_period_kind_aliases() {
        let kind: PeriodKind = serde_json::from_str("\"quarterly\"").unwrap();
        assert_eq!(kind, PeriodKind::Quarterly);
        let kind: PeriodKind = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(kind, PeriodKind::Annual);
    }

    #[test]
    fn test_period_display() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        assert_eq!(
            ReportingPeriod::new(PeriodKind::Annual, Some(date)).to_string(),
            "annual 2024-09-30"
        );
        assert_eq!(ReportingPeriod::trailing().to_string(), "trailing");
    }

    #[test]
    fn test_missing_fields() {
        let mut snap = FinancialSnapshot::trailing(ticker("AAPL"));
        assert_eq!(snap.missing_fields().len(), Field::ALL.len());

        snap.price = Some(150.0);
        let missing = snap.missing_fields();
        assert!(!missing.contains(&Field::Price));
        assert!(missing.contains(&Field::Eps));
    }

    #[test]
    fn test_free_cash_flow_treats_capex_as_outflow() {
        let mut snap = FinancialSnapshot::trailing(ticker("AAPL"));
        snap.operating_cash_flow = Some(100.0);
        snap.capital_expenditures = Some(30.0);
        assert_eq!(snap.free_cash_flow(), Metric::Available(70.0));

        snap.capital_expenditures = Some(-30.0);
        assert_eq!(snap.free_cash_flow(), Metric::Available(70.0));

        snap.capital_expenditures = None;
        assert!(!snap.free_cash_flow().is_available());
    }

    #[test]
    fn test_validate() {
        let mut snap = FinancialSnapshot::trailing(ticker("AAPL"));
        snap.price = Some(150.0);
        snap.net_income = Some(-5.0);
        assert!(snap.validate().is_ok());

        snap.price = Some(-1.0);
        let err = snap.validate().unwrap_err();
        assert!(err.to_string().contains("price"));

        snap.price = Some(f64::NAN);
        assert!(snap.validate().is_err());
    }
}
