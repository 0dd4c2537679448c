//! Building [`FinancialSnapshot`]s from provider reports

use crate::api::{BalanceReport, CashFlowReport, CompanyOverview, IncomeReport, StatementReports};
use invest_metrics::{FinancialSnapshot, PeriodKind, ReportingPeriod, Ticker};

/// Everything fetched for one ticker; any part may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderData {
    pub overview: Option<CompanyOverview>,
    pub income: Option<StatementReports<IncomeReport>>,
    pub balance: Option<StatementReports<BalanceReport>>,
    pub cash_flow: Option<StatementReports<CashFlowReport>>,
    /// Latest close
    pub latest_price: Option<f64>,
}

impl ProviderData {
    pub fn is_empty(&self) -> bool {
        self.overview.is_none()
            && self.income.is_none()
            && self.balance.is_none()
            && self.cash_flow.is_none()
            && self.latest_price.is_none()
    }

    fn income(&self, kind: PeriodKind, index: usize) -> Option<&IncomeReport> {
        self.income.as_ref()?.nth(kind, index)
    }

    fn balance(&self, kind: PeriodKind, index: usize) -> Option<&BalanceReport> {
        self.balance.as_ref()?.nth(kind, index)
    }

    fn cash_flow(&self, kind: PeriodKind, index: usize) -> Option<&CashFlowReport> {
        self.cash_flow.as_ref()?.nth(kind, index)
    }

    /// Snapshot for the `index`-th most recent period of `kind` (0 = latest)
    ///
    /// Trailing snapshots take per-share figures, growth and market cap from
    /// the company overview and statement lines from the latest annual
    /// report. Annual and quarterly snapshots derive EPS and book value per
    /// share from the statements, and growth from the next older report.
    /// Only the latest period carries a price.
    pub fn snapshot(&self, ticker: &Ticker, kind: PeriodKind, index: usize) -> FinancialSnapshot {
        let income = self.income(kind, index);
        let balance = self.balance(kind, index);
        let cash_flow = self.cash_flow(kind, index);
        let overview = self.overview.as_ref();

        let fiscal_date = income
            .and_then(|r| r.fiscal_date_ending)
            .or_else(|| balance.and_then(|r| r.fiscal_date_ending))
            .or_else(|| cash_flow.and_then(|r| r.fiscal_date_ending));
        let mut s = FinancialSnapshot::new(ticker.clone(), ReportingPeriod::new(kind, fiscal_date));

        if let Some(r) = income {
            s.revenue = r.total_revenue;
            s.gross_profit = r.gross_profit;
            s.operating_income = r.operating_income;
            s.net_income = r.net_income;
            s.ebitda = r.ebitda;
        }
        if let Some(r) = balance {
            s.total_assets = r.total_assets;
            s.total_liabilities = r.total_liabilities;
            s.shareholder_equity = r.total_shareholder_equity;
            s.current_assets = r.total_current_assets;
            s.current_liabilities = r.total_current_liabilities;
            s.inventory = r.inventory;
            s.cash_and_equivalents = r.cash_and_cash_equivalents_at_carrying_value;
            s.long_term_debt = r.long_term_debt;
            s.shares_outstanding = r.common_stock_shares_outstanding;
        }
        if let Some(r) = cash_flow {
            s.operating_cash_flow = r.operating_cashflow;
            s.capital_expenditures = r.capital_expenditures;
            s.dividends_paid = r.dividend_payout;
        }
        if s.shares_outstanding.is_none() {
            s.shares_outstanding = overview.and_then(|o| o.shares_outstanding);
        }
        if index == 0 {
            s.price = self.latest_price;
        }

        if kind == PeriodKind::Trailing {
            if let Some(o) = overview {
                s.eps = o.eps;
                s.book_value_per_share = o.book_value;
                s.eps_growth = o.quarterly_earnings_growth_yoy;
                s.revenue_growth = o.quarterly_revenue_growth_yoy;
                s.market_cap = o.market_cap;
                s.ebitda = o.ebitda.or(s.ebitda);
            }
            return s;
        }

        s.eps = per_share(s.net_income, s.shares_outstanding);
        s.book_value_per_share = per_share(s.shareholder_equity, s.shares_outstanding);

        let prior_income = self.income(kind, index + 1);
        let prior_shares = self
            .balance(kind, index + 1)
            .and_then(|r| r.common_stock_shares_outstanding)
            .or(s.shares_outstanding);
        let prior_eps = per_share(prior_income.and_then(|r| r.net_income), prior_shares);

        s.revenue_growth = fraction_change(s.revenue, prior_income.and_then(|r| r.total_revenue));
        s.eps_growth = fraction_change(s.eps, prior_eps);
        s
    }

    /// Latest snapshot and, when a second period was reported, the one before
    ///
    /// Trailing data has no prior period of its own, so it pairs annual
    /// reports instead.
    pub fn snapshot_pair(
        &self,
        ticker: &Ticker,
        kind: PeriodKind,
    ) -> (FinancialSnapshot, Option<FinancialSnapshot>) {
        let kind = match kind {
            PeriodKind::Trailing => PeriodKind::Annual,
            other => other,
        };
        let has_prior = self.income(kind, 1).is_some()
            || self.balance(kind, 1).is_some()
            || self.cash_flow(kind, 1).is_some();

        let current = self.snapshot(ticker, kind, 0);
        let prior = has_prior.then(|| self.snapshot(ticker, kind, 1));
        (current, prior)
    }
}

fn per_share(amount: Option<f64>, shares: Option<f64>) -> Option<f64> {
    match (amount, shares) {
        (Some(amount), Some(shares)) if shares > 0.0 => Some(amount / shares),
        _ => None,
    }
}

/// Fractional change against the magnitude of the prior value
fn fraction_change(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    match (current, prior) {
        (Some(current), Some(prior)) if prior != 0.0 => Some((current - prior) / prior.abs()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ticker() -> Ticker {
        Ticker::parse("IBM").unwrap()
    }

    fn income(date: &str, revenue: f64, net_income: f64) -> IncomeReport {
        IncomeReport {
            fiscal_date_ending: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            total_revenue: Some(revenue),
            net_income: Some(net_income),
            ..Default::default()
        }
    }

    fn balance(equity: f64, shares: f64) -> BalanceReport {
        BalanceReport {
            total_assets: Some(1_000.0),
            total_liabilities: Some(600.0),
            total_shareholder_equity: Some(equity),
            common_stock_shares_outstanding: Some(shares),
            ..Default::default()
        }
    }

    fn data() -> ProviderData {
        ProviderData {
            overview: Some(CompanyOverview {
                symbol: "IBM".to_string(),
                eps: Some(8.0),
                book_value: Some(24.0),
                quarterly_earnings_growth_yoy: Some(0.12),
                quarterly_revenue_growth_yoy: Some(0.03),
                market_cap: Some(170_000.0),
                shares_outstanding: Some(100.0),
                ..Default::default()
            }),
            income: Some(StatementReports {
                symbol: "IBM".to_string(),
                annual: vec![
                    income("2023-12-31", 1_100.0, 200.0),
                    income("2022-12-31", 1_000.0, 100.0),
                ],
                quarterly: vec![],
            }),
            balance: Some(StatementReports {
                symbol: "IBM".to_string(),
                annual: vec![balance(400.0, 100.0), balance(380.0, 100.0)],
                quarterly: vec![],
            }),
            cash_flow: None,
            latest_price: Some(180.0),
        }
    }

    #[test]
    fn test_trailing_snapshot_uses_overview() {
        let s = data().snapshot(&ticker(), PeriodKind::Trailing, 0);
        assert_eq!(s.period.kind, PeriodKind::Trailing);
        assert_eq!(s.price, Some(180.0));
        assert_eq!(s.eps, Some(8.0));
        assert_eq!(s.book_value_per_share, Some(24.0));
        assert_eq!(s.eps_growth, Some(0.12));
        assert_eq!(s.market_cap, Some(170_000.0));
        // statement lines still come from the latest annual report
        assert_eq!(s.revenue, Some(1_100.0));
        assert_eq!(s.total_liabilities, Some(600.0));
        assert_eq!(s.operating_cash_flow, None);
    }

    #[test]
    fn test_annual_snapshot_derives_per_share_and_growth() {
        let s = data().snapshot(&ticker(), PeriodKind::Annual, 0);
        assert_eq!(s.period.fiscal_date_ending, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(s.eps, Some(2.0));
        assert_eq!(s.book_value_per_share, Some(4.0));
        assert_eq!(s.revenue_growth, Some(0.1));
        assert_eq!(s.eps_growth, Some(1.0));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_prior_snapshot_has_no_price() {
        let (current, prior) = data().snapshot_pair(&ticker(), PeriodKind::Trailing);
        assert_eq!(current.period.kind, PeriodKind::Annual);
        assert_eq!(current.price, Some(180.0));

        let prior = prior.unwrap();
        assert_eq!(prior.price, None);
        assert_eq!(prior.revenue, Some(1_000.0));
        assert_eq!(prior.eps, Some(1.0));
        // nothing older to compare against
        assert_eq!(prior.revenue_growth, None);
    }

    #[test]
    fn test_single_period_has_no_prior() {
        let mut data = data();
        data.income.as_mut().unwrap().annual.truncate(1);
        data.balance.as_mut().unwrap().annual.truncate(1);

        let (_, prior) = data.snapshot_pair(&ticker(), PeriodKind::Annual);
        assert!(prior.is_none());
    }

    #[test]
    fn test_empty_data() {
        let data = ProviderData::default();
        assert!(data.is_empty());

        let s = data.snapshot(&ticker(), PeriodKind::Quarterly, 0);
        assert_eq!(s.missing_fields().len(), invest_metrics::Field::ALL.len());
    }

    #[test]
    fn test_fraction_change_against_negative_prior() {
        assert_eq!(fraction_change(Some(-50.0), Some(-100.0)), Some(0.5));
        assert_eq!(fraction_change(Some(5.0), Some(0.0)), None);
        assert_eq!(per_share(Some(10.0), Some(0.0)), None);
    }
}
