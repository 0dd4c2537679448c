//! Alpha Vantage API client
//!
//! Alpha Vantage encodes every number as a string and reports gaps as
//! `"None"`. Payload types here decode those into `Option<f64>`.
//! Throttling comes back as HTTP 200 with a `Note` or `Information` key.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use invest_metrics::{PeriodKind, PriceBar};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Provider name used in errors and cache keys
pub const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage query functions used by the data layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    DailySeries,
    Overview,
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl Function {
    pub fn as_str(&self) -> &'static str {
        match self {
            Function::DailySeries => "TIME_SERIES_DAILY",
            Function::Overview => "OVERVIEW",
            Function::IncomeStatement => "INCOME_STATEMENT",
            Function::BalanceSheet => "BALANCE_SHEET",
            Function::CashFlow => "CASH_FLOW",
        }
    }
}

/// Decode an Alpha Vantage number: a numeric string, a bare number, or one of
/// the gap markers (`"None"`, `"-"`, empty, null)
fn number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_number(&s),
        _ => None,
    })
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !is_gap(s)))
}

fn optional_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

fn is_gap(raw: &str) -> bool {
    matches!(raw.trim(), "" | "None" | "none" | "-" | "N/A")
}

/// Parse a numeric field, treating gap markers and garbage as missing
pub fn parse_number(raw: &str) -> Option<f64> {
    if is_gap(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Company overview and trailing fundamentals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    #[serde(default)]
    pub symbol: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub exchange: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization", default, deserialize_with = "number")]
    pub market_cap: Option<f64>,
    #[serde(rename = "EBITDA", default, deserialize_with = "number")]
    pub ebitda: Option<f64>,
    #[serde(rename = "PERatio", default, deserialize_with = "number")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "ForwardPE", default, deserialize_with = "number")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "PEGRatio", default, deserialize_with = "number")]
    pub peg_ratio: Option<f64>,
    #[serde(rename = "PriceToBookRatio", default, deserialize_with = "number")]
    pub price_to_book: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub book_value: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "EPS", default, deserialize_with = "number")]
    pub eps: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub beta: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub profit_margin: Option<f64>,
    #[serde(rename = "QuarterlyRevenueGrowthYOY", default, deserialize_with = "number")]
    pub quarterly_revenue_growth_yoy: Option<f64>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY", default, deserialize_with = "number")]
    pub quarterly_earnings_growth_yoy: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_target_price: Option<f64>,
    #[serde(rename = "52WeekHigh", default, deserialize_with = "number")]
    pub week_52_high: Option<f64>,
    #[serde(rename = "52WeekLow", default, deserialize_with = "number")]
    pub week_52_low: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub shares_outstanding: Option<f64>,
}

/// Annual and quarterly reports of one financial statement, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementReports<T> {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "annualReports", default = "Vec::new")]
    pub annual: Vec<T>,
    #[serde(rename = "quarterlyReports", default = "Vec::new")]
    pub quarterly: Vec<T>,
}

impl<T> Default for StatementReports<T> {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            annual: Vec::new(),
            quarterly: Vec::new(),
        }
    }
}

impl<T> StatementReports<T> {
    /// Reports for a period kind; trailing figures come from annual reports
    pub fn reports(&self, kind: PeriodKind) -> &[T] {
        match kind {
            PeriodKind::Quarterly => &self.quarterly,
            PeriodKind::Annual | PeriodKind::Trailing => &self.annual,
        }
    }

    /// The `index`-th most recent report (0 = latest)
    pub fn nth(&self, kind: PeriodKind, index: usize) -> Option<&T> {
        self.reports(kind).get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.quarterly.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReport {
    #[serde(default, deserialize_with = "optional_date")]
    pub fiscal_date_ending: Option<NaiveDate>,
    #[serde(default, deserialize_with = "number")]
    pub total_revenue: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub gross_profit: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub operating_income: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub net_income: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub ebitda: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub research_and_development: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    #[serde(default, deserialize_with = "optional_date")]
    pub fiscal_date_ending: Option<NaiveDate>,
    #[serde(default, deserialize_with = "number")]
    pub total_assets: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub total_liabilities: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub total_shareholder_equity: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub total_current_assets: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub total_current_liabilities: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub inventory: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub cash_and_cash_equivalents_at_carrying_value: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub long_term_debt: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub short_term_debt: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub common_stock_shares_outstanding: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowReport {
    #[serde(default, deserialize_with = "optional_date")]
    pub fiscal_date_ending: Option<NaiveDate>,
    #[serde(default, deserialize_with = "number")]
    pub operating_cashflow: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub capital_expenditures: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dividend_payout: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub change_in_cash_and_cash_equivalents: Option<f64>,
}

/// Raw daily bar as Alpha Vantage labels it
#[derive(Debug, Deserialize)]
struct DailyValues {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Reject error, throttling and empty payloads
pub fn check_payload(symbol: &str, data: &Value) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(DataError::unavailable(symbol, text_of(error)));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(DataError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Err(DataError::unavailable(symbol, "empty response"));
    }

    Ok(())
}

fn text_of(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), ToString::to_string)
}

/// Parse a `TIME_SERIES_DAILY` payload into bars, newest first
pub fn parse_daily(symbol: &str, data: &Value) -> Result<Vec<PriceBar>> {
    check_payload(symbol, data)?;

    let series = data
        .get("Time Series (Daily)")
        .and_then(Value::as_object)
        .ok_or_else(|| DataError::unavailable(symbol, "no daily price data"))?;

    let mut bars = Vec::with_capacity(series.len());
    for (date, values) in series {
        let values: DailyValues = serde_json::from_value(values.clone())?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DataError::upstream(PROVIDER, format!("bad date '{date}': {e}")))?;
        let field = |raw: &str, name: &str| {
            parse_number(raw).ok_or_else(|| {
                DataError::upstream(PROVIDER, format!("bad {name} '{raw}' for {date}"))
            })
        };

        bars.push(PriceBar {
            date,
            open: field(&values.open, "open")?,
            high: field(&values.high, "high")?,
            low: field(&values.low, "low")?,
            close: field(&values.close, "close")?,
            volume: field(&values.volume, "volume")? as u64,
        });
    }

    if bars.is_empty() {
        return Err(DataError::unavailable(symbol, "no daily price data"));
    }
    bars.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(bars)
}

pub fn parse_overview(symbol: &str, data: &Value) -> Result<CompanyOverview> {
    check_payload(symbol, data)?;
    Ok(serde_json::from_value(data.clone())?)
}

pub fn parse_statements<T: DeserializeOwned>(
    symbol: &str,
    data: &Value,
) -> Result<StatementReports<T>> {
    check_payload(symbol, data)?;
    Ok(serde_json::from_value(data.clone())?)
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a client with an API key, a per-minute request budget and a
    /// request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    pub fn from_config(config: &crate::InvestConfig) -> Result<Self> {
        Self::new(
            config.alpha_vantage_api_key.clone(),
            config.alpha_vantage_rate_limit,
            config.request_timeout,
        )
    }

    /// Run one query and return the checked JSON payload
    pub async fn fetch(&self, function: Function, symbol: &str) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let mut params = HashMap::new();
        params.insert("function", function.as_str());
        params.insert("symbol", symbol);
        params.insert("apikey", self.api_key.as_str());
        if function == Function::DailySeries {
            params.insert("outputsize", "compact");
        }

        tracing::debug!(function = function.as_str(), symbol, "Alpha Vantage request");
        let response = self.client.get(BASE_URL).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::upstream(PROVIDER, format!("HTTP error: {status}")));
        }

        let data: Value = response.json().await?;
        check_payload(symbol, &data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("150.25"), Some(150.25));
        assert_eq!(parse_number(" -3 "), Some(-3.0));
        assert_eq!(parse_number("None"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_check_payload() {
        let err =
            check_payload("ZZZZ", &json!({"Error Message": "Invalid API call."})).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
        assert!(err.to_string().contains("Invalid API call."));

        let err = check_payload("IBM", &json!({"Note": "Thank you for using Alpha Vantage!"}))
            .unwrap_err();
        assert!(matches!(err, DataError::RateLimitExceeded { .. }));

        let demo = json!({"Information": "The demo API key is for demo purposes only."});
        let err = check_payload("IBM", &demo).unwrap_err();
        assert!(err.is_retryable());

        assert!(check_payload("IBM", &json!({})).is_err());
        assert!(check_payload("IBM", &json!({"Symbol": "IBM"})).is_ok());
    }

    #[test]
    fn test_parse_overview() {
        let data = json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "171000000000",
            "PERatio": "22.5",
            "PEGRatio": "None",
            "BookValue": "24.5",
            "EPS": "8.14",
            "QuarterlyRevenueGrowthYOY": "0.015",
            "QuarterlyEarningsGrowthYOY": "-",
            "52WeekHigh": "199.18",
            "SharesOutstanding": "916000000"
        });

        let overview = parse_overview("IBM", &data).unwrap();
        assert_eq!(overview.symbol, "IBM");
        assert_eq!(overview.name.as_deref(), Some("International Business Machines"));
        assert_eq!(overview.market_cap, Some(171_000_000_000.0));
        assert_eq!(overview.pe_ratio, Some(22.5));
        assert_eq!(overview.peg_ratio, None);
        assert_eq!(overview.quarterly_earnings_growth_yoy, None);
        assert_eq!(overview.week_52_high, Some(199.18));
        assert_eq!(overview.industry, None);
    }

    #[test]
    fn test_parse_statements() {
        let data = json!({
            "symbol": "IBM",
            "annualReports": [
                {"fiscalDateEnding": "2023-12-31", "totalRevenue": "61860000000", "netIncome": "7502000000", "ebitda": "None"},
                {"fiscalDateEnding": "2022-12-31", "totalRevenue": "60530000000", "netIncome": "1639000000"}
            ],
            "quarterlyReports": []
        });

        let reports: StatementReports<IncomeReport> = parse_statements("IBM", &data).unwrap();
        assert_eq!(reports.annual.len(), 2);

        let latest = reports.nth(PeriodKind::Annual, 0).unwrap();
        assert_eq!(latest.fiscal_date_ending, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(latest.total_revenue, Some(61_860_000_000.0));
        assert_eq!(latest.ebitda, None);
        assert!(reports.nth(PeriodKind::Quarterly, 0).is_none());
        assert!(reports.nth(PeriodKind::Annual, 2).is_none());
    }

    #[test]
    fn test_parse_balance_and_cash_flow_fields() {
        let balance: BalanceReport = serde_json::from_value(json!({
            "totalShareholderEquity": "22533000000",
            "cashAndCashEquivalentsAtCarryingValue": "13068000000",
            "commonStockSharesOutstanding": "916000000"
        }))
        .unwrap();
        assert_eq!(balance.total_shareholder_equity, Some(22_533_000_000.0));
        assert_eq!(
            balance.cash_and_cash_equivalents_at_carrying_value,
            Some(13_068_000_000.0)
        );
        assert_eq!(balance.common_stock_shares_outstanding, Some(916_000_000.0));

        let cash_flow: CashFlowReport = serde_json::from_value(json!({
            "operatingCashflow": "13931000000",
            "capitalExpenditures": "1246000000",
            "dividendPayout": "6040000000"
        }))
        .unwrap();
        assert_eq!(cash_flow.operating_cashflow, Some(13_931_000_000.0));
        assert_eq!(cash_flow.capital_expenditures, Some(1_246_000_000.0));
    }

    #[test]
    fn test_parse_daily() {
        let data = json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-03-01": {"1. open": "185.0", "2. high": "188.0", "3. low": "184.0", "4. close": "187.5", "5. volume": "4000000"},
                "2024-03-04": {"1. open": "187.5", "2. high": "190.0", "3. low": "186.0", "4. close": "189.0", "5. volume": "3500000"}
            }
        });

        let bars = parse_daily("IBM", &data).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(bars[0].close, 189.0);
        assert_eq!(bars[1].volume, 4_000_000);
    }

    #[test]
    fn test_parse_daily_rejects_bad_numbers() {
        let data = json!({
            "Time Series (Daily)": {
                "2024-03-01": {"1. open": "x", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1"}
            }
        });
        assert!(parse_daily("IBM", &data).is_err());
    }

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("test_key", 0, Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_key, "test_key");
    }
}
