//! 4-point investment checklist screen
//!
//! Gathers the raw figures an analyst walks through (business quality,
//! financial health, valuation, risk) and screens the computed valuation
//! metrics against the checklist thresholds.

use super::{Market, fetch_failed, ticker_property};
use crate::reply::{Reply, reported, text};
use crate::request::ChecklistRequest;
use async_trait::async_trait;
use invest_data::{CompanyOverview, MarketDataSource, fetch_provider_data};
use invest_metrics::{
    ChecklistThresholds, Field, FinancialRatios, FinancialSnapshot, Metric, PeriodKind,
    ScreeningVerdict, Ticker, ValuationMetrics, compute_financial_ratios,
    compute_valuation_metrics, screen_against_checklist,
};
use invest_tools::{Result, Tool};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessQuality {
    pub net_profit_margin: Metric,
    pub gross_profit_margin: Metric,
    pub operating_margin: Metric,
    pub market_cap: Metric,
    pub sector: String,
    pub industry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancialHealth {
    pub debt_to_equity: Metric,
    pub debt_to_assets: Metric,
    pub equity_multiplier: Metric,
    pub current_ratio: Metric,
    pub quick_ratio: Metric,
    pub cash_ratio: Metric,
    pub operating_cash_flow: Metric,
    pub free_cash_flow: Metric,
    pub capital_expenditures: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChecklistValuation {
    pub pe_ratio: Metric,
    pub peg_ratio: Metric,
    pub forward_pe: Metric,
    pub price_to_book: Metric,
    pub analyst_target: Metric,
    #[serde(rename = "52_week_high")]
    pub week_52_high: Metric,
    #[serde(rename = "52_week_low")]
    pub week_52_low: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskIndicators {
    pub beta: Metric,
    pub dividend_yield: Metric,
    pub revenue_growth_yoy: Metric,
    pub earnings_growth_yoy: Metric,
    pub earnings_per_share: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checklist {
    pub ticker: Ticker,
    pub company_name: String,
    pub business_quality: BusinessQuality,
    pub financial_health: FinancialHealth,
    pub valuation_metrics: ChecklistValuation,
    pub risk_indicators: RiskIndicators,
    pub thresholds: ChecklistThresholds,
    pub screening: ScreeningVerdict,
}

impl Checklist {
    fn assemble(
        ticker: Ticker,
        overview: &CompanyOverview,
        metrics: &ValuationMetrics,
        snapshot: &FinancialSnapshot,
        ratios: &FinancialRatios,
        thresholds: ChecklistThresholds,
        screening: ScreeningVerdict,
    ) -> Self {
        Self {
            ticker,
            company_name: text(overview.name.as_deref()),
            business_quality: BusinessQuality {
                net_profit_margin: ratios.profitability.net_profit_margin,
                gross_profit_margin: ratios.profitability.gross_profit_margin,
                operating_margin: ratios.profitability.operating_margin,
                market_cap: metrics.market_cap,
                sector: text(overview.sector.as_deref()),
                industry: text(overview.industry.as_deref()),
            },
            financial_health: FinancialHealth {
                debt_to_equity: ratios.leverage.debt_to_equity,
                debt_to_assets: ratios.leverage.debt_to_assets,
                equity_multiplier: ratios.leverage.equity_multiplier,
                current_ratio: ratios.liquidity.current_ratio,
                quick_ratio: ratios.liquidity.quick_ratio,
                cash_ratio: ratios.liquidity.cash_ratio,
                operating_cash_flow: snapshot.metric(Field::OperatingCashFlow),
                free_cash_flow: metrics.free_cash_flow,
                capital_expenditures: snapshot.metric(Field::CapitalExpenditures),
            },
            valuation_metrics: ChecklistValuation {
                pe_ratio: metrics.pe_ratio,
                peg_ratio: metrics.peg_ratio,
                forward_pe: reported(overview.forward_pe),
                price_to_book: metrics.price_to_book,
                analyst_target: reported(overview.analyst_target_price),
                week_52_high: reported(overview.week_52_high),
                week_52_low: reported(overview.week_52_low),
            },
            risk_indicators: RiskIndicators {
                beta: reported(overview.beta),
                dividend_yield: reported(overview.dividend_yield),
                revenue_growth_yoy: metrics.revenue_growth,
                earnings_growth_yoy: metrics.eps_growth,
                earnings_per_share: metrics.eps,
            },
            thresholds,
            screening,
        }
    }
}

pub(crate) async fn run_checklist(
    market: &dyn MarketDataSource,
    ticker: &Ticker,
    thresholds: ChecklistThresholds,
) -> Reply<Checklist> {
    let data = match fetch_provider_data(market, ticker).await {
        Ok(data) => data,
        Err(e) => {
            return Reply::error(format!(
                "Unable to complete checklist - fundamental data unavailable. {}",
                fetch_failed("checklist data", ticker, &e)
            ));
        }
    };
    let Some(overview) = data.overview.as_ref() else {
        return Reply::error(format!(
            "Unable to complete checklist - fundamental data unavailable for {ticker}."
        ));
    };

    let snapshot = data.snapshot(ticker, PeriodKind::Trailing, 0);
    let computed = compute_valuation_metrics(&snapshot).and_then(|valuation| {
        let ratios = compute_financial_ratios(&snapshot)?;
        let verdict = screen_against_checklist(&valuation.metrics, &thresholds)?;
        Ok((valuation, ratios, verdict))
    });
    let (valuation, ratios, verdict) = match computed {
        Ok(computed) => computed,
        Err(e) => {
            tracing::warn!(ticker = %ticker, "Checklist input rejected: {e}");
            return Reply::error(format!("Unable to complete checklist for {ticker}: {e}"));
        }
    };

    tracing::info!(
        ticker = %ticker,
        recommended = verdict.recommended,
        "Checklist screen complete"
    );

    Reply::success(Checklist::assemble(
        ticker.clone(),
        overview,
        &valuation.metrics,
        &snapshot,
        &ratios,
        thresholds,
        verdict,
    ))
}

pub struct InvestmentChecklistScreenTool {
    market: Market,
}

impl InvestmentChecklistScreenTool {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for InvestmentChecklistScreenTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let request = ChecklistRequest::parse(params)?;
        run_checklist(self.market.as_ref(), &request.ticker, request.thresholds)
            .await
            .into_value()
    }

    fn name(&self) -> &str {
        "investment_checklist_screen"
    }

    fn description(&self) -> &str {
        "Gather the data for a systematic 4-point evaluation (business quality, financial \
         health, valuation, risk) and screen it against checklist thresholds: revenue growth \
         floor, debt-to-equity ceiling with positive free cash flow, P/E ceiling and EPS \
         growth floor."
    }

    fn input_schema(&self) -> Value {
        let defaults = ChecklistThresholds::default();
        json!({
            "type": "object",
            "properties": {
                "ticker": ticker_property(),
                "thresholds": {
                    "type": "object",
                    "description": "Screening thresholds; omitted fields use the defaults, null switches a criterion off",
                    "properties": {
                        "min_revenue_growth": {
                            "type": ["number", "null"],
                            "description": "Minimum revenue growth as a fraction (0.05 = 5%)",
                            "default": defaults.min_revenue_growth
                        },
                        "max_debt_to_equity": {
                            "type": ["number", "null"],
                            "default": defaults.max_debt_to_equity
                        },
                        "require_positive_free_cash_flow": {
                            "type": "boolean",
                            "default": defaults.require_positive_free_cash_flow
                        },
                        "max_pe": {
                            "type": ["number", "null"],
                            "default": defaults.max_pe
                        },
                        "min_eps_growth": {
                            "type": ["number", "null"],
                            "description": "Minimum EPS growth as a fraction",
                            "default": defaults.min_eps_growth
                        }
                    }
                }
            },
            "required": ["ticker"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{self, MockMarket};

    fn outcome<'a>(out: &'a Value, criterion: &str) -> &'a Value {
        &out["screening"]["criteria"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["criterion"] == criterion)
            .unwrap()["outcome"]
    }

    #[tokio::test]
    async fn test_fails_valuation_and_growth() {
        // P/E 30 against a 25 ceiling, EPS growth 8% against a 10% floor
        let tool = InvestmentChecklistScreenTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool
            .execute(json!({
                "ticker": "AAPL",
                "thresholds": {"max_pe": 25.0, "min_eps_growth": 0.1}
            }))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["company_name"], "Apple Inc");
        assert_eq!(outcome(&out, "valuation"), "fail");
        assert_eq!(outcome(&out, "growth"), "fail");
        assert_eq!(outcome(&out, "velocity_of_change"), "pass");
        assert_eq!(outcome(&out, "sustainability"), "pass");
        assert_eq!(out["screening"]["recommended"], false);
        assert_eq!(out["screening"]["valuation_view"], "overvalued");
    }

    #[tokio::test]
    async fn test_passes_relaxed_thresholds() {
        let tool = InvestmentChecklistScreenTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool
            .execute(json!({
                "ticker": "AAPL",
                "thresholds": {"max_pe": 35.0, "min_eps_growth": 0.05}
            }))
            .await
            .unwrap();
        assert_eq!(out["screening"]["recommended"], true);
    }

    #[tokio::test]
    async fn test_checklist_groups() {
        let tool = InvestmentChecklistScreenTool::new(fixtures::shared(fixtures::healthy()));
        let out = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();

        assert_eq!(out["business_quality"]["net_profit_margin"], 25.0);
        assert_eq!(out["business_quality"]["sector"], "TECHNOLOGY");
        assert_eq!(out["financial_health"]["current_ratio"], 1.5);
        assert_eq!(out["financial_health"]["free_cash_flow"], 5_000.0);
        assert_eq!(out["valuation_metrics"]["pe_ratio"], 30.0);
        assert_eq!(out["valuation_metrics"]["52_week_low"], 164.1);
        assert_eq!(out["risk_indicators"]["beta"], 1.24);
        assert_eq!(out["thresholds"]["max_pe"], 25.0);
    }

    #[tokio::test]
    async fn test_missing_overview_is_error() {
        let mut market = MockMarket::new();
        market
            .expect_daily_prices()
            .returning(|_| Ok(fixtures::bars(&[150.0])));
        market
            .expect_company_overview()
            .returning(|_| Err(fixtures::unavailable()));
        market.expect_income_statements().returning(|_| Ok(fixtures::income()));
        market.expect_balance_sheets().returning(|_| Ok(fixtures::balance()));
        market.expect_cash_flows().returning(|_| Ok(fixtures::cash_flow()));

        let out = InvestmentChecklistScreenTool::new(fixtures::shared(market))
            .execute(json!({"ticker": "AAPL"}))
            .await
            .unwrap();
        assert_eq!(out["status"], "error");
        assert!(
            out["message"]
                .as_str()
                .unwrap()
                .contains("fundamental data unavailable")
        );
    }

    #[tokio::test]
    async fn test_invalid_thresholds_are_err() {
        let tool = InvestmentChecklistScreenTool::new(fixtures::shared(MockMarket::new()));
        let result = tool
            .execute(json!({"ticker": "AAPL", "thresholds": {"max_debt_to_equity": 0.0}}))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_metadata() {
        let tool = InvestmentChecklistScreenTool::new(fixtures::shared(MockMarket::new()));
        assert_eq!(tool.name(), "investment_checklist_screen");
        let schema = tool.input_schema();
        assert_eq!(schema["properties"]["thresholds"]["properties"]["max_pe"]["default"], 25.0);
    }
}
