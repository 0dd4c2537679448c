//! Wiring the research tools into a [`ToolRegistry`]

use crate::tools::{
    AnalyzeGrowthTrendsTool, CalculateFinancialRatiosTool, CalculateValuationMetricsTool,
    CompareStocksTool, GenerateInvestmentReportTool, GetBalanceSheetTool, GetCashFlowTool,
    GetIncomeStatementTool, GetStockFundamentalsTool, GetStockInfoTool, GetStockPriceTool,
    InvestmentChecklistScreenTool, Market, SearchInvestmentResearchTool,
};
use invest_data::{InvestConfig, LiveMarketData, LiveResearchSearch, ResearchSearch};
use invest_tools::{Tool, ToolRegistry};
use std::sync::Arc;

/// Every tool name, research first, in the order the agent is briefed on them
pub const TOOL_NAMES: [&str; 13] = [
    "search_investment_research",
    "investment_checklist_screen",
    "get_stock_price",
    "get_stock_fundamentals",
    "compare_stocks",
    "get_stock_info",
    "get_income_statement",
    "get_balance_sheet",
    "get_cash_flow",
    "calculate_valuation_metrics",
    "generate_investment_report",
    "calculate_financial_ratios",
    "analyze_growth_trends",
];

/// Register all 13 tools over the given data sources
///
/// Without `search` the research tool still registers and answers `info`.
pub fn build_registry(market: Market, search: Option<Arc<dyn ResearchSearch>>) -> ToolRegistry {
    let registry = ToolRegistry::new();
    let tools: [Arc<dyn Tool>; 13] = [
        Arc::new(SearchInvestmentResearchTool::new(search)),
        Arc::new(InvestmentChecklistScreenTool::new(Arc::clone(&market))),
        Arc::new(GetStockPriceTool::new(Arc::clone(&market))),
        Arc::new(GetStockFundamentalsTool::new(Arc::clone(&market))),
        Arc::new(CompareStocksTool::new(Arc::clone(&market))),
        Arc::new(GetStockInfoTool::new(Arc::clone(&market))),
        Arc::new(GetIncomeStatementTool::new(Arc::clone(&market))),
        Arc::new(GetBalanceSheetTool::new(Arc::clone(&market))),
        Arc::new(GetCashFlowTool::new(Arc::clone(&market))),
        Arc::new(CalculateValuationMetricsTool::new(Arc::clone(&market))),
        Arc::new(GenerateInvestmentReportTool::new(Arc::clone(&market))),
        Arc::new(CalculateFinancialRatiosTool::new(Arc::clone(&market))),
        Arc::new(AnalyzeGrowthTrendsTool::new(market)),
    ];
    for tool in tools {
        registry.register(tool);
    }
    registry
}

/// Registry backed by the live providers described by `config`
pub fn live_registry(config: &InvestConfig) -> invest_data::Result<ToolRegistry> {
    let market: Market = Arc::new(LiveMarketData::new(config)?);
    let search = LiveResearchSearch::from_config(config)?
        .map(|search| Arc::new(search) as Arc<dyn ResearchSearch>);
    if search.is_none() {
        tracing::info!("Research search not configured; research queries will answer info");
    }

    let registry = build_registry(market, search);
    tracing::info!(tools = registry.len(), "Tool registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{self, MockMarket};
    use serde_json::json;

    #[test]
    fn test_every_tool_is_registered() {
        let registry = build_registry(fixtures::shared(MockMarket::new()), None);
        assert_eq!(registry.len(), TOOL_NAMES.len());
        for name in TOOL_NAMES {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_definitions_carry_schemas() {
        let registry = build_registry(fixtures::shared(MockMarket::new()), None);
        for definition in registry.definitions() {
            assert!(!definition.description.is_empty(), "{}", definition.name);
            assert_eq!(definition.input_schema["type"], "object", "{}", definition.name);
        }
    }

    #[tokio::test]
    async fn test_call_through_registry() {
        let registry = build_registry(fixtures::shared(fixtures::healthy()), None);
        let out = registry
            .call("get_stock_price", json!({"ticker": "aapl"}))
            .await
            .unwrap();
        assert_eq!(out["ticker"], "AAPL");
        assert_eq!(out["current_price"], 150.0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = build_registry(fixtures::shared(MockMarket::new()), None);
        assert!(registry.call("get_crypto_price", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_live_registry_without_search() {
        let config = InvestConfig::builder().build().unwrap();
        let registry = live_registry(&config).unwrap();
        assert_eq!(registry.len(), 13);
    }
}
