//! Liquidity, profitability and leverage ratios

use crate::error::Result;
use crate::metric::{Field, Metric};
use crate::snapshot::FinancialSnapshot;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiquidityRatios {
    /// Current assets / current liabilities
    pub current_ratio: Metric,
    /// (Current assets - inventory) / current liabilities
    pub quick_ratio: Metric,
    /// Cash and equivalents / current liabilities
    pub cash_ratio: Metric,
}

/// Margins, in percent of revenue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitabilityRatios {
    pub net_profit_margin: Metric,
    pub gross_profit_margin: Metric,
    pub operating_margin: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeverageRatios {
    pub debt_to_assets: Metric,
    pub debt_to_equity: Metric,
    /// Total assets / shareholder equity
    pub equity_multiplier: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancialRatios {
    pub liquidity: LiquidityRatios,
    pub profitability: ProfitabilityRatios,
    pub leverage: LeverageRatios,
}

/// Derive balance-sheet and income-statement ratios from a snapshot
pub fn compute_financial_ratios(snapshot: &FinancialSnapshot) -> Result<FinancialRatios> {
    snapshot.validate()?;

    let m = |field| snapshot.metric(field);
    let current_liabilities = m(Field::CurrentLiabilities);
    let revenue = m(Field::Revenue);
    let total_assets = m(Field::TotalAssets);
    let equity = m(Field::ShareholderEquity);
    let percent_of_revenue = |field| m(field).divide(revenue).map(|r| r * 100.0);

    Ok(FinancialRatios {
        liquidity: LiquidityRatios {
            current_ratio: m(Field::CurrentAssets).divide(current_liabilities),
            quick_ratio: m(Field::CurrentAssets)
                .subtract(m(Field::Inventory))
                .divide(current_liabilities),
            cash_ratio: m(Field::CashAndEquivalents).divide(current_liabilities),
        },
        profitability: ProfitabilityRatios {
            net_profit_margin: percent_of_revenue(Field::NetIncome),
            gross_profit_margin: percent_of_revenue(Field::GrossProfit),
            operating_margin: percent_of_revenue(Field::OperatingIncome),
        },
        leverage: LeverageRatios {
            debt_to_assets: m(Field::TotalLiabilities).divide(total_assets),
            debt_to_equity: m(Field::TotalLiabilities).divide(equity),
            equity_multiplier: total_assets.divide(equity),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Gap;
    use crate::snapshot::Ticker;

    fn snapshot() -> FinancialSnapshot {
        let mut snap = FinancialSnapshot::trailing(Ticker::parse("MSFT").unwrap());
        snap.current_assets = Some(200.0);
        snap.current_liabilities = Some(100.0);
        snap.inventory = Some(50.0);
        snap.cash_and_equivalents = Some(25.0);
        snap.revenue = Some(1_000.0);
        snap.net_income = Some(250.0);
        snap.gross_profit = Some(700.0);
        snap.operating_income = Some(400.0);
        snap.total_assets = Some(800.0);
        snap.total_liabilities = Some(400.0);
        snap.shareholder_equity = Some(400.0);
        snap
    }

    #[test]
    fn test_ratios() {
        let ratios = compute_financial_ratios(&snapshot()).unwrap();

        assert_eq!(ratios.liquidity.current_ratio, Metric::Available(2.0));
        assert_eq!(ratios.liquidity.quick_ratio, Metric::Available(1.5));
        assert_eq!(ratios.liquidity.cash_ratio, Metric::Available(0.25));

        assert_eq!(ratios.profitability.net_profit_margin, Metric::Available(25.0));
        assert_eq!(ratios.profitability.gross_profit_margin, Metric::Available(70.0));
        assert_eq!(ratios.profitability.operating_margin, Metric::Available(40.0));

        assert_eq!(ratios.leverage.debt_to_assets, Metric::Available(0.5));
        assert_eq!(ratios.leverage.debt_to_equity, Metric::Available(1.0));
        assert_eq!(ratios.leverage.equity_multiplier, Metric::Available(2.0));
    }

    #[test]
    fn test_missing_inventory_only_affects_quick_ratio() {
        let mut snap = snapshot();
        snap.inventory = None;
        let ratios = compute_financial_ratios(&snap).unwrap();

        assert_eq!(
            ratios.liquidity.quick_ratio,
            Metric::NotAvailable(Gap::MissingField(Field::Inventory))
        );
        assert_eq!(ratios.liquidity.current_ratio, Metric::Available(2.0));
    }

    #[test]
    fn test_zero_revenue() {
        let mut snap = snapshot();
        snap.revenue = Some(0.0);
        let ratios = compute_financial_ratios(&snap).unwrap();
        assert_eq!(
            ratios.profitability.net_profit_margin,
            Metric::NotAvailable(Gap::DivisionByZero)
        );
    }
}
