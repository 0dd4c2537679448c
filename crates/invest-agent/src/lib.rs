//! Investment research tools
//!
//! Thirteen tools an agent runtime can call to research a stock: prices,
//! fundamentals, financial statements, valuation and ratio analysis, growth
//! trends, a comprehensive report, a checklist screen and a search over a
//! curated research library. Every tool takes JSON arguments and answers
//! with a JSON object carrying a `status` of `success`, `error` or `info`.
//!
//! ```no_run
//! use invest_agent::live_registry;
//! use invest_data::InvestConfig;
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = live_registry(&InvestConfig::from_env()?)?;
//! let reply = registry
//!     .call("calculate_valuation_metrics", json!({"ticker": "AAPL"}))
//!     .await?;
//! println!("{}", reply["metrics"]["pe_ratio"]);
//! # Ok(())
//! # }
//! ```

pub mod registry;
pub mod reply;
pub mod request;
pub mod tools;

pub use registry::{TOOL_NAMES, build_registry, live_registry};
pub use reply::{Reply, Status};
pub use tools::Market;
