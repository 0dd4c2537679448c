//! Command-line access to the investment research tools

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use invest_agent::live_registry;
use invest_data::InvestConfig;
use invest_utils::LogFormat;
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "invest-cli")]
#[command(about = "Call the investment research tools from the command line", long_about = None)]
struct Cli {
    /// Log output format (pretty or json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available tools
    List,
    /// Print a tool's input schema
    Schema {
        /// Tool name
        tool: String,
    },
    /// Call a tool and print its JSON reply
    Call {
        /// Tool name
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    invest_utils::init_tracing_with(LogFormat::from_name(&cli.log_format), "warn");

    let config = InvestConfig::from_env().context("Failed to load configuration")?;
    let registry = live_registry(&config).context("Failed to set up data providers")?;

    match cli.command {
        Commands::List => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Tool", "Description"]);
            for definition in registry.definitions() {
                table.add_row(vec![definition.name, definition.description]);
            }
            println!("{table}");
        }
        Commands::Schema { tool } => {
            let Some(tool) = registry.get(&tool) else {
                bail!("Unknown tool: {tool}");
            };
            println!("{}", serde_json::to_string_pretty(&tool.input_schema())?);
        }
        Commands::Call { tool, args } => {
            let params: Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            info!(tool = %tool, "Calling tool");
            let reply = registry.call(&tool, params).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}
