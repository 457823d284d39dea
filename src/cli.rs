use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::filter::ALL;

#[derive(Debug, Parser)]
#[command(author, version, about = "Inventory and demand-forecast analytics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Headline KPIs: forecast and actual totals, accuracy, low stock, variance
    Summary(InventoryArgs),
    /// Monthly forecast, actual, and sold totals
    Trends(InventoryArgs),
    /// Monthly opening, closing, received, and sold stock
    Stock(InventoryArgs),
    /// Sales and forecast error per category
    Categories(InventoryArgs),
    /// Sales against forecast per store
    Stores(InventoryArgs),
    /// Records whose closing stock is below the reorder level
    Alerts(InventoryArgs),
    /// Forecast/actual pairs from the leading records
    Accuracy(InventoryArgs),
    /// Distinct store and category values available for filtering
    Choices(InventoryArgs),
    /// Every inventory panel in a single report
    Report(InventoryArgs),
    /// Metrics, daily trend, and worst products for a forecast JSON batch
    Forecast(ForecastArgs),
    /// Convert a forecast JSON batch to CSV
    Export(ExportArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Inventory CSV file to analyze (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Restrict to one store (`all` for every store)
    #[arg(long, default_value = ALL)]
    pub store: String,
    /// Restrict to one category (`all` for every category)
    #[arg(long, default_value = ALL)]
    pub category: String,
    /// Additional equality filters such as `ProductName=Soap`
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// YAML file with header aliases and selector limits
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Output rendering
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Forecast JSON file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML file with selector limits
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Output rendering
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Forecast JSON file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
