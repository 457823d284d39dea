pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod group;
pub mod io_utils;
pub mod kpi;
pub mod rank;
pub mod rows;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, ExportArgs, ForecastArgs, InventoryArgs, OutputFormat},
    config::PulseConfig,
    dashboard::DashboardReport,
    filter::FilterCondition,
    schema::InventoryRecord,
    table::{TableView, render_view},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("stock_pulse", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Summary(args) => handle_summary(&args),
        Commands::Trends(args) => handle_panel(&args, |records, _| {
            group::monthly_trends(records)
        }),
        Commands::Stock(args) => handle_panel(&args, |records, _| {
            group::stock_movement(records)
        }),
        Commands::Categories(args) => handle_panel(&args, |records, _| {
            group::category_performance(records)
        }),
        Commands::Stores(args) => handle_panel(&args, |records, _| {
            group::store_comparison(records)
        }),
        Commands::Alerts(args) => handle_panel(&args, |records, config| {
            rank::low_stock_alerts(records, config.limits.alerts)
        }),
        Commands::Accuracy(args) => handle_panel(&args, |records, config| {
            rank::accuracy_sample(records, config.limits.sample)
        }),
        Commands::Choices(args) => handle_choices(&args),
        Commands::Report(args) => handle_report(&args),
        Commands::Forecast(args) => handle_forecast(&args),
        Commands::Export(args) => handle_export(&args),
    }
}

/// Reads, binds and returns the full (unfiltered) inventory batch.
fn load_inventory(args: &InventoryArgs) -> Result<(Vec<InventoryRecord>, PulseConfig)> {
    let config = PulseConfig::load_optional(args.config.as_deref())?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Reading inventory from '{}' ({})",
        args.input.display(),
        encoding.name()
    );
    let text = io_utils::read_input(&args.input, encoding)?;
    let records = dashboard::load_inventory(&text, &config)
        .with_context(|| format!("Loading inventory from {:?}", args.input))?;
    Ok((records, config))
}

fn conditions(args: &InventoryArgs) -> Result<Vec<FilterCondition>> {
    let mut conditions = dashboard::selection(&args.store, &args.category);
    conditions.extend(filter::parse_filters(&args.filters)?);
    debug!("Filter conditions: {:?}", conditions);
    Ok(conditions)
}

fn filtered_inventory(args: &InventoryArgs) -> Result<(Vec<InventoryRecord>, PulseConfig)> {
    let (records, config) = load_inventory(args)?;
    let filtered = filter::apply_filters(&records, &conditions(args)?);
    info!(
        "{} of {} record(s) match the selection",
        filtered.len(),
        records.len()
    );
    Ok((filtered, config))
}

fn emit<T: TableView + Serialize>(items: &[T], format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Table => render_view(items),
        OutputFormat::Json => to_json(items)?,
    };
    io_utils::write_output(None, &rendered)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Serializing output as JSON")
}

fn handle_panel<T, F>(args: &InventoryArgs, build: F) -> Result<()>
where
    T: TableView + Serialize,
    F: FnOnce(&[InventoryRecord], &PulseConfig) -> Vec<T>,
{
    let (records, config) = filtered_inventory(args)?;
    let rows = build(&records, &config);
    info!("Produced {} row(s)", rows.len());
    emit(&rows, args.format)
}

fn handle_summary(args: &InventoryArgs) -> Result<()> {
    let (records, _) = filtered_inventory(args)?;
    match kpi::summarize(&records) {
        Some(summary) => emit(&[summary], args.format),
        None => {
            info!("No records match the selection; nothing to summarise");
            match args.format {
                OutputFormat::Table => io_utils::write_output(None, "no records"),
                OutputFormat::Json => io_utils::write_output(None, "null"),
            }
        }
    }
}

fn handle_choices(args: &InventoryArgs) -> Result<()> {
    let (records, _) = load_inventory(args)?;
    let choices = dashboard::filter_choices(&records);
    let rendered = match args.format {
        OutputFormat::Table => table::render_choices(&choices),
        OutputFormat::Json => to_json(&choices)?,
    };
    io_utils::write_output(None, &rendered)
}

fn handle_report(args: &InventoryArgs) -> Result<()> {
    let (records, config) = load_inventory(args)?;
    let report = dashboard::build_report(&records, &conditions(args)?, &config.limits);
    info!(
        "Built report over {} of {} record(s)",
        report.filtered_records, report.total_records
    );
    let rendered = match args.format {
        OutputFormat::Table => render_report(&report),
        OutputFormat::Json => to_json(&report)?,
    };
    io_utils::write_output(None, &rendered)
}

fn render_report(report: &DashboardReport) -> String {
    let mut sections = vec![format!(
        "Records: {} of {}",
        report.filtered_records, report.total_records
    )];
    let summary = report
        .summary
        .as_ref()
        .map(|summary| render_view(std::slice::from_ref(summary)))
        .unwrap_or_else(|| "no records".to_string());
    sections.push(format!("KPIs\n{summary}"));
    sections.push(format!("Monthly trends\n{}", render_view(&report.monthly_trends)));
    sections.push(format!(
        "Category performance\n{}",
        render_view(&report.category_performance)
    ));
    sections.push(format!(
        "Store comparison\n{}",
        render_view(&report.store_comparison)
    ));
    sections.push(format!(
        "Forecast accuracy\n{}",
        render_view(&report.accuracy_sample)
    ));
    sections.push(format!("Stock movement\n{}", render_view(&report.stock_movement)));
    sections.push(format!(
        "Low stock alerts\n{}",
        render_view(&report.low_stock_alerts)
    ));
    sections.join("\n")
}

fn handle_forecast(args: &ForecastArgs) -> Result<()> {
    let config = PulseConfig::load_optional(args.config.as_deref())?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let text = io_utils::read_input(&args.input, encoding)?;
    let records = forecast::load_forecast(&text)
        .with_context(|| format!("Loading forecast records from {:?}", args.input))?;
    let report = dashboard::build_forecast_report(&records, &config.limits);
    info!(
        "Ranked {} product(s) across {} forecast record(s)",
        report.product_errors.len(),
        records.len()
    );
    let rendered = match args.format {
        OutputFormat::Table => [
            format!("Metrics\n{}", render_view(std::slice::from_ref(&report.metrics))),
            format!("Daily trend\n{}", render_view(&report.daily_trend)),
            format!("Product errors\n{}", render_view(&report.product_errors)),
        ]
        .join("\n"),
        OutputFormat::Json => to_json(&report)?,
    };
    io_utils::write_output(None, &rendered)
}

fn handle_export(args: &ExportArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let text = io_utils::read_input(&args.input, encoding)?;
    let records = forecast::load_forecast(&text)
        .with_context(|| format!("Loading forecast records from {:?}", args.input))?;
    let csv = forecast::export_csv(&records)?;
    io_utils::write_output(args.output.as_deref(), &csv)?;
    info!(
        "Exported {} forecast record(s) to {}",
        records.len(),
        args.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}
