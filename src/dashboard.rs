//! One-batch assembly of every dashboard panel.
//!
//! An upload is parsed and bound once; each filter change re-derives the whole
//! report from that immutable batch. Nothing is cached between calls, so the
//! same inputs always produce the same report.

use log::debug;
use serde::Serialize;

use crate::{
    config::PulseConfig,
    error::PulseResult,
    filter::{self, FilterCondition},
    forecast::{self, ForecastRecord, ForecastSummary},
    group::{self, CategoryPerformance, DailyTrend, MonthlyTrend, StockMovement, StoreComparison},
    kpi::{self, KpiSummary},
    rank::{self, AccuracyPoint, AlertRecord, ProductError, SelectorLimits},
    rows,
    schema::{self, CATEGORY, InventoryRecord, STORE_NAME},
};

/// Parses CSV text and binds it to the inventory schema.
pub fn load_inventory(text: &str, config: &PulseConfig) -> PulseResult<Vec<InventoryRecord>> {
    let batch = rows::parse_batch(text)?;
    schema::bind_inventory(&batch, &config.aliases)
}

/// Store and category filter conditions, `all` meaning unrestricted.
pub fn selection(store: &str, category: &str) -> Vec<FilterCondition> {
    vec![
        FilterCondition::new(STORE_NAME, store),
        FilterCondition::new(CATEGORY, category),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterChoices {
    pub stores: Vec<String>,
    pub categories: Vec<String>,
}

/// Filter options, always drawn from the unfiltered batch.
pub fn filter_choices(records: &[InventoryRecord]) -> FilterChoices {
    FilterChoices {
        stores: filter::distinct_values(records, STORE_NAME),
        categories: filter::distinct_values(records, CATEGORY),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub total_records: usize,
    pub filtered_records: usize,
    pub choices: FilterChoices,
    pub summary: Option<KpiSummary>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub category_performance: Vec<CategoryPerformance>,
    pub store_comparison: Vec<StoreComparison>,
    pub accuracy_sample: Vec<AccuracyPoint>,
    pub stock_movement: Vec<StockMovement>,
    pub low_stock_alerts: Vec<AlertRecord>,
}

pub fn build_report(
    records: &[InventoryRecord],
    conditions: &[FilterCondition],
    limits: &SelectorLimits,
) -> DashboardReport {
    let filtered = filter::apply_filters(records, conditions);
    debug!(
        "Building dashboard report over {} of {} record(s)",
        filtered.len(),
        records.len()
    );
    DashboardReport {
        total_records: records.len(),
        filtered_records: filtered.len(),
        choices: filter_choices(records),
        summary: kpi::summarize(&filtered),
        monthly_trends: group::monthly_trends(&filtered),
        category_performance: group::category_performance(&filtered),
        store_comparison: group::store_comparison(&filtered),
        accuracy_sample: rank::accuracy_sample(&filtered, limits.sample),
        stock_movement: group::stock_movement(&filtered),
        low_stock_alerts: rank::low_stock_alerts(&filtered, limits.alerts),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub metrics: ForecastSummary,
    pub daily_trend: Vec<DailyTrend>,
    pub product_errors: Vec<ProductError>,
}

pub fn build_forecast_report(records: &[ForecastRecord], limits: &SelectorLimits) -> ForecastReport {
    ForecastReport {
        metrics: forecast::summarize_forecast(records),
        daily_trend: group::daily_forecast_trend(records),
        product_errors: rank::product_error_ranking(records, limits.ranking),
    }
}
