//! Scalar summary metrics for a filtered inventory batch.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    data::{round_finite, round_to},
    schema::InventoryRecord,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_forecast: i64,
    pub total_actual: i64,
    /// `100 - mean(|ForecastError|)`; not clamped to a percentage range.
    /// Errors too large for `Decimal` saturate at its bounds.
    pub accuracy: Decimal,
    pub low_stock_items: usize,
    /// Percent deviation of actual from forecast; `None` when the forecast
    /// total is zero.
    pub variance: Option<Decimal>,
}

/// Returns `None` for an empty batch: there is nothing to summarise.
pub fn summarize(records: &[InventoryRecord]) -> Option<KpiSummary> {
    if records.is_empty() {
        return None;
    }

    let forecast_sum: f64 = records.iter().map(|r| r.forecast_sales).sum();
    let actual_sum: f64 = records.iter().map(|r| r.actual_sales).sum();
    let total_forecast = forecast_sum.floor() as i64;
    let total_actual = actual_sum.floor() as i64;

    // Coercion already maps unparseable cells to zero, so every record counts.
    let errors = records
        .iter()
        .map(|r| r.forecast_error.abs())
        .filter(|e| !e.is_nan())
        .collect::<Vec<_>>();
    let avg_error = if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f64>() / errors.len() as f64
    };

    let low_stock_items = records.iter().filter(|r| r.is_low_stock()).count();

    let variance_ratio =
        (total_actual - total_forecast) as f64 / total_forecast as f64 * 100.0;

    Some(KpiSummary {
        total_forecast,
        total_actual,
        accuracy: round_finite(100.0 - avg_error, 1),
        low_stock_items,
        variance: round_to(variance_ratio, 1),
    })
}
