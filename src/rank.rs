//! Bounded selections for tabular display.
//!
//! The two selectors follow different policies on purpose. Low-stock alerts
//! are taken in input order and truncated, so the list shows the first
//! matches rather than the worst shortfalls. The product-error ranking sorts
//! by mean error and keeps the top entries. Callers relying on either order
//! should not expect the other.

use serde::{Deserialize, Serialize};

use crate::{forecast::ForecastRecord, group, schema::InventoryRecord};

pub const ALERT_LIMIT: usize = 15;
pub const SAMPLE_LIMIT: usize = 100;
pub const RANKING_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorLimits {
    pub alerts: usize,
    pub sample: usize,
    pub ranking: usize,
}

impl Default for SelectorLimits {
    fn default() -> Self {
        Self {
            alerts: ALERT_LIMIT,
            sample: SAMPLE_LIMIT,
            ranking: RANKING_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    #[serde(flatten)]
    pub record: InventoryRecord,
    /// `ReorderLevel - ClosingStock`, always positive.
    pub deficit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyPoint {
    pub forecast: f64,
    pub actual: f64,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductError {
    pub product_id: String,
    pub mean_error: f64,
}

/// First `limit` records below their reorder level, in input order.
pub fn low_stock_alerts(records: &[InventoryRecord], limit: usize) -> Vec<AlertRecord> {
    records
        .iter()
        .filter(|record| record.is_low_stock())
        .take(limit)
        .map(|record| AlertRecord {
            record: record.clone(),
            deficit: record.reorder_level - record.closing_stock,
        })
        .collect()
}

/// Forecast/actual pairs from the first `limit` records, keeping only pairs
/// where both values are positive.
pub fn accuracy_sample(records: &[InventoryRecord], limit: usize) -> Vec<AccuracyPoint> {
    records
        .iter()
        .take(limit)
        .map(|record| AccuracyPoint {
            forecast: record.forecast_sales,
            actual: record.actual_sales,
            product: record.product_name.clone(),
        })
        .filter(|point| point.forecast > 0.0 && point.actual > 0.0)
        .collect()
}

/// Products ordered by descending mean signed error, truncated to `limit`.
/// Equal means keep the order in which products first appear.
pub fn product_error_ranking(records: &[ForecastRecord], limit: usize) -> Vec<ProductError> {
    let mut ranked = group::group_and_accumulate(
        records,
        |record| record.product_id.clone(),
        |product| (product.to_string(), 0.0_f64, 0usize),
        |bucket, record| {
            bucket.1 += record.error;
            bucket.2 += 1;
        },
        group::BucketOrder::FirstSeen,
    )
    .into_iter()
    .map(|(product_id, total, count)| ProductError {
        product_id,
        mean_error: total / count as f64,
    })
    .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.mean_error.total_cmp(&a.mean_error));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(product: &str, closing: f64, reorder: f64) -> InventoryRecord {
        InventoryRecord {
            product_name: product.to_string(),
            closing_stock: closing,
            reorder_level: reorder,
            forecast_sales: closing,
            actual_sales: reorder,
            ..InventoryRecord::default()
        }
    }

    fn forecast(product: &str, error: f64) -> ForecastRecord {
        ForecastRecord {
            product_id: product.to_string(),
            error,
            ..ForecastRecord::default()
        }
    }

    #[test]
    fn alerts_keep_input_order_and_truncate() {
        let records = (0..40)
            .map(|idx| stock(&format!("P{idx}"), idx as f64, 30.0))
            .collect::<Vec<_>>();
        let alerts = low_stock_alerts(&records, ALERT_LIMIT);
        assert_eq!(alerts.len(), ALERT_LIMIT);
        assert_eq!(alerts[0].record.product_name, "P0");
        assert_eq!(alerts[0].deficit, 30.0);
        assert_eq!(alerts[14].record.product_name, "P14");
        assert!(alerts.iter().all(|a| a.record.closing_stock < a.record.reorder_level));
    }

    #[test]
    fn alerts_skip_records_at_or_above_reorder_level() {
        let records = vec![stock("A", 5.0, 5.0), stock("B", 6.0, 5.0), stock("C", 1.0, 5.0)];
        let alerts = low_stock_alerts(&records, ALERT_LIMIT);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].record.product_name, "C");
        assert_eq!(alerts[0].deficit, 4.0);
    }

    #[test]
    fn accuracy_sample_filters_within_leading_window() {
        let mut records = vec![stock("zero", 0.0, 5.0), stock("kept", 3.0, 4.0)];
        records.extend((0..200).map(|idx| stock(&format!("late{idx}"), 1.0, 1.0)));
        let sample = accuracy_sample(&records, SAMPLE_LIMIT);
        assert_eq!(sample.len(), SAMPLE_LIMIT - 1);
        assert_eq!(sample[0].product, "kept");
        assert_eq!(sample[0].forecast, 3.0);
        assert_eq!(sample[0].actual, 4.0);
    }

    #[test]
    fn product_ranking_sorts_by_mean_error_descending() {
        let records = vec![
            forecast("A", 10.0),
            forecast("B", 30.0),
            forecast("A", 20.0),
            forecast("C", -5.0),
            forecast("D", 15.0),
        ];
        let ranked = product_error_ranking(&records, RANKING_LIMIT);
        let order = ranked.iter().map(|p| p.product_id.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["B", "A", "D", "C"]);
        assert_eq!(ranked[1].mean_error, 15.0);
    }

    #[test]
    fn product_ranking_truncates_and_keeps_ties_stable() {
        let records = (0..30)
            .map(|idx| forecast(&format!("P{idx:02}"), 1.0))
            .collect::<Vec<_>>();
        let ranked = product_error_ranking(&records, RANKING_LIMIT);
        assert_eq!(ranked.len(), RANKING_LIMIT);
        assert_eq!(ranked[0].product_id, "P00");
        assert_eq!(ranked[19].product_id, "P19");
    }

    #[test]
    fn default_limits_match_dashboard_panels() {
        let limits = SelectorLimits::default();
        assert_eq!((limits.alerts, limits.sample, limits.ranking), (15, 100, 20));
    }
}
