//! Group-and-accumulate over record sequences.
//!
//! Every chart rollup is an instance of [`group_and_accumulate()`]: one pass
//! over the records, a bucket created (zeroed) the first time its key is seen,
//! a merge applied per record, then the buckets materialised in the requested
//! [`BucketOrder`]. Time buckets sort by key as plain strings, which is only
//! chronological for fixed-width keys such as `YYYY-MM` or `Month 03`.
//! Categorical buckets keep first-seen order.

use std::collections::HashMap;

use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{data::round_finite, forecast::ForecastRecord, schema::InventoryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOrder {
    KeyAscending,
    FirstSeen,
}

pub fn group_and_accumulate<R, B, K, I, M>(
    records: &[R],
    key: K,
    init: I,
    mut merge: M,
    order: BucketOrder,
) -> Vec<B>
where
    K: Fn(&R) -> String,
    I: Fn(&str) -> B,
    M: FnMut(&mut B, &R),
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, B)> = Vec::new();

    for record in records {
        let bucket_key = key(record);
        let slot = match positions.get(&bucket_key) {
            Some(&slot) => slot,
            None => {
                let slot = buckets.len();
                buckets.push((bucket_key.clone(), init(&bucket_key)));
                positions.insert(bucket_key, slot);
                slot
            }
        };
        merge(&mut buckets[slot].1, record);
    }

    if order == BucketOrder::KeyAscending {
        buckets.sort_by(|a, b| a.0.cmp(&b.0));
    }
    debug!(
        "Grouped {} record(s) into {} bucket(s)",
        records.len(),
        buckets.len()
    );
    buckets.into_iter().map(|(_, bucket)| bucket).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub forecast: f64,
    pub actual: f64,
    pub sold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMovement {
    pub month: String,
    pub opening: f64,
    pub closing: f64,
    pub received: f64,
    pub sold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub name: String,
    /// Actual sales.
    pub value: f64,
    pub forecast: f64,
    /// Sum of absolute forecast errors.
    pub error: f64,
    pub count: usize,
    pub avg_error: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreComparison {
    pub store: String,
    pub sales: f64,
    pub forecast: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: String,
    #[serde(rename = "Actual")]
    pub actual: f64,
    #[serde(rename = "Predicted")]
    pub predicted: f64,
}

pub fn monthly_trends(records: &[InventoryRecord]) -> Vec<MonthlyTrend> {
    group_and_accumulate(
        records,
        InventoryRecord::period_key,
        |month| MonthlyTrend {
            month: month.to_string(),
            forecast: 0.0,
            actual: 0.0,
            sold: 0.0,
        },
        |bucket, record| {
            bucket.forecast += record.forecast_sales;
            bucket.actual += record.actual_sales;
            bucket.sold += record.sold_qty;
        },
        BucketOrder::KeyAscending,
    )
}

pub fn stock_movement(records: &[InventoryRecord]) -> Vec<StockMovement> {
    group_and_accumulate(
        records,
        InventoryRecord::period_key,
        |month| StockMovement {
            month: month.to_string(),
            opening: 0.0,
            closing: 0.0,
            received: 0.0,
            sold: 0.0,
        },
        |bucket, record| {
            bucket.opening += record.opening_stock;
            bucket.closing += record.closing_stock;
            bucket.received += record.received_qty;
            bucket.sold += record.sold_qty;
        },
        BucketOrder::KeyAscending,
    )
}

pub fn category_performance(records: &[InventoryRecord]) -> Vec<CategoryPerformance> {
    let mut buckets = group_and_accumulate(
        records,
        |record| record.category.clone(),
        |name| CategoryPerformance {
            name: name.to_string(),
            value: 0.0,
            forecast: 0.0,
            error: 0.0,
            count: 0,
            avg_error: Decimal::ZERO,
        },
        |bucket, record| {
            bucket.value += record.actual_sales;
            bucket.forecast += record.forecast_sales;
            bucket.error += record.forecast_error.abs();
            bucket.count += 1;
        },
        BucketOrder::FirstSeen,
    );
    for bucket in &mut buckets {
        bucket.avg_error = if bucket.count > 0 {
            round_finite(bucket.error / bucket.count as f64, 1)
        } else {
            Decimal::ZERO
        };
    }
    buckets
}

pub fn store_comparison(records: &[InventoryRecord]) -> Vec<StoreComparison> {
    group_and_accumulate(
        records,
        |record| record.store_name.clone(),
        |store| StoreComparison {
            store: store.to_string(),
            sales: 0.0,
            forecast: 0.0,
        },
        |bucket, record| {
            bucket.sales += record.actual_sales;
            bucket.forecast += record.forecast_sales;
        },
        BucketOrder::FirstSeen,
    )
}

/// Per-date forecast totals, in the order dates first appear.
pub fn daily_forecast_trend(records: &[ForecastRecord]) -> Vec<DailyTrend> {
    group_and_accumulate(
        records,
        |record| record.date.clone(),
        |date| DailyTrend {
            date: date.to_string(),
            actual: 0.0,
            predicted: 0.0,
        },
        |bucket, record| {
            bucket.actual += record.actual;
            bucket.predicted += record.predicted;
        },
        BucketOrder::FirstSeen,
    )
}
