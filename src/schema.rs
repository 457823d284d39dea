//! Typed inventory records bound from parsed rows.
//!
//! The header of an upload is checked against the inventory column set before
//! any record is built. Every required column must be present (after applying
//! configured header aliases); otherwise binding fails with
//! [`PulseError::SchemaMismatch`] naming each missing column. Numeric columns
//! are coerced once at bind time, so downstream aggregation works on plain
//! `f64` values that already follow the parse-or-zero rule.
//!
//! The period column is `Date`. Uploads that carry `month_number` instead are
//! accepted, and their records bucket under zero-padded `Month NN` keys.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::{
    data::coerce,
    error::{PulseError, PulseResult},
    rows::{RawRecord, RowBatch},
};

pub const DATE: &str = "Date";
pub const MONTH_NUMBER: &str = "month_number";
pub const STORE_NAME: &str = "StoreName";
pub const PRODUCT_NAME: &str = "ProductName";
pub const CATEGORY: &str = "Category";
pub const OPENING_STOCK: &str = "OpeningStock";
pub const RECEIVED_QTY: &str = "ReceivedQty";
pub const SOLD_QTY: &str = "SoldQty";
pub const CLOSING_STOCK: &str = "ClosingStock";
pub const FORECAST_SALES: &str = "ForecastSales";
pub const ACTUAL_SALES: &str = "ActualSales";
pub const FORECAST_ERROR: &str = "ForecastError";
pub const REORDER_LEVEL: &str = "ReorderLevel";

/// Columns that must appear in every inventory upload, besides the period.
pub const REQUIRED_COLUMNS: &[&str] = &[
    STORE_NAME,
    PRODUCT_NAME,
    CATEGORY,
    OPENING_STOCK,
    RECEIVED_QTY,
    SOLD_QTY,
    CLOSING_STOCK,
    FORECAST_SALES,
    ACTUAL_SALES,
    FORECAST_ERROR,
    REORDER_LEVEL,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryRecord {
    pub date: String,
    #[serde(rename = "month_number", skip_serializing_if = "String::is_empty")]
    pub month_number: String,
    pub store_name: String,
    pub product_name: String,
    pub category: String,
    pub opening_stock: f64,
    pub received_qty: f64,
    pub sold_qty: f64,
    pub closing_stock: f64,
    pub forecast_sales: f64,
    pub actual_sales: f64,
    pub forecast_error: f64,
    pub reorder_level: f64,
}

impl InventoryRecord {
    /// Month bucket for time-series groupings: the first seven characters of
    /// `Date` (`YYYY-MM` for ISO dates), falling back to `Month NN`.
    pub fn period_key(&self) -> String {
        if !self.date.is_empty() {
            return self.date.chars().take(7).collect();
        }
        if self.month_number.is_empty() {
            return String::new();
        }
        match self.month_number.parse::<u32>() {
            Ok(month) => format!("Month {month:02}"),
            Err(_) => format!("Month {}", self.month_number),
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.closing_stock < self.reorder_level
    }

    pub fn text_field(&self, name: &str) -> Option<&str> {
        let value = match name {
            DATE => &self.date,
            MONTH_NUMBER => &self.month_number,
            STORE_NAME => &self.store_name,
            PRODUCT_NAME => &self.product_name,
            CATEGORY => &self.category,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        let value = match name {
            OPENING_STOCK => self.opening_stock,
            RECEIVED_QTY => self.received_qty,
            SOLD_QTY => self.sold_qty,
            CLOSING_STOCK => self.closing_stock,
            FORECAST_SALES => self.forecast_sales,
            ACTUAL_SALES => self.actual_sales,
            FORECAST_ERROR => self.forecast_error,
            REORDER_LEVEL => self.reorder_level,
            _ => return None,
        };
        Some(value)
    }
}

/// Column positions resolved once per batch.
#[derive(Debug, Clone)]
pub struct InventoryBinding {
    date: Option<usize>,
    month_number: Option<usize>,
    store_name: usize,
    product_name: usize,
    category: usize,
    opening_stock: usize,
    received_qty: usize,
    sold_qty: usize,
    closing_stock: usize,
    forecast_sales: usize,
    actual_sales: usize,
    forecast_error: usize,
    reorder_level: usize,
}

impl InventoryBinding {
    pub fn from_headers(
        headers: &[String],
        aliases: &BTreeMap<String, String>,
    ) -> PulseResult<Self> {
        let canonical = headers
            .iter()
            .map(|header| aliases.get(header).unwrap_or(header).as_str())
            .collect::<Vec<_>>();
        let position = |name: &str| canonical.iter().rposition(|header| *header == name);

        let date = position(DATE);
        let month_number = position(MONTH_NUMBER);
        let mut missing = Vec::new();
        if date.is_none() && month_number.is_none() {
            missing.push(DATE.to_string());
        }
        let mut resolved = BTreeMap::new();
        for name in REQUIRED_COLUMNS {
            match position(*name) {
                Some(idx) => {
                    resolved.insert(*name, idx);
                }
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(PulseError::SchemaMismatch { missing });
        }

        let column = |name: &str| resolved.get(name).copied().unwrap_or_default();
        Ok(Self {
            date,
            month_number,
            store_name: column(STORE_NAME),
            product_name: column(PRODUCT_NAME),
            category: column(CATEGORY),
            opening_stock: column(OPENING_STOCK),
            received_qty: column(RECEIVED_QTY),
            sold_qty: column(SOLD_QTY),
            closing_stock: column(CLOSING_STOCK),
            forecast_sales: column(FORECAST_SALES),
            actual_sales: column(ACTUAL_SALES),
            forecast_error: column(FORECAST_ERROR),
            reorder_level: column(REORDER_LEVEL),
        })
    }

    pub fn bind(&self, record: &RawRecord) -> InventoryRecord {
        let text = |idx: usize| record.value_at(idx).to_string();
        let number = |idx: usize| coerce(record.value_at(idx));
        InventoryRecord {
            date: self.date.map(text).unwrap_or_default(),
            month_number: self.month_number.map(text).unwrap_or_default(),
            store_name: text(self.store_name),
            product_name: text(self.product_name),
            category: text(self.category),
            opening_stock: number(self.opening_stock),
            received_qty: number(self.received_qty),
            sold_qty: number(self.sold_qty),
            closing_stock: number(self.closing_stock),
            forecast_sales: number(self.forecast_sales),
            actual_sales: number(self.actual_sales),
            forecast_error: number(self.forecast_error),
            reorder_level: number(self.reorder_level),
        }
    }
}

/// Validates the batch header and binds every record.
pub fn bind_inventory(
    batch: &RowBatch,
    aliases: &BTreeMap<String, String>,
) -> PulseResult<Vec<InventoryRecord>> {
    let binding = InventoryBinding::from_headers(&batch.headers, aliases)?;
    let records = batch
        .records
        .iter()
        .map(|record| binding.bind(record))
        .collect::<Vec<_>>();
    debug!("Bound {} inventory record(s)", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::parse_batch;

    const HEADER: &str = "Date,StoreName,ProductName,Category,OpeningStock,ReceivedQty,SoldQty,ClosingStock,ForecastSales,ActualSales,ForecastError,ReorderLevel";

    #[test]
    fn bind_inventory_coerces_numeric_columns() {
        let text = format!("{HEADER}\n2024-03-05,North,Soap,Home,10,5,abc,,100,90.5,-4,8");
        let batch = parse_batch(&text).expect("parse");
        let records = bind_inventory(&batch, &BTreeMap::new()).expect("bind");
        let record = &records[0];
        assert_eq!(record.store_name, "North");
        assert_eq!(record.sold_qty, 0.0);
        assert_eq!(record.closing_stock, 0.0);
        assert_eq!(record.actual_sales, 90.5);
        assert_eq!(record.forecast_error, -4.0);
        assert_eq!(record.period_key(), "2024-03");
        assert!(record.is_low_stock());
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let batch = parse_batch("StoreName,Category\nNorth,Home").expect("parse");
        let err = bind_inventory(&batch, &BTreeMap::new()).unwrap_err();
        match err {
            PulseError::SchemaMismatch { missing } => {
                assert!(missing.contains(&DATE.to_string()));
                assert!(missing.contains(&REORDER_LEVEL.to_string()));
                assert!(!missing.contains(&STORE_NAME.to_string()));
                assert_eq!(missing.len(), 10);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn aliases_rename_headers_before_validation() {
        let text = HEADER.replace("StoreName", "Store");
        let batch = parse_batch(&format!("{text}\n2024-01-01,East,Tea,Food,1,1,1,1,1,1,1,1"))
            .expect("parse");
        let aliases = BTreeMap::from([("Store".to_string(), STORE_NAME.to_string())]);
        let records = bind_inventory(&batch, &aliases).expect("bind");
        assert_eq!(records[0].store_name, "East");
    }

    #[test]
    fn month_number_period_is_zero_padded() {
        let text = HEADER.replace("Date", "month_number");
        let batch = parse_batch(&format!("{text}\n3,East,Tea,Food,1,1,1,1,1,1,1,1"))
            .expect("parse");
        let records = bind_inventory(&batch, &BTreeMap::new()).expect("bind");
        assert_eq!(records[0].period_key(), "Month 03");
        assert_eq!(records[0].text_field(MONTH_NUMBER), Some("3"));
    }
}
