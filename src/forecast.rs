//! Demand-forecast records: JSON intake, summary metrics, and CSV export.
//!
//! Forecast batches arrive already typed, either as a bare JSON array of
//! records or wrapped in an upload response object under `predictions`.
//! Identifier fields accept strings or numbers; numeric fields accept numbers,
//! numeric strings, or null, and go through the same parse-or-zero coercion as
//! CSV cells.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use itertools::Itertools;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    data::{coerce, round_finite, to_fixed},
    error::{PulseError, PulseResult},
};

pub const EXPORT_HEADERS: [&str; 6] = [
    "Date",
    "Store ID",
    "Product ID",
    "Actual Demand",
    "Predicted Demand",
    "Error %",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub store_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub actual: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub predicted: f64,
    /// Signed percentage error.
    #[serde(default, deserialize_with = "lenient_number")]
    pub error: f64,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(|value| coerce(&value))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ForecastPayload {
    Records(Vec<ForecastRecord>),
    Envelope { predictions: Vec<ForecastRecord> },
}

pub fn load_forecast(json: &str) -> PulseResult<Vec<ForecastRecord>> {
    let records = match serde_json::from_str::<ForecastPayload>(json) {
        Ok(ForecastPayload::Records(records)) => records,
        Ok(ForecastPayload::Envelope { predictions }) => predictions,
        // Re-parse as a plain array so the error points at the offending record.
        Err(_) => serde_json::from_str::<Vec<ForecastRecord>>(json)?,
    };
    debug!("Loaded {} forecast record(s)", records.len());
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub total_rows: usize,
    pub total_predictions: usize,
    pub total_stores: usize,
    pub total_products: usize,
    /// Mean absolute percentage error.
    pub mape: Decimal,
    /// `100 - mape`, unclamped.
    pub accuracy: Decimal,
}

pub fn summarize_forecast(records: &[ForecastRecord]) -> ForecastSummary {
    let mape = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.error.abs()).sum::<f64>() / records.len() as f64
    };
    let distinct = |field: fn(&ForecastRecord) -> &str| {
        records
            .iter()
            .map(field)
            .filter(|value| !value.is_empty())
            .unique()
            .count()
    };
    ForecastSummary {
        total_rows: records.len(),
        total_predictions: records.len(),
        total_stores: distinct(|r| r.store_id.as_str()),
        total_products: distinct(|r| r.product_id.as_str()),
        mape: round_finite(mape, 2),
        accuracy: round_finite(100.0 - mape, 2),
    }
}

/// Renders records as comma-joined CSV under [`EXPORT_HEADERS`]. Values are
/// written unquoted; `error` carries two decimal places with ties rounded
/// away from zero. Every line, the last included, ends with `\n`.
pub fn export_csv(records: &[ForecastRecord]) -> PulseResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for record in records {
        writer.write_record([
            record.date.clone(),
            record.store_id.clone(),
            record.product_id.clone(),
            record.actual.to_string(),
            record.predicted.to_string(),
            to_fixed(record.error, 2),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| PulseError::Export(err.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_forecast_accepts_arrays_and_envelopes() {
        let array = r#"[{"date":"2024-01-01","storeId":1,"productId":"P-1","actual":"12","predicted":10.5,"error":null}]"#;
        let records = load_forecast(array).expect("array");
        assert_eq!(records[0].store_id, "1");
        assert_eq!(records[0].actual, 12.0);
        assert_eq!(records[0].predicted, 10.5);
        assert_eq!(records[0].error, 0.0);

        let envelope = r#"{"predictions":[{"date":"2024-01-02","productId":"P-2"}],"metrics":{}}"#;
        let records = load_forecast(envelope).expect("envelope");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store_id, "");
        assert_eq!(records[0].actual, 0.0);
    }

    #[test]
    fn load_forecast_rejects_malformed_json() {
        let err = load_forecast("{not json").unwrap_err();
        assert!(matches!(err, PulseError::Forecast(_)));
    }

    #[test]
    fn summarize_forecast_counts_distinct_ids() {
        let records = vec![
            ForecastRecord {
                store_id: "S1".into(),
                product_id: "P1".into(),
                error: -10.0,
                ..ForecastRecord::default()
            },
            ForecastRecord {
                store_id: "S1".into(),
                product_id: "P2".into(),
                error: 5.0,
                ..ForecastRecord::default()
            },
        ];
        let summary = summarize_forecast(&records);
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.total_stores, 1);
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.mape.to_string(), "7.50");
        assert_eq!(summary.accuracy.to_string(), "92.50");
    }

    #[test]
    fn export_csv_formats_error_with_two_decimals() {
        let records = vec![ForecastRecord {
            date: "2024-01-01".into(),
            store_id: "S1".into(),
            product_id: "P1".into(),
            actual: 12.0,
            predicted: 10.5,
            error: 12.5,
        }];
        let csv = export_csv(&records).expect("export");
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "Date,Store ID,Product ID,Actual Demand,Predicted Demand,Error %",
                "2024-01-01,S1,P1,12,10.5,12.50",
            ]
        );
    }

    #[test]
    fn export_csv_rounds_error_ties_away_from_zero() {
        let records = [0.125, 0.375, -0.125]
            .into_iter()
            .map(|error| ForecastRecord {
                error,
                ..ForecastRecord::default()
            })
            .collect::<Vec<_>>();
        let csv = export_csv(&records).expect("export");
        let errors = csv
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(errors, vec!["0.13", "0.38", "-0.13"]);
        assert!(csv.ends_with("-0.13\n"));
    }
}
