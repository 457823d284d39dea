//! Row parsing for uploaded delimited text.
//!
//! [`parse_rows()`] splits text on newlines and commas, takes line 0 as the
//! header, and produces one [`RawRecord`] per remaining line. Values are
//! matched to header tokens by position: short lines are padded with empty
//! strings and surplus fields are dropped.
//!
//! Quoting is not supported. A quoted field containing a comma or a newline is
//! split like any other text, so inputs that need quoting must be normalised
//! before they reach this parser.

use std::sync::Arc;

use log::debug;

use crate::error::{PulseError, PulseResult};

pub const FIELD_DELIMITER: char = ',';

/// One data line keyed by the batch header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl RawRecord {
    pub fn new(headers: Arc<[String]>, values: Vec<String>) -> Self {
        let mut values = values;
        values.resize(headers.len(), String::new());
        Self { headers, values }
    }

    /// Repeated header names resolve to the right-most column.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rposition(|header| header == key)
            .map(|idx| self.values[idx].as_str())
    }

    /// Positional access; out-of-range positions read as empty.
    pub fn value_at(&self, idx: usize) -> &str {
        self.values.get(idx).map(String::as_str).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys().zip(self.values.iter().map(String::as_str))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Header tokens plus the records parsed under them. The header survives
/// even when the input holds no data lines.
#[derive(Debug, Clone)]
pub struct RowBatch {
    pub headers: Arc<[String]>,
    pub records: Vec<RawRecord>,
}

/// Splits `text` into records using its first line as the header.
pub fn parse_rows(text: &str) -> PulseResult<Vec<RawRecord>> {
    parse_batch(text).map(|batch| batch.records)
}

pub fn parse_batch(text: &str) -> PulseResult<RowBatch> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PulseError::Parse {
            reason: "input contains no header line".to_string(),
        });
    }
    let mut lines = trimmed.split('\n');
    let header_line = lines.next().unwrap_or_default();
    let headers: Arc<[String]> = header_line
        .split(FIELD_DELIMITER)
        .map(|token| token.trim().to_string())
        .collect();

    let records = lines
        .map(|line| {
            let values = line
                .split(FIELD_DELIMITER)
                .take(headers.len())
                .map(|value| value.trim().to_string())
                .collect::<Vec<_>>();
            RawRecord::new(Arc::clone(&headers), values)
        })
        .collect::<Vec<_>>();

    debug!(
        "Parsed {} record(s) across {} header column(s)",
        records.len(),
        headers.len()
    );
    Ok(RowBatch { headers, records })
}
