use anyhow::{Result, anyhow};
use itertools::Itertools;
use log::debug;

use crate::{rows::RawRecord, schema::InventoryRecord};

/// Expected value meaning "do not filter on this field".
pub const ALL: &str = "all";

/// Named field access shared by raw and typed records.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;

    /// Numeric columns that no longer carry their source text.
    fn number(&self, _name: &str) -> Option<f64> {
        None
    }
}

impl FieldSource for RawRecord {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl FieldSource for InventoryRecord {
    fn field(&self, name: &str) -> Option<&str> {
        self.text_field(name)
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.numeric_field(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: String,
    pub expected: String,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.expected == ALL
    }

    /// Case-sensitive text equality; absent fields compare as empty text.
    /// Numeric columns of typed records match when `expected` parses to the
    /// same coerced value, so `OpeningStock=20` also matches `20.0`.
    pub fn matches<R: FieldSource>(&self, record: &R) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        if let Some(text) = record.field(&self.field) {
            return text == self.expected;
        }
        match record.number(&self.field) {
            Some(value) => self.expected.trim().parse::<f64>().is_ok_and(|e| e == value),
            None => self.expected.is_empty(),
        }
    }
}

pub fn parse_filters(filters: &[String]) -> Result<Vec<FilterCondition>> {
    filters.iter().map(|f| parse_filter(f)).collect()
}

fn parse_filter(filter: &str) -> Result<FilterCondition> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty filter expression"));
    }
    let (field, expected) = trimmed
        .split_once('=')
        .ok_or_else(|| anyhow!("Filter '{trimmed}' must use the form field=value"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(anyhow!("Filter '{trimmed}' is missing a field name"));
    }
    Ok(FilterCondition::new(field, unquote(expected.trim())))
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Keeps records satisfying every condition, in input order.
pub fn apply_filters<R: FieldSource + Clone>(
    records: &[R],
    conditions: &[FilterCondition],
) -> Vec<R> {
    let active = conditions
        .iter()
        .filter(|condition| !condition.is_unrestricted())
        .collect::<Vec<_>>();
    let kept = records
        .iter()
        .filter(|record| active.iter().all(|condition| condition.matches(*record)))
        .cloned()
        .collect::<Vec<_>>();
    debug!(
        "Filters kept {} of {} record(s) ({} active condition(s))",
        kept.len(),
        records.len(),
        active.len()
    );
    kept
}

/// Distinct non-empty values of `field` in first-seen order.
pub fn distinct_values<R: FieldSource>(records: &[R], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.field(field))
        .filter(|value| !value.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}
