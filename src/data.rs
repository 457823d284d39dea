//! Numeric coercion and decimal rounding shared by every aggregation.
//!
//! Field values arrive as text (CSV cells), as JSON values, or are missing
//! altogether. [`coerce()`] turns any of them into a finite `f64`, resolving
//! anything unparseable to `0.0`. Aggregates depend on that rule: a malformed
//! cell contributes zero to a sum instead of being dropped from it, and it
//! never aborts the batch.

use rust_decimal::{Decimal, RoundingStrategy};

/// Parse-or-zero conversion to a finite number.
pub trait Coerce {
    fn coerce(&self) -> f64;
}

impl Coerce for str {
    fn coerce(&self) -> f64 {
        self.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }
}

impl Coerce for String {
    fn coerce(&self) -> f64 {
        self.as_str().coerce()
    }
}

impl Coerce for f64 {
    fn coerce(&self) -> f64 {
        if self.is_finite() { *self } else { 0.0 }
    }
}

impl<T: Coerce + ?Sized> Coerce for &T {
    fn coerce(&self) -> f64 {
        (**self).coerce()
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn coerce(&self) -> f64 {
        self.as_ref().map_or(0.0, Coerce::coerce)
    }
}

impl Coerce for serde_json::Value {
    fn coerce(&self) -> f64 {
        match self {
            serde_json::Value::Number(number) => number.as_f64().coerce(),
            serde_json::Value::String(text) => text.coerce(),
            _ => 0.0,
        }
    }
}

pub fn coerce<T: Coerce + ?Sized>(value: &T) -> f64 {
    value.coerce()
}

/// Rounds half away from zero and pins the scale so `90` renders as `90.0`.
/// Rounding works on the exact binary value, so `1.005` (stored just below
/// the tie) becomes `1.00`. Non-finite input, or input beyond the `Decimal`
/// range, yields `None`.
pub fn round_to(value: f64, places: u32) -> Option<Decimal> {
    let mut decimal = Decimal::from_f64_retain(value)?;
    decimal = decimal.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    decimal.rescale(places);
    Some(decimal)
}

/// Same as [`round_to()`], saturating at `Decimal::MIN`/`Decimal::MAX` for
/// finite values outside the decimal range. NaN maps to zero.
pub(crate) fn round_finite(value: f64, places: u32) -> Decimal {
    round_to(value, places).unwrap_or(if value.is_nan() {
        Decimal::ZERO
    } else if value.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Fixed-point text with exactly `places` decimals, rounded like
/// [`round_to()`].
pub(crate) fn to_fixed(value: f64, places: u32) -> String {
    match round_to(value, places) {
        Some(decimal) => decimal.to_string(),
        None => format!("{value:.prec$}", prec = places as usize),
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
