use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    data::format_number,
    dashboard::FilterChoices,
    forecast::ForecastSummary,
    group::{CategoryPerformance, DailyTrend, MonthlyTrend, StockMovement, StoreComparison},
    kpi::KpiSummary,
    rank::{AccuracyPoint, AlertRecord, ProductError},
};

const COLUMN_GAP: &str = "  ";
const UNDEFINED: &str = "n/a";

/// A result type that can be laid out as table rows.
pub trait TableView {
    fn headers() -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let rule = rule_widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &rule_widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn render_view<T: TableView>(items: &[T]) -> String {
    let rows = items.iter().map(TableView::cells).collect::<Vec<_>>();
    render_table(&T::headers(), &rows)
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.trim_end_matches(' ').to_string()
}

/// Character count, ignoring ANSI colour sequences.
fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            chars.by_ref().find(|next| *next == 'm');
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

fn strings<const N: usize>(names: [&str; N]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl TableView for KpiSummary {
    fn headers() -> Vec<String> {
        strings([
            "total_forecast",
            "total_actual",
            "accuracy",
            "low_stock_items",
            "variance",
        ])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.total_forecast.to_string(),
            self.total_actual.to_string(),
            format!("{}%", self.accuracy),
            self.low_stock_items.to_string(),
            self.variance
                .map(|v| format!("{v}%"))
                .unwrap_or_else(|| UNDEFINED.to_string()),
        ]
    }
}

impl TableView for MonthlyTrend {
    fn headers() -> Vec<String> {
        strings(["month", "forecast", "actual", "sold"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.month.clone(),
            format_number(self.forecast),
            format_number(self.actual),
            format_number(self.sold),
        ]
    }
}

impl TableView for StockMovement {
    fn headers() -> Vec<String> {
        strings(["month", "opening", "closing", "received", "sold"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.month.clone(),
            format_number(self.opening),
            format_number(self.closing),
            format_number(self.received),
            format_number(self.sold),
        ]
    }
}

impl TableView for CategoryPerformance {
    fn headers() -> Vec<String> {
        strings(["category", "actual", "forecast", "records", "avg_error"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format_number(self.value),
            format_number(self.forecast),
            self.count.to_string(),
            self.avg_error.to_string(),
        ]
    }
}

impl TableView for StoreComparison {
    fn headers() -> Vec<String> {
        strings(["store", "sales", "forecast"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.store.clone(),
            format_number(self.sales),
            format_number(self.forecast),
        ]
    }
}

impl TableView for AlertRecord {
    fn headers() -> Vec<String> {
        strings([
            "date",
            "store",
            "product",
            "closing_stock",
            "reorder_level",
            "deficit",
        ])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.record.date.clone(),
            self.record.store_name.clone(),
            self.record.product_name.clone(),
            format_number(self.record.closing_stock),
            format_number(self.record.reorder_level),
            format_number(self.deficit),
        ]
    }
}

impl TableView for AccuracyPoint {
    fn headers() -> Vec<String> {
        strings(["product", "forecast", "actual"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.product.clone(),
            format_number(self.forecast),
            format_number(self.actual),
        ]
    }
}

impl TableView for ProductError {
    fn headers() -> Vec<String> {
        strings(["product_id", "mean_error"])
    }

    fn cells(&self) -> Vec<String> {
        vec![self.product_id.clone(), format_number(self.mean_error)]
    }
}

impl TableView for DailyTrend {
    fn headers() -> Vec<String> {
        strings(["date", "actual", "predicted"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            format_number(self.actual),
            format_number(self.predicted),
        ]
    }
}

impl TableView for ForecastSummary {
    fn headers() -> Vec<String> {
        strings(["rows", "stores", "products", "mape", "accuracy"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.total_rows.to_string(),
            self.total_stores.to_string(),
            self.total_products.to_string(),
            format!("{}%", self.mape),
            format!("{}%", self.accuracy),
        ]
    }
}

/// Stores and categories as two columns, padded to the longer list.
pub fn render_choices(choices: &FilterChoices) -> String {
    let length = choices.stores.len().max(choices.categories.len());
    let rows = (0..length)
        .map(|idx| {
            vec![
                choices.stores.get(idx).cloned().unwrap_or_default(),
                choices.categories.get(idx).cloned().unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&strings(["store", "category"]), &rows)
}
