pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;
pub mod workbook;

use amortization_core::report::SCHEDULE_HEADER;
use serde_json::Value;

use crate::OutputFormat;

/// Period fields in schedule column order, paired with `SCHEDULE_HEADER`.
pub const PERIOD_KEYS: [&str; 6] = [
    "index",
    "opening_balance",
    "payment",
    "principal_component",
    "interest_component",
    "closing_balance",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The period rows of a schedule result, if the value holds one.
pub fn schedule_periods(result: &Value) -> Option<&Vec<Value>> {
    result.get("periods").and_then(Value::as_array)
}

/// Schedule header, with a due date column when the periods carry dates.
pub fn period_header(periods: &[Value]) -> Vec<&'static str> {
    let mut header: Vec<&'static str> = SCHEDULE_HEADER.to_vec();
    if has_due_dates(periods) {
        header.insert(1, "Due Date");
    }
    header
}

/// Cells for one period row, in header order.
pub fn period_row(
    period: &Value,
    with_due_date: bool,
    format: fn(&Value) -> String,
) -> Vec<String> {
    let mut row: Vec<String> = PERIOD_KEYS
        .iter()
        .map(|k| period.get(*k).map(format).unwrap_or_default())
        .collect();
    if with_due_date {
        row.insert(1, period.get("due_date").map(format).unwrap_or_default());
    }
    row
}

pub fn has_due_dates(periods: &[Value]) -> bool {
    periods.iter().any(|p| p.get("due_date").is_some())
}
