use serde_json::Value;
use std::io;

use super::{has_due_dates, period_header, period_row, schedule_periods};

/// Write output as CSV to stdout.
///
/// Schedules are written one row per period; any other result is written as
/// field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                if let Some(periods) = schedule_periods(result) {
                    write_schedule_csv(&mut wtr, periods);
                } else if let Value::Object(fields) = result {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in fields {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                } else {
                    let _ = wtr.write_record([&format_csv_value(result)]);
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_schedule_csv<W: io::Write>(wtr: &mut csv::Writer<W>, periods: &[Value]) {
    let with_due_date = has_due_dates(periods);
    let _ = wtr.write_record(period_header(periods));
    for period in periods {
        let _ = wtr.write_record(period_row(period, with_due_date, format_csv_value));
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
