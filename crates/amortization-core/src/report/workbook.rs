//! Two-sheet workbook layout ("Summary" and "Schedule").
//!
//! The workbook is plain data; writers for concrete file formats live with the
//! callers.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::schedule::Schedule;

pub const SUMMARY_SHEET: &str = "Summary";
pub const SCHEDULE_SHEET: &str = "Schedule";

/// Header row of the schedule sheet, one column per period field.
pub const SCHEDULE_HEADER: [&str; 6] = [
    "Month",
    "Opening Principal",
    "EMI/Payment",
    "Principal Repaid",
    "Interest",
    "Closing Principal",
];

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(u32),
    Number(Decimal),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{n}"),
            Cell::Number(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Cell::Integer(n)
    }
}

impl From<Decimal> for Cell {
    fn from(d: Decimal) -> Self {
        Cell::Number(d)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Label/value rows: principal, payment, rate, months, total interest, total paid.
pub fn summary_sheet(schedule: &Schedule) -> Sheet {
    let rows = vec![
        vec![Cell::from(SUMMARY_SHEET)],
        vec!["Principal".into(), schedule.principal.into()],
        vec!["EMI".into(), schedule.payment.into()],
        vec!["Rate".into(), schedule.annual_rate_pct.into()],
        vec!["Months".into(), schedule.total_months.into()],
        vec!["Total Interest".into(), schedule.total_interest.into()],
        vec!["Total Paid".into(), schedule.total_paid.into()],
    ];
    Sheet {
        name: SUMMARY_SHEET.to_string(),
        rows,
    }
}

/// Header row followed by one row per period.
pub fn schedule_sheet(schedule: &Schedule) -> Sheet {
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(schedule.periods.len() + 1);
    rows.push(SCHEDULE_HEADER.iter().map(|h| Cell::from(*h)).collect());
    for p in &schedule.periods {
        rows.push(vec![
            p.index.into(),
            p.opening_balance.into(),
            p.payment.into(),
            p.principal_component.into(),
            p.interest_component.into(),
            p.closing_balance.into(),
        ]);
    }
    Sheet {
        name: SCHEDULE_SHEET.to_string(),
        rows,
    }
}

pub fn schedule_workbook(schedule: &Schedule) -> Workbook {
    Workbook {
        sheets: vec![summary_sheet(schedule), schedule_sheet(schedule)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{compute_schedule, LoanInput};
    use rust_decimal_macros::dec;

    fn workbook() -> Workbook {
        let input = LoanInput::with_payment(dec!(100000), dec!(12), dec!(5000));
        schedule_workbook(&compute_schedule(&input).unwrap())
    }

    #[test]
    fn test_sheet_order_and_names() {
        let wb = workbook();
        let names: Vec<&str> = wb.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Summary", "Schedule"]);
    }

    #[test]
    fn test_schedule_sheet_has_header_and_rows() {
        let wb = workbook();
        let sheet = wb.sheet(SCHEDULE_SHEET).unwrap();
        assert_eq!(sheet.rows.len(), 24);
        let header: Vec<String> = sheet.rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, SCHEDULE_HEADER.to_vec());
        assert_eq!(sheet.rows[1][0], Cell::Integer(1));
        assert_eq!(sheet.rows[1][4], Cell::Number(dec!(1000.00)));
        assert_eq!(sheet.rows[23][5], Cell::Number(Decimal::ZERO));
    }

    #[test]
    fn test_summary_sheet_rows() {
        let wb = workbook();
        let sheet = wb.sheet(SUMMARY_SHEET).unwrap();
        assert_eq!(sheet.rows[0], vec![Cell::Text("Summary".into())]);
        assert_eq!(
            sheet.rows[4],
            vec![Cell::Text("Months".into()), Cell::Integer(23)]
        );
        assert_eq!(
            sheet.rows[6],
            vec![
                Cell::Text("Total Paid".into()),
                Cell::Number(dec!(112134.79))
            ]
        );
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(dec!(96000.00)).to_string(), "96000.00");
        assert_eq!(Cell::Integer(7).to_string(), "7");
        assert_eq!(Cell::from("EMI").to_string(), "EMI");
    }
}
