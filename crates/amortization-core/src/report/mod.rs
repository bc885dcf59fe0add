//! Tabular views of a schedule for export.

pub mod workbook;

pub use workbook::{
    schedule_workbook, summary_sheet, schedule_sheet, Cell, Sheet, Workbook, SCHEDULE_HEADER,
    SCHEDULE_SHEET, SUMMARY_SHEET,
};
