use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;

use amortization_core::report;
use amortization_core::schedule;

use super::schedule::{load_request, ScheduleArgs};
use crate::output::workbook;

/// Arguments for writing the Summary and Schedule sheets
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub loan: ScheduleArgs,

    /// Directory to write the sheets into (created if missing)
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// File name stem; sheets are written as <name>_Summary.csv and <name>_Schedule.csv
    #[arg(long, default_value = "EMI_Schedule")]
    pub name: String,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args.loan)?;
    let schedule = schedule::compute_schedule_with(&request.loan, &request.options)?;
    let book = report::schedule_workbook(&schedule);

    let files = workbook::write_csv_sheets(&book, &args.out_dir, &args.name)?;
    let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();

    Ok(json!({
        "files": files,
        "total_months": schedule.total_months,
        "total_interest": schedule.total_interest,
        "total_paid": schedule.total_paid,
    }))
}
