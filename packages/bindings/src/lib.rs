use napi::Result as NapiResult;
use napi_derive::napi;

use amortization_core::report;
use amortization_core::schedule::{self, LoanInput, LoanRequest, ScheduleOptions};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_request(input_json: &str) -> NapiResult<LoanRequest> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = schedule::amortization_schedule(&request.loan, &request.options)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn schedule_summary(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = schedule::amortization_schedule(&request.loan, &request.options)
        .map_err(to_napi_error)?
        .map(|s| s.summary());
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Schedule from plain JS numbers; NaN and infinities are rejected.
#[napi]
pub fn compute_schedule_from_values(
    principal: f64,
    annual_rate_pct: f64,
    payment: Option<f64>,
    tenure_months: Option<u32>,
) -> NapiResult<String> {
    let input = LoanInput::from_f64(principal, annual_rate_pct, payment, tenure_months)
        .map_err(to_napi_error)?;
    let output = schedule::amortization_schedule(&input, &ScheduleOptions::default())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Summary and Schedule sheets as rows of cells, ready for a spreadsheet writer.
#[napi]
pub fn schedule_workbook(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let schedule =
        schedule::compute_schedule_with(&request.loan, &request.options).map_err(to_napi_error)?;
    serde_json::to_string(&report::schedule_workbook(&schedule)).map_err(to_napi_error)
}
