use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use amortization_core::schedule::{self, LoanInput, LoanRequest};

use crate::input;

/// Loan terms, from flags or from a JSON/YAML file
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (12 = 12% a year)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Fixed monthly payment (EMI)
    #[arg(long, alias = "emi", conflicts_with = "tenure")]
    pub payment: Option<Decimal>,

    /// Tenure in months; the payment is derived from it
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Disbursement date (YYYY-MM-DD); labels each period with its due date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Give up if the loan has not closed after this many periods
    #[arg(long)]
    pub max_periods: Option<u32>,
}

impl ScheduleArgs {
    fn has_flags(&self) -> bool {
        self.principal.is_some()
            || self.rate.is_some()
            || self.payment.is_some()
            || self.tenure.is_some()
    }
}

/// Resolve the loan request: `--input` file, then flags, then piped stdin.
pub fn load_request(args: &ScheduleArgs) -> Result<LoanRequest, Box<dyn std::error::Error>> {
    let mut request: LoanRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if args.has_flags() {
        LoanRequest::from(LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            payment: args.payment,
            tenure_months: args.tenure,
            start_date: None,
        })
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--principal, --rate and --payment or --tenure are required (or provide --input)"
                .into(),
        );
    };

    if let Some(start_date) = args.start_date {
        request.loan.start_date = Some(start_date);
    }
    if let Some(max_periods) = args.max_periods {
        request.options.max_periods = max_periods;
    }
    Ok(request)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args)?;
    let result = schedule::amortization_schedule(&request.loan, &request.options)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args)?;
    let result = schedule::amortization_schedule(&request.loan, &request.options)?
        .map(|s| s.summary());
    Ok(serde_json::to_value(result)?)
}
