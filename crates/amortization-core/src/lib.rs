pub mod error;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "report")]
pub mod report;

pub use error::AmortizationError;
pub use types::*;

#[cfg(feature = "schedule")]
pub use schedule::{
    amortization_schedule, amortize, annuity_payment, compute_schedule, compute_schedule_with,
    monthly_rate, LoanInput, LoanRequest, PaymentBasis, Period, Schedule, ScheduleOptions,
    ScheduleSummary,
};

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
