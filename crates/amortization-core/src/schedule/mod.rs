//! Month-by-month amortization of a fixed-payment loan.
//!
//! A [`LoanInput`] carries either the periodic payment or a tenure. Tenures are
//! resolved into a level payment with the annuity formula, then both paths run
//! through the same balance-reduction loop.

pub mod annuity;
pub mod engine;
pub mod input;

pub use annuity::{annuity_payment, monthly_rate};
pub use engine::{
    amortization_schedule, amortize, compute_schedule, compute_schedule_with, PaymentBasis,
    Period, Schedule, ScheduleOptions, ScheduleSummary,
};
pub use input::{LoanInput, LoanRequest};
