//! Fixed-payment amortization loop.
//!
//! Balances are carried at full decimal precision from one period to the next;
//! monetary fields are rounded to cents only when a [`Period`] or a total is
//! emitted. The final period settles the remaining balance exactly, so its
//! payment is usually smaller than the nominal payment.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::input::{LoanInput, ResolvedLoan};
use crate::error::AmortizationError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::AmortizationResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on schedule length before the loop gives up.
pub const DEFAULT_MAX_PERIODS: u32 = 10_000;

/// A closing balance below this is treated as fully repaid.
pub const DEFAULT_SETTLEMENT_EPSILON: Money = dec!(0.005);

/// Schedules longer than this get a warning in the computation envelope.
const LONG_SCHEDULE_WARNING_MONTHS: u32 = 360;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    pub max_periods: u32,
    pub settlement_epsilon: Money,
}

impl ScheduleOptions {
    pub fn validate(&self) -> AmortizationResult<()> {
        if self.max_periods == 0 {
            return Err(AmortizationError::invalid(
                "max_periods",
                "At least one period must be allowed",
            ));
        }
        if self.settlement_epsilon < Decimal::ZERO {
            return Err(AmortizationError::invalid(
                "settlement_epsilon",
                "Settlement threshold cannot be negative",
            ));
        }
        Ok(())
    }
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
            settlement_epsilon: DEFAULT_SETTLEMENT_EPSILON,
        }
    }
}

/// Where the nominal payment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentBasis {
    /// Supplied directly by the caller.
    Fixed,
    /// Level annuity payment over the given tenure.
    DerivedFromTenure { tenure_months: u32 },
}

/// One billing month. Monetary fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub closing_balance: Money,
}

/// A complete amortization schedule with its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub principal: Money,
    pub annual_rate_pct: Decimal,
    pub monthly_rate: Rate,
    /// Nominal payment, rounded to cents.
    pub payment: Money,
    pub payment_basis: PaymentBasis,
    pub periods: Vec<Period>,
    pub total_months: u32,
    pub total_interest: Money,
    pub total_principal_paid: Money,
    pub total_paid: Money,
}

/// Aggregate figures for a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub principal: Money,
    pub payment: Money,
    pub annual_rate_pct: Decimal,
    pub total_months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    pub final_payment: Money,
}

impl Schedule {
    /// Payment made in the last period (the settling payment).
    pub fn final_payment(&self) -> Money {
        self.periods
            .last()
            .map(|p| p.payment)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            principal: self.principal,
            payment: self.payment,
            annual_rate_pct: self.annual_rate_pct,
            total_months: self.total_months,
            total_interest: self.total_interest,
            total_paid: self.total_paid,
            final_payment: self.final_payment(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the amortization schedule for a loan with default options.
pub fn compute_schedule(input: &LoanInput) -> AmortizationResult<Schedule> {
    compute_schedule_with(input, &ScheduleOptions::default())
}

/// Compute the amortization schedule for a loan.
///
/// # Errors
///
/// * `InvalidInput` for non-positive principal or rate, missing or conflicting
///   payment terms, or a tenure whose growth factor overflows.
/// * `PaymentTooLow` when the payment does not exceed first-period interest.
/// * `ScheduleTooLong` when the loan does not close within `options.max_periods`.
/// * `DateError` when a due date falls outside the calendar range.
pub fn compute_schedule_with(
    input: &LoanInput,
    options: &ScheduleOptions,
) -> AmortizationResult<Schedule> {
    let loan = input.resolve()?;
    debug!(
        principal = %loan.principal,
        payment = %loan.payment,
        monthly_rate = %loan.monthly_rate,
        basis = ?loan.basis,
        "resolved loan terms"
    );

    let mut schedule = run_schedule(&loan, input.annual_rate_pct, options)?;
    if let Some(start) = input.start_date {
        assign_due_dates(&mut schedule.periods, start)?;
    }
    Ok(schedule)
}

/// Amortize `principal` at a known monthly rate with a fixed payment.
///
/// Unlike [`compute_schedule`] this accepts a zero rate, for interest-free
/// instalment plans.
pub fn amortize(
    principal: Money,
    payment: Money,
    monthly_rate: Rate,
    options: &ScheduleOptions,
) -> AmortizationResult<Schedule> {
    if principal <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if payment <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "payment",
            "Payment must be positive",
        ));
    }
    if monthly_rate < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "monthly_rate",
            "Monthly rate cannot be negative",
        ));
    }

    let loan = ResolvedLoan {
        principal,
        monthly_rate,
        payment,
        basis: PaymentBasis::Fixed,
    };
    let annual_rate_pct = monthly_rate
        .checked_mul(dec!(1200))
        .ok_or_else(|| AmortizationError::out_of_range("monthly_rate"))?;
    run_schedule(&loan, annual_rate_pct, options)
}

/// Compute the schedule and wrap it in the standard computation envelope.
pub fn amortization_schedule(
    input: &LoanInput,
    options: &ScheduleOptions,
) -> AmortizationResult<ComputationOutput<Schedule>> {
    let start = Instant::now();

    let schedule = compute_schedule_with(input, options)?;
    let warnings = schedule_warnings(&schedule);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-payment amortization (monthly rate = annual % / 12 / 100)",
        input,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Amortization loop
// ---------------------------------------------------------------------------

fn run_schedule(
    loan: &ResolvedLoan,
    annual_rate_pct: Decimal,
    options: &ScheduleOptions,
) -> AmortizationResult<Schedule> {
    options.validate()?;

    let first_period_interest = loan
        .principal
        .checked_mul(loan.monthly_rate)
        .ok_or_else(|| AmortizationError::out_of_range("principal"))?;
    if loan.payment <= first_period_interest {
        return Err(AmortizationError::PaymentTooLow {
            payment: round_money(loan.payment),
            first_period_interest: round_money(first_period_interest),
        });
    }

    let mut periods: Vec<Period> = Vec::new();
    let mut balance = loan.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    while balance > Decimal::ZERO {
        if periods.len() as u32 >= options.max_periods {
            return Err(AmortizationError::ScheduleTooLong {
                limit: options.max_periods,
            });
        }

        let interest = balance * loan.monthly_rate;
        let mut principal = loan.payment - interest;
        let mut closing = balance - principal;
        let mut payment = loan.payment;

        if closing < options.settlement_epsilon {
            // Settle exactly what is left.
            principal = balance;
            closing = Decimal::ZERO;
            payment = balance
                .checked_add(interest)
                .ok_or_else(|| AmortizationError::out_of_range("payment"))?;
        }

        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| AmortizationError::out_of_range("principal"))?;
        total_principal += principal;
        periods.push(Period {
            index: periods.len() as u32 + 1,
            due_date: None,
            opening_balance: round_money(balance),
            payment: round_money(payment),
            principal_component: round_money(principal),
            interest_component: round_money(interest),
            closing_balance: round_money(closing),
        });

        balance = closing;
    }

    let total_interest = round_money(total_interest);
    let total_paid = loan
        .principal
        .checked_add(total_interest)
        .ok_or_else(|| AmortizationError::out_of_range("principal"))?;
    let total_months = periods.len() as u32;
    debug!(total_months, total_interest = %total_interest, "schedule complete");

    Ok(Schedule {
        principal: round_money(loan.principal),
        annual_rate_pct,
        monthly_rate: loan.monthly_rate,
        payment: round_money(loan.payment),
        payment_basis: loan.basis,
        periods,
        total_months,
        total_interest,
        total_principal_paid: round_money(total_principal),
        total_paid: round_money(total_paid),
    })
}

fn assign_due_dates(periods: &mut [Period], start: NaiveDate) -> AmortizationResult<()> {
    for period in periods.iter_mut() {
        let due = start
            .checked_add_months(Months::new(period.index))
            .ok_or_else(|| {
                AmortizationError::DateError(format!(
                    "Due date for period {} overflows from start date {start}",
                    period.index
                ))
            })?;
        period.due_date = Some(due);
    }
    Ok(())
}

fn schedule_warnings(schedule: &Schedule) -> Vec<String> {
    let mut warnings = Vec::new();

    if let PaymentBasis::DerivedFromTenure { tenure_months } = schedule.payment_basis {
        warnings.push(format!(
            "Payment of {} derived from a {}-month tenure",
            schedule.payment, tenure_months
        ));
    }

    let final_payment = schedule.final_payment();
    if final_payment != schedule.payment {
        warnings.push(format!(
            "Final payment of {} differs from the nominal payment of {}",
            final_payment, schedule.payment
        ));
    }

    if schedule.total_months > LONG_SCHEDULE_WARNING_MONTHS {
        warnings.push(format!(
            "Schedule runs {} months; the payment barely exceeds the interest due",
            schedule.total_months
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn standard_loan() -> LoanInput {
        LoanInput::with_payment(dec!(100000), dec!(12), dec!(5000))
    }

    #[test]
    fn test_first_period_split() {
        let schedule = compute_schedule(&standard_loan()).unwrap();
        let first = &schedule.periods[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.opening_balance, dec!(100000.00));
        assert_eq!(first.payment, dec!(5000.00));
        assert_eq!(first.interest_component, dec!(1000.00));
        assert_eq!(first.principal_component, dec!(4000.00));
        assert_eq!(first.closing_balance, dec!(96000.00));
    }

    #[test]
    fn test_standard_loan_totals() {
        let schedule = compute_schedule(&standard_loan()).unwrap();
        assert_eq!(schedule.total_months, 23);
        assert_eq!(schedule.periods.len(), 23);
        assert_eq!(schedule.total_interest, dec!(12134.79));
        assert_eq!(schedule.total_paid, dec!(112134.79));
        assert_eq!(schedule.total_principal_paid, dec!(100000.00));
    }

    #[test]
    fn test_final_period_settles_remaining_balance() {
        let schedule = compute_schedule(&standard_loan()).unwrap();
        let last = schedule.periods.last().unwrap();
        assert_eq!(last.index, 23);
        assert_eq!(last.opening_balance, dec!(2113.66));
        assert_eq!(last.principal_component, dec!(2113.66));
        assert_eq!(last.interest_component, dec!(21.14));
        assert_eq!(last.payment, dec!(2134.79));
        assert_eq!(last.closing_balance, Decimal::ZERO);
        assert_eq!(schedule.final_payment(), dec!(2134.79));
    }

    #[test]
    fn test_payment_too_low() {
        let input = LoanInput::with_payment(dec!(100000), dec!(12), dec!(500));
        match compute_schedule(&input) {
            Err(AmortizationError::PaymentTooLow {
                payment,
                first_period_interest,
            }) => {
                assert_eq!(payment, dec!(500));
                assert_eq!(first_period_interest, dec!(1000.00));
            }
            other => panic!("Expected PaymentTooLow, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_equal_to_interest_is_too_low() {
        let input = LoanInput::with_payment(dec!(100000), dec!(12), dec!(1000));
        assert!(matches!(
            compute_schedule(&input),
            Err(AmortizationError::PaymentTooLow { .. })
        ));
    }

    #[test]
    fn test_payment_just_above_interest_closes() {
        let input = LoanInput::with_payment(dec!(100000), dec!(12), dec!(1000.01));
        let schedule = compute_schedule(&input).unwrap();
        assert!(schedule.total_months > 1000);
        assert_eq!(schedule.periods.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_too_long() {
        let options = ScheduleOptions {
            max_periods: 12,
            ..ScheduleOptions::default()
        };
        match compute_schedule_with(&standard_loan(), &options) {
            Err(AmortizationError::ScheduleTooLong { limit }) => assert_eq!(limit, 12),
            other => panic!("Expected ScheduleTooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_cap_equal_to_length_is_allowed() {
        let options = ScheduleOptions {
            max_periods: 23,
            ..ScheduleOptions::default()
        };
        let schedule = compute_schedule_with(&standard_loan(), &options).unwrap();
        assert_eq!(schedule.total_months, 23);
    }

    #[test]
    fn test_options_validation() {
        let options = ScheduleOptions {
            max_periods: 0,
            ..ScheduleOptions::default()
        };
        assert!(matches!(
            compute_schedule_with(&standard_loan(), &options),
            Err(AmortizationError::InvalidInput { ref field, .. }) if field == "max_periods"
        ));

        let options = ScheduleOptions {
            settlement_epsilon: dec!(-0.01),
            ..ScheduleOptions::default()
        };
        assert!(compute_schedule_with(&standard_loan(), &options).is_err());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ScheduleOptions = serde_json::from_str(r#"{"max_periods": 600}"#).unwrap();
        assert_eq!(options.max_periods, 600);
        assert_eq!(options.settlement_epsilon, DEFAULT_SETTLEMENT_EPSILON);
    }

    #[test]
    fn test_tenure_schedule_has_exact_length() {
        let input = LoanInput::with_tenure(dec!(12000), dec!(12), 12);
        let schedule = compute_schedule(&input).unwrap();
        assert_eq!(schedule.payment, dec!(1066.19));
        assert_eq!(schedule.total_months, 12);
        assert_eq!(schedule.total_interest, dec!(794.23));
        assert_eq!(schedule.final_payment(), dec!(1066.19));
        assert_eq!(
            schedule.payment_basis,
            PaymentBasis::DerivedFromTenure { tenure_months: 12 }
        );
    }

    fn invalid_field(result: AmortizationResult<Schedule>) -> String {
        match result {
            Err(AmortizationError::InvalidInput { field, .. }) => field,
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_tenure_growth_overflow_is_invalid_tenure() {
        let input = LoanInput::with_tenure(dec!(1), dec!(240), 1200);
        assert_eq!(invalid_field(compute_schedule(&input)), "tenure_months");
    }

    #[test]
    fn test_very_long_tenure_is_invalid_tenure() {
        let input = LoanInput::with_tenure(dec!(100000), dec!(12), 6000);
        assert_eq!(invalid_field(compute_schedule(&input)), "tenure_months");
    }

    #[test]
    fn test_high_rate_tenure_is_invalid_tenure_not_payment_too_low() {
        for principal in [dec!(1), dec!(37.5), dec!(1000), dec!(123456.78), dec!(99999999999)] {
            let input = LoanInput::with_tenure(principal, dec!(240), 360);
            assert_eq!(
                invalid_field(compute_schedule(&input)),
                "tenure_months",
                "principal {principal}"
            );
        }
    }

    #[test]
    fn test_amortize_rate_out_of_range() {
        let result = amortize(dec!(1), dec!(1), Decimal::MAX, &ScheduleOptions::default());
        assert_eq!(invalid_field(result), "monthly_rate");
    }

    #[test]
    fn test_first_period_interest_out_of_range() {
        let result = amortize(Decimal::MAX, Decimal::MAX, dec!(2), &ScheduleOptions::default());
        assert_eq!(invalid_field(result), "principal");
    }

    #[test]
    fn test_due_date_overflow_is_date_error() {
        let input = standard_loan().starting(NaiveDate::MAX);
        match compute_schedule(&input) {
            Err(AmortizationError::DateError(msg)) => assert!(msg.contains("period 1")),
            other => panic!("Expected DateError, got {other:?}"),
        }
    }

    #[test]
    fn test_amortize_zero_rate() {
        let schedule = amortize(dec!(1000), dec!(300), Decimal::ZERO, &ScheduleOptions::default())
            .unwrap();
        assert_eq!(schedule.total_months, 4);
        for period in &schedule.periods[..3] {
            assert_eq!(period.interest_component, Decimal::ZERO);
            assert_eq!(period.principal_component, dec!(300));
            assert_eq!(period.payment, dec!(300));
        }
        assert_eq!(schedule.final_payment(), dec!(100));
        assert_eq!(schedule.total_interest, Decimal::ZERO);
        assert_eq!(schedule.annual_rate_pct, Decimal::ZERO);
    }

    #[test]
    fn test_amortize_zero_rate_exact_division() {
        let schedule = amortize(dec!(900), dec!(300), Decimal::ZERO, &ScheduleOptions::default())
            .unwrap();
        assert_eq!(schedule.total_months, 3);
        assert_eq!(schedule.final_payment(), dec!(300));
    }

    #[test]
    fn test_amortize_reports_annual_rate() {
        let schedule =
            amortize(dec!(100000), dec!(5000), dec!(0.01), &ScheduleOptions::default()).unwrap();
        assert_eq!(schedule.annual_rate_pct, dec!(12));
        assert_eq!(schedule.total_months, 23);
    }

    #[test]
    fn test_payment_larger_than_balance_settles_in_one_period() {
        let input = LoanInput::with_payment(dec!(1000), dec!(12), dec!(5000));
        let schedule = compute_schedule(&input).unwrap();
        assert_eq!(schedule.total_months, 1);
        assert_eq!(schedule.final_payment(), dec!(1010.00));
        assert_eq!(schedule.total_interest, dec!(10.00));
    }

    #[test]
    fn test_due_dates_follow_start_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let input = standard_loan().starting(start);
        let schedule = compute_schedule(&input).unwrap();
        assert_eq!(
            schedule.periods[0].due_date,
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            schedule.periods[1].due_date,
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
        assert_eq!(
            schedule.periods[22].due_date,
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
    }

    #[test]
    fn test_no_due_dates_without_start_date() {
        let schedule = compute_schedule(&standard_loan()).unwrap();
        assert!(schedule.periods.iter().all(|p| p.due_date.is_none()));
    }

    #[test]
    fn test_summary_matches_schedule() {
        let schedule = compute_schedule(&standard_loan()).unwrap();
        let summary = schedule.summary();
        assert_eq!(summary.principal, dec!(100000));
        assert_eq!(summary.payment, dec!(5000));
        assert_eq!(summary.annual_rate_pct, dec!(12));
        assert_eq!(summary.total_months, 23);
        assert_eq!(summary.total_interest, dec!(12134.79));
        assert_eq!(summary.total_paid, dec!(112134.79));
        assert_eq!(summary.final_payment, dec!(2134.79));
    }

    #[test]
    fn test_envelope_warnings() {
        let out = amortization_schedule(&standard_loan(), &ScheduleOptions::default()).unwrap();
        assert_eq!(out.result.total_months, 23);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Final payment of 2134.79"));
        assert_eq!(out.assumptions["payment"], serde_json::json!("5000"));
    }

    #[test]
    fn test_envelope_warns_on_derived_payment() {
        let input = LoanInput::with_tenure(dec!(12000), dec!(12), 12);
        let out = amortization_schedule(&input, &ScheduleOptions::default()).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("derived from a 12-month tenure")));
    }

    #[test]
    fn test_twenty_year_mortgage() {
        let input = LoanInput::with_tenure(dec!(200000), dec!(8.5), 240);
        let out = amortization_schedule(&input, &ScheduleOptions::default()).unwrap();
        let schedule = &out.result;
        assert_eq!(schedule.total_months, 240);
        assert_eq!(schedule.payment, dec!(1735.65));
        assert_close(schedule.total_interest, dec!(216555.15), TOL, "total interest");
    }
}
