use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::AmortizationError;
use crate::types::{round_money, Money, Rate};
use crate::AmortizationResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Convert an annual percentage rate (12 = 12% a year) into a simple monthly decimal rate.
///
/// No compounding adjustment: 12% a year is exactly 1% a month.
pub fn monthly_rate(annual_rate_pct: Decimal) -> Rate {
    annual_rate_pct / MONTHS_PER_YEAR / PERCENT
}

/// Level payment that retires `principal` over `periods` months.
///
/// PMT = P * r / [1 - (1 + r)^-n], or P / n when the rate is zero. Working with
/// the discount factor keeps every intermediate below the growth factor, so only
/// `(1 + r)^n` itself can leave the decimal range.
pub fn annuity_payment(principal: Money, monthly_rate: Rate, periods: u32) -> AmortizationResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if periods == 0 {
        return Err(AmortizationError::invalid(
            "tenure_months",
            "Tenure must be at least 1 month",
        ));
    }
    if monthly_rate < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "monthly_rate",
            "Monthly rate cannot be negative",
        ));
    }

    let n = Decimal::from(periods);
    if monthly_rate.is_zero() {
        return Ok(principal / n);
    }

    let first_period_interest = principal
        .checked_mul(monthly_rate)
        .ok_or_else(|| AmortizationError::out_of_range("principal"))?;

    let growth = Decimal::ONE
        .checked_add(monthly_rate)
        .and_then(|base| base.checked_powu(u64::from(periods)))
        .ok_or_else(|| {
            AmortizationError::invalid(
                "tenure_months",
                format!("(1 + r)^n overflows for {periods} months at monthly rate {monthly_rate}"),
            )
        })?;

    let denom = Decimal::ONE - Decimal::ONE / growth;
    if denom.is_zero() {
        // Rate too small to register at 28 significant digits.
        return Ok(principal / n);
    }

    let payment = first_period_interest
        .checked_div(denom)
        .ok_or_else(|| AmortizationError::out_of_range("principal"))?;

    // (1 + r)^-n vanished at working precision: the payment is pure interest.
    if round_money(payment) <= round_money(first_period_interest) {
        return Err(AmortizationError::invalid(
            "tenure_months",
            format!(
                "A {periods}-month tenure leaves no principal repayment at cent precision \
                 (payment {} against first-period interest {})",
                round_money(payment),
                round_money(first_period_interest)
            ),
        ));
    }

    Ok(payment)
}
