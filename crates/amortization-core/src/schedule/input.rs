use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::annuity::{annuity_payment, monthly_rate};
use super::engine::{PaymentBasis, ScheduleOptions};
use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

/// Loan terms for a single schedule calculation.
///
/// Exactly one of `payment` and `tenure_months` must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Outstanding amount at the start of the schedule.
    pub principal: Money,
    /// Annual interest rate as a percentage (12 = 12% a year).
    pub annual_rate_pct: Decimal,
    /// Fixed monthly payment (EMI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    /// Number of monthly payments; the payment is derived from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_months: Option<u32>,
    /// Disbursement date. Period `i` falls due `i` months later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl LoanInput {
    pub fn with_payment(principal: Money, annual_rate_pct: Decimal, payment: Money) -> Self {
        Self {
            principal,
            annual_rate_pct,
            payment: Some(payment),
            tenure_months: None,
            start_date: None,
        }
    }

    pub fn with_tenure(principal: Money, annual_rate_pct: Decimal, tenure_months: u32) -> Self {
        Self {
            principal,
            annual_rate_pct,
            payment: None,
            tenure_months: Some(tenure_months),
            start_date: None,
        }
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Build an input from binary floats, rejecting NaN and infinities.
    pub fn from_f64(
        principal: f64,
        annual_rate_pct: f64,
        payment: Option<f64>,
        tenure_months: Option<u32>,
    ) -> AmortizationResult<Self> {
        Ok(Self {
            principal: decimal_from_f64("principal", principal)?,
            annual_rate_pct: decimal_from_f64("annual_rate_pct", annual_rate_pct)?,
            payment: payment
                .map(|p| decimal_from_f64("payment", p))
                .transpose()?,
            tenure_months,
            start_date: None,
        })
    }

    /// Validate the terms and turn them into a monthly rate and a level payment.
    pub(crate) fn resolve(&self) -> AmortizationResult<ResolvedLoan> {
        let terms = validate_loan_input(self)?;

        let rate = monthly_rate(self.annual_rate_pct);
        let (payment, basis) = match terms {
            PaymentTerms::Payment(payment) => (payment, PaymentBasis::Fixed),
            PaymentTerms::Tenure(tenure_months) => (
                annuity_payment(self.principal, rate, tenure_months)?,
                PaymentBasis::DerivedFromTenure { tenure_months },
            ),
        };

        Ok(ResolvedLoan {
            principal: self.principal,
            monthly_rate: rate,
            payment,
            basis,
        })
    }
}

/// Request layout shared by input files and JSON callers: loan terms plus
/// optional engine options under `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    #[serde(flatten)]
    pub loan: LoanInput,
    #[serde(default)]
    pub options: ScheduleOptions,
}

impl From<LoanInput> for LoanRequest {
    fn from(loan: LoanInput) -> Self {
        Self {
            loan,
            options: ScheduleOptions::default(),
        }
    }
}

/// Loan terms after validation and payment derivation.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedLoan {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub payment: Money,
    pub basis: PaymentBasis,
}

/// Convert a float to a decimal, failing on NaN, infinities and values out of range.
pub fn decimal_from_f64(field: &str, value: f64) -> AmortizationResult<Decimal> {
    if !value.is_finite() {
        return Err(AmortizationError::invalid(
            field,
            format!("Value must be a finite number, got {value}"),
        ));
    }
    Decimal::from_f64(value).ok_or_else(|| {
        AmortizationError::invalid(field, format!("Value {value} is out of decimal range"))
    })
}

enum PaymentTerms {
    Payment(Money),
    Tenure(u32),
}

fn validate_loan_input(input: &LoanInput) -> AmortizationResult<PaymentTerms> {
    if input.principal <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if input.annual_rate_pct <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "annual_rate_pct",
            "Annual interest rate must be positive",
        ));
    }
    match (input.payment, input.tenure_months) {
        (None, None) => Err(AmortizationError::invalid(
            "payment",
            "Either a payment or a tenure in months is required",
        )),
        (Some(_), Some(_)) => Err(AmortizationError::invalid(
            "payment",
            "Provide a payment or a tenure in months, not both",
        )),
        (Some(payment), None) if payment <= Decimal::ZERO => Err(AmortizationError::invalid(
            "payment",
            "Payment must be positive",
        )),
        (None, Some(0)) => Err(AmortizationError::invalid(
            "tenure_months",
            "Tenure must be at least 1 month",
        )),
        (Some(payment), None) => Ok(PaymentTerms::Payment(payment)),
        (None, Some(tenure_months)) => Ok(PaymentTerms::Tenure(tenure_months)),
    }
}
