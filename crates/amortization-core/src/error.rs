use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Payment too low: payment of {payment} does not cover first-period interest of {first_period_interest}"
    )]
    PaymentTooLow {
        payment: Decimal,
        first_period_interest: Decimal,
    },

    #[error("Schedule too long: loan did not close within {limit} periods")]
    ScheduleTooLong { limit: u32 },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::SerializationError(e.to_string())
    }
}

impl AmortizationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(field: &str) -> Self {
        Self::invalid(field, "Amount exceeds the 128-bit decimal range")
    }
}
