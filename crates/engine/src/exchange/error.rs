//! Errors returned by exchange flow operations

use super::classify::ExchangeFailure;
use super::flow::FlowStage;
use super::validation::ExchangeViolation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Product {0} is not in the catalog")]
    UnknownProduct(String),

    /// Out of stock or monthly quota used up
    #[error("Product {0} cannot be exchanged right now")]
    IneligibleProduct(String),

    #[error("Quantity must be between 1 and {max} (got {requested})")]
    InvalidQuantity { requested: u32, max: u32 },

    #[error("Monthly exchange limit reached for this product")]
    MonthlyLimitReached,

    #[error("Only {0} more exchanges allowed this month")]
    QuantityExceedsLimit(u32),

    #[error("Not enough points: {required} required, {available} available")]
    InsufficientPoints { required: u64, available: u64 },

    #[error("Not enough stock: only {0} left")]
    InsufficientStock(u32),

    #[error("Please wait {0}s before requesting another code")]
    CodeCooldownActive(u32),

    #[error("A verification code request is already in progress")]
    CodeRequestInFlight,

    #[error("Failed to send verification code: {0}")]
    CodeSendFailed(String),

    #[error("Please enter the verification code")]
    MissingVerificationCode,

    #[error("{0}")]
    ExchangeFailed(ExchangeFailure),

    #[error("An exchange is being submitted")]
    SubmissionInFlight,

    #[error("Cannot {operation} while {stage:?}")]
    InvalidStage {
        operation: &'static str,
        stage: FlowStage,
    },
}

impl From<ExchangeViolation> for FlowError {
    fn from(violation: ExchangeViolation) -> Self {
        match violation {
            ExchangeViolation::MonthlyLimitReached => FlowError::MonthlyLimitReached,
            ExchangeViolation::QuantityExceedsLimit { remaining } => {
                FlowError::QuantityExceedsLimit(remaining)
            }
            ExchangeViolation::InsufficientPoints {
                required,
                available,
            } => FlowError::InsufficientPoints {
                required,
                available,
            },
            ExchangeViolation::InsufficientStock { stock } => FlowError::InsufficientStock(stock),
            ExchangeViolation::InvalidQuantity { requested, max } => {
                FlowError::InvalidQuantity { requested, max }
            }
        }
    }
}
