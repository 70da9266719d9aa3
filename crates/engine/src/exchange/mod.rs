//! Product exchange flow: selection, eligibility, code verification, submission

mod classify;
mod countdown;
mod error;
mod flow;
mod validation;

pub use classify::{ExchangeFailure, FailureClassifier, MessageClassifier, MonthlyUsage};
pub use countdown::Countdown;
pub use error::FlowError;
pub use flow::{
    CodeSent, ExchangeFlowController, ExchangeReceipt, FlowOptions, FlowStage, LoadReport,
    SubmitOutcome, VerificationSession,
};
pub use validation::{check_exchange_allowed, check_quantity, ExchangeViolation};
