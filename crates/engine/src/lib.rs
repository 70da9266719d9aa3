//! Jifeng Engine - Exchange flow, eligibility rules, and session handling

pub mod exchange;
pub mod notice;
pub mod session_guard;

pub use exchange::{ExchangeFlowController, FlowError, FlowOptions, FlowStage};
pub use notice::{Notice, NoticeLevel};
pub use session_guard::{GuardAction, Route, SessionGuard};
