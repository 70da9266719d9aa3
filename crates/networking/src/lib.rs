//! Jifeng Networking - Session, HTTP client, and API wrappers

pub mod api;
pub mod http;
pub mod session;

pub use http::{ClientOptions, PointsClient};
pub use session::{Session, SessionEvent};
