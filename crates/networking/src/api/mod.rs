//! High-level API wrappers for the points backend
//!
//! Implements the core service traits on top of `PointsClient` and adds
//! session bookkeeping and input validation around the raw endpoints.

mod admin;
mod auth;
mod catalog;
mod exchange;

pub use admin::*;
pub use auth::*;
