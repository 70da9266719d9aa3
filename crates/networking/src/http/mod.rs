//! HTTP transport for the points backend

mod client;

pub use client::{ClientOptions, PointsClient};
