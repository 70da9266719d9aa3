//! Jifeng Core - Shared data models, types, errors, and service seams

pub mod errors;
pub mod models;
pub mod services;
pub mod types;

pub use errors::{Error, Result};
pub use models::*;
pub use services::{CatalogService, ExchangeService};
pub use types::*;
