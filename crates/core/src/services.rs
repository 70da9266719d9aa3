//! Service seams consumed by the exchange flow.
//!
//! The HTTP client implements both traits; tests substitute in-memory
//! doubles.

use crate::models::{CodeDispatch, ExchangeRequest, Product};
use crate::Result;
use async_trait::async_trait;

/// Read access to the catalog and the caller's balance
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_balance(&self) -> Result<u64>;
}

/// Verification codes and the exchange itself
#[async_trait]
pub trait ExchangeService: Send + Sync {
    /// Ask the backend to deliver a one-time code out of band
    async fn send_verification_code(&self) -> Result<CodeDispatch>;

    /// Submit a single exchange. Never retried by implementations.
    async fn submit_exchange(&self, request: &ExchangeRequest) -> Result<()>;
}
