//! `CatalogService` over HTTP

use crate::PointsClient;
use async_trait::async_trait;
use jifeng_core::{CatalogService, Product, Result};

#[async_trait]
impl CatalogService for PointsClient {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.get_products().await
    }

    async fn get_balance(&self) -> Result<u64> {
        PointsClient::get_balance(self).await
    }
}
