//! Admin console operations with validation

use crate::PointsClient;
use jifeng_core::{
    Error, ExchangeRecord, ExchangeRecordQuery, NewProduct, Product, ProductStatus, ProductUpdate,
    Result,
};
use tracing::{info, warn};

/// Create a product after checking the obvious invariants locally
pub async fn create_product(client: &PointsClient, product: &NewProduct) -> Result<Product> {
    validate_name(&product.name)?;
    if product.monthly_limit == 0 {
        warn!(
            "Product '{}' created with a monthly limit of 0; it cannot be exchanged",
            product.name
        );
    }

    let created = client.admin_create_product(product).await?;
    info!("Created product {} ({})", created.name, created.id);
    Ok(created)
}

/// Apply a partial update; an empty update is rejected without a call
pub async fn update_product(
    client: &PointsClient,
    id: &str,
    update: &ProductUpdate,
) -> Result<Product> {
    validate_id(id)?;
    if update.is_empty() {
        return Err(Error::InvalidData("Nothing to update".to_string()));
    }
    if let Some(name) = &update.name {
        validate_name(name)?;
    }

    let updated = client.admin_update_product(id, update).await?;
    info!("Updated product {}", id);
    Ok(updated)
}

pub async fn set_stock(client: &PointsClient, id: &str, stock: u32) -> Result<Product> {
    validate_id(id)?;
    let updated = client.admin_update_stock(id, stock).await?;
    info!("Stock of {} set to {}", id, updated.stock);
    Ok(updated)
}

pub async fn set_status(client: &PointsClient, id: &str, status: ProductStatus) -> Result<Product> {
    validate_id(id)?;
    let updated = client.admin_update_status(id, status).await?;
    info!("Product {} is now {}", id, status);
    Ok(updated)
}

pub async fn list_all_products(client: &PointsClient) -> Result<Vec<Product>> {
    client.admin_list_products().await
}

/// Exchange history; blank filter values are dropped rather than sent
pub async fn list_exchange_records(
    client: &PointsClient,
    query: &ExchangeRecordQuery,
) -> Result<Vec<ExchangeRecord>> {
    let normalized = ExchangeRecordQuery {
        user_id: non_blank(&query.user_id),
        product_id: non_blank(&query.product_id),
        status: non_blank(&query.status),
    };
    client.admin_exchange_records(&normalized).await
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidData("Product id must not be empty".to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidData("Product name must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_dropped() {
        assert_eq!(non_blank(&Some("  ".into())), None);
        assert_eq!(non_blank(&Some(" u-1 ".into())).as_deref(), Some("u-1"));
        assert_eq!(non_blank(&None), None);
    }

    #[test]
    fn test_validation() {
        assert!(validate_id("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("Coffee").is_ok());
    }
}
