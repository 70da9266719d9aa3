//! Product catalog models

use super::{deserialize_id, null_as_default};
use crate::types::ProductStatus;
use serde::{Deserialize, Serialize};

/// A product that can be exchanged for points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    /// Cost of one unit in points
    pub points: u32,
    pub stock: u32,
    /// Exchanges allowed per calendar month
    pub monthly_limit: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_this_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

/// Why a product cannot be exchanged right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailability {
    OutOfStock,
    MonthlyLimitReached,
}

impl Product {
    /// Exchanges left this month, never negative
    pub fn remaining(&self) -> u32 {
        self.monthly_limit.saturating_sub(self.used_this_month)
    }

    /// Whether the product can be selected for exchange
    pub fn is_exchangeable(&self) -> bool {
        self.unavailable_reason().is_none()
    }

    pub fn unavailable_reason(&self) -> Option<Unavailability> {
        if self.stock == 0 {
            Some(Unavailability::OutOfStock)
        } else if self.remaining() == 0 {
            Some(Unavailability::MonthlyLimitReached)
        } else {
            None
        }
    }

    /// Total points for `quantity` units
    pub fn cost(&self, quantity: u32) -> u64 {
        u64::from(self.points) * u64::from(quantity)
    }
}

/// Payload for creating a product from the admin console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub points: u32,
    pub description: String,
    pub stock: u32,
    pub image: String,
    pub monthly_limit: u32,
    pub status: ProductStatus,
}

/// Partial update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.points.is_none()
            && self.description.is_none()
            && self.stock.is_none()
            && self.image.is_none()
            && self.monthly_limit.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub stock: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ProductStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(limit: u32, used: u32, stock: u32) -> Product {
        Product {
            id: "p-1".into(),
            name: "Coffee coupon".into(),
            description: String::new(),
            image: String::new(),
            points: 30,
            stock,
            monthly_limit: limit,
            used_this_month: used,
            status: None,
        }
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        assert_eq!(product(5, 2, 10).remaining(), 3);
        assert_eq!(product(5, 5, 10).remaining(), 0);
        assert_eq!(product(3, 7, 10).remaining(), 0);
    }

    #[test]
    fn test_exchangeable_needs_quota_and_stock() {
        assert!(product(5, 0, 1).is_exchangeable());
        assert_eq!(
            product(5, 5, 10).unavailable_reason(),
            Some(Unavailability::MonthlyLimitReached)
        );
        assert_eq!(
            product(5, 0, 0).unavailable_reason(),
            Some(Unavailability::OutOfStock)
        );
    }

    #[test]
    fn test_numeric_id_and_nulls() {
        let json = r#"{
            "id": 42, "name": "Tea", "description": null, "image": null,
            "points": 10, "stock": 3, "monthlyLimit": 2, "usedThisMonth": null, "status": 1
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "42");
        assert_eq!(p.description, "");
        assert_eq!(p.used_this_month, 0);
        assert_eq!(p.status, Some(ProductStatus::Online));
        assert_eq!(p.cost(3), 30);
    }

    #[test]
    fn test_partial_update_skips_unset_fields() {
        let update = ProductUpdate {
            stock: Some(9),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"stock":9}"#);
        assert!(ProductUpdate::default().is_empty());
    }
}
