//! Client-side eligibility checks run before an exchange is attempted

use jifeng_core::Product;

/// Check if an exchange of `quantity` units is allowed.
///
/// Checks run in a fixed order and the first failure is reported:
/// monthly quota, requested quantity against the quota, balance, stock.
pub fn check_exchange_allowed(
    product: &Product,
    quantity: u32,
    balance: u64,
) -> Result<(), ExchangeViolation> {
    let remaining = product.remaining();

    if remaining == 0 {
        return Err(ExchangeViolation::MonthlyLimitReached);
    }

    if quantity > remaining {
        return Err(ExchangeViolation::QuantityExceedsLimit { remaining });
    }

    let required = product.cost(quantity);
    if balance < required {
        return Err(ExchangeViolation::InsufficientPoints {
            required,
            available: balance,
        });
    }

    if product.stock < quantity {
        return Err(ExchangeViolation::InsufficientStock {
            stock: product.stock,
        });
    }

    Ok(())
}

/// Whether `quantity` is a selectable amount for `product`
pub fn check_quantity(product: &Product, quantity: u32) -> Result<(), ExchangeViolation> {
    let max = product.remaining();
    if quantity == 0 || quantity > max {
        return Err(ExchangeViolation::InvalidQuantity {
            requested: quantity,
            max,
        });
    }
    Ok(())
}

/// Exchange rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeViolation {
    MonthlyLimitReached,
    QuantityExceedsLimit { remaining: u32 },
    InsufficientPoints { required: u64, available: u64 },
    InsufficientStock { stock: u32 },
    InvalidQuantity { requested: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(points: u32, stock: u32, limit: u32, used: u32) -> Product {
        Product {
            id: "p-1".into(),
            name: "Coffee".into(),
            description: String::new(),
            image: String::new(),
            points,
            stock,
            monthly_limit: limit,
            used_this_month: used,
            status: None,
        }
    }

    #[test]
    fn test_allowed() {
        assert_eq!(check_exchange_allowed(&product(30, 10, 5, 0), 2, 100), Ok(()));
        // Exactly enough points
        assert_eq!(check_exchange_allowed(&product(50, 10, 5, 0), 2, 100), Ok(()));
    }

    #[test]
    fn test_monthly_limit_checked_first() {
        // Also short on points and stock; the quota is still what gets reported.
        let p = product(1000, 0, 5, 5);
        assert_eq!(
            check_exchange_allowed(&p, 3, 0),
            Err(ExchangeViolation::MonthlyLimitReached)
        );
    }

    #[test]
    fn test_quantity_checked_before_balance() {
        let p = product(1000, 0, 5, 3);
        assert_eq!(
            check_exchange_allowed(&p, 3, 0),
            Err(ExchangeViolation::QuantityExceedsLimit { remaining: 2 })
        );
    }

    #[test]
    fn test_balance_checked_before_stock() {
        let p = product(30, 1, 5, 0);
        assert_eq!(
            check_exchange_allowed(&p, 3, 50),
            Err(ExchangeViolation::InsufficientPoints {
                required: 90,
                available: 50
            })
        );
    }

    #[test]
    fn test_stock_checked_last() {
        let p = product(30, 2, 5, 0);
        assert_eq!(
            check_exchange_allowed(&p, 3, 1000),
            Err(ExchangeViolation::InsufficientStock { stock: 2 })
        );
    }

    #[test]
    fn test_quantity_bounds() {
        let p = product(30, 10, 5, 2);
        assert!(check_quantity(&p, 1).is_ok());
        assert!(check_quantity(&p, 3).is_ok());
        assert_eq!(
            check_quantity(&p, 0),
            Err(ExchangeViolation::InvalidQuantity { requested: 0, max: 3 })
        );
        assert_eq!(
            check_quantity(&p, 4),
            Err(ExchangeViolation::InvalidQuantity { requested: 4, max: 3 })
        );
    }
}
