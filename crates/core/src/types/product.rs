//! Normalized product snapshot.
//!
//! The remote catalog returns loosely shaped payloads (localized titles,
//! image arrays, optional prices). [`Product`] is the flat, denormalized
//! form the rest of the client works with; normalization from the wire
//! shape happens at the API boundary, not here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Display name used when a product reference cannot be resolved.
///
/// Matches the storefront's customer-facing language.
pub const UNRESOLVED_PRODUCT_NAME: &str = "منتج بدون اسم";

/// A denormalized product snapshot resolved at fetch time.
///
/// Not kept in sync with the catalog after resolution; callers that need
/// fresh data re-fetch by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
}

impl Product {
    /// Create a new product snapshot.
    #[must_use]
    pub const fn new(id: ProductId, name: String, price: Decimal, image: String) -> Self {
        Self {
            id,
            name,
            price,
            image,
        }
    }

    /// Placeholder snapshot for an order whose product no longer resolves.
    ///
    /// Zero price and empty image keep totals and rendering well-defined
    /// while preserving the order's presence in the cart.
    #[must_use]
    pub fn unresolved(id: ProductId) -> Self {
        Self {
            id,
            name: UNRESOLVED_PRODUCT_NAME.to_string(),
            price: Decimal::ZERO,
            image: String::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_has_zero_price_and_empty_image() {
        let product = Product::unresolved(ProductId::new("p1"));
        assert_eq!(product.name, UNRESOLVED_PRODUCT_NAME);
        assert_eq!(product.price, Decimal::ZERO);
        assert!(product.image.is_empty());
    }

    #[test]
    fn price_round_trips_as_json_number() {
        let product = Product::new(
            ProductId::new("p1"),
            "Dates".to_string(),
            Decimal::new(1050, 2),
            "https://cdn.example/p1.jpg".to_string(),
        );

        let json = serde_json::to_value(&product).unwrap();
        assert!(json["price"].is_number());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }
}
