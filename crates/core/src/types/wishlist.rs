//! Wishlist snapshot types.
//!
//! A wishlist entry is a denormalized snapshot of catalog data taken at
//! save time, not a live reference: the title, image, price, rating, and
//! category are whatever the catalog said when the user saved the item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Catalog rating snapshot (`rate` out of 5, `count` reviews).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

/// A saved wishlist entry, unique per `product_id` within one wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_wire_format_roundtrip() {
        let json = r#"{
            "productId": "7",
            "title": "Mug",
            "image": "https://cdn.example.com/mug.jpg",
            "price": 9.99,
            "rating": {"rate": 4.5, "count": 120},
            "category": "kitchen"
        }"#;

        let item: WishlistItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.product_id, ProductId::new("7"));
        assert_eq!(item.price, dec!(9.99));
        assert_eq!(item.rating.unwrap().count, 120);

        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["productId"], "7");
        assert_eq!(out["category"], "kitchen");
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let json = r#"{"productId": "3", "title": "Hat", "price": 12.0}"#;
        let item: WishlistItem = serde_json::from_str(json).unwrap();
        assert!(item.image.is_none());
        assert!(item.rating.is_none());
        assert!(item.category.is_none());
    }
}
