//! Canonical product reference and input normalization.
//!
//! External catalog payloads are not consistent about field naming: the
//! product key may arrive as `productId`, `id`, or `_id`, and numeric ids
//! arrive as JSON numbers. [`ProductRef::from_json`] resolves that
//! ambiguity exactly once, at the boundary; everything past it works with
//! the canonical type.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::cart::CartItem;
use super::id::ProductId;
use super::wishlist::{Rating, WishlistItem};

/// Errors from normalizing an external product payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductRefError {
    /// None of the accepted id spellings were present.
    #[error("product payload has no id (expected productId, id, or _id)")]
    MissingId,

    /// A required field was absent or the wrong JSON type.
    #[error("product payload missing field: {0}")]
    MissingField(&'static str),

    /// The price was not a non-negative number.
    #[error("product payload has invalid price")]
    InvalidPrice,
}

/// Canonical, normalized product input.
///
/// Built once from whatever shape the caller holds; the controller never
/// inspects raw payloads itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub product_id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductRef {
    /// Normalize an external product payload.
    ///
    /// Accepts the id under `productId`, `id`, or `_id` (string or
    /// number), requires `title` and a non-negative `price`, and carries
    /// `image`, `rating`, and `category` through when present.
    ///
    /// # Errors
    ///
    /// Returns [`ProductRefError`] when the id, title, or price is
    /// missing or malformed.
    pub fn from_json(payload: &Value) -> Result<Self, ProductRefError> {
        let product_id = extract_id(payload).ok_or(ProductRefError::MissingId)?;

        let title = payload
            .get("title")
            .and_then(Value::as_str)
            .ok_or(ProductRefError::MissingField("title"))?
            .to_owned();

        let price = extract_price(payload.get("price")).ok_or(ProductRefError::InvalidPrice)?;
        if price < Decimal::ZERO {
            return Err(ProductRefError::InvalidPrice);
        }

        let image = payload
            .get("image")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let category = payload
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let rating = payload
            .get("rating")
            .and_then(|r| serde_json::from_value(r.clone()).ok());

        Ok(Self {
            product_id,
            title,
            price,
            image,
            rating,
            category,
        })
    }

    /// Build the cart line for this product at the given quantity.
    #[must_use]
    pub fn cart_item(&self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.product_id.clone(),
            title: self.title.clone(),
            price: self.price,
            image: self.image.clone(),
            quantity,
        }
    }

    /// Build the denormalized wishlist snapshot for this product.
    #[must_use]
    pub fn wishlist_item(&self) -> WishlistItem {
        WishlistItem {
            product_id: self.product_id.clone(),
            title: self.title.clone(),
            image: self.image.clone(),
            price: self.price,
            rating: self.rating,
            category: self.category.clone(),
        }
    }
}

/// Pull the product id from any of the accepted spellings.
fn extract_id(payload: &Value) -> Option<ProductId> {
    ["productId", "id", "_id"]
        .iter()
        .find_map(|key| payload.get(*key))
        .and_then(|v| match v {
            Value::String(s) => Some(ProductId::new(s.clone())),
            Value::Number(n) => Some(ProductId::new(n.to_string())),
            _ => None,
        })
}

/// Parse a price that may arrive as a JSON number or numeric string.
fn extract_price(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
