//! Cart document types.
//!
//! Mirrors the store API's cart document: a list of items plus derived
//! totals. The totals are pure functions of the items; every in-place
//! mutation goes through [`Cart::recompute`] so they can never drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};

/// A single line in a cart.
///
/// `product_id` is unique within one cart; adding an existing product
/// merges quantities rather than appending a duplicate line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    /// Unit price. The store API encodes prices as JSON numbers.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Price contribution of this line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cart document keyed by its owning user.
///
/// Invariant: `total_items == sum(item.quantity)` and
/// `total_price == sum(item.price * item.quantity)` for all reachable
/// values. Server responses are trusted as-is; local mutations restore
/// the invariant via [`Cart::recompute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl Cart {
    /// An empty cart with zero totals.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find an item by product ID.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// True when the cart contains the product.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Recompute `total_items` and `total_price` from the item list.
    pub fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|i| i.quantity).sum();
        self.total_price = self.items.iter().map(CartItem::line_total).sum();
    }

    /// Check the totals invariant without mutating.
    #[must_use]
    pub fn totals_consistent(&self) -> bool {
        let items: u32 = self.items.iter().map(|i| i.quantity).sum();
        let price: Decimal = self.items.iter().map(CartItem::line_total).sum();
        self.total_items == items && self.total_price == price
    }

    /// Merge an item into the cart: increment quantity for an existing
    /// product, append a new line otherwise. Totals are recomputed.
    pub fn merge_or_insert(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
        self.recompute();
    }

    /// Rewrite the quantity of an existing line. Returns `false` when the
    /// product is not in the cart. Totals are recomputed.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
        else {
            return false;
        };
        item.quantity = quantity;
        self.recompute();
        true
    }

    /// Remove a line by product ID, returning it. Totals are recomputed.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<CartItem> {
        let idx = self.items.iter().position(|i| &i.product_id == product_id)?;
        let removed = self.items.remove(idx);
        self.recompute();
        Some(removed)
    }

    /// Drop every item and zero the totals.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.recompute();
    }
}

/// Derived cart display values.
///
/// Always computed from the current cart, never cached; an absent cart
/// (guest session) reads as empty with zero totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Decimal,
    pub is_empty: bool,
}

impl CartSummary {
    /// Summarize an optional cart.
    #[must_use]
    pub fn of(cart: Option<&Cart>) -> Self {
        cart.map_or(
            Self {
                item_count: 0,
                subtotal: Decimal::ZERO,
                is_empty: true,
            },
            |c| Self {
                item_count: c.total_items,
                subtotal: c.total_price,
                is_empty: c.is_empty(),
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn item(id: &str, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            image: None,
            quantity,
        }
    }

    #[test]
    fn test_merge_or_insert_appends_new_product() {
        let mut cart = Cart::empty();
        cart.merge_or_insert(item("p1", dec!(10.00), 1));
        cart.merge_or_insert(item("p2", dec!(5.00), 2));

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, dec!(20.00));
        assert!(cart.totals_consistent());
    }

    #[test]
    fn test_merge_or_insert_increments_existing_product() {
        let mut cart = Cart::empty();
        cart.merge_or_insert(item("p1", dec!(9.99), 1));
        cart.merge_or_insert(item("p1", dec!(9.99), 2));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.get(&ProductId::new("p1")).unwrap().quantity, 3);
        assert_eq!(cart.total_price, dec!(29.97));
        assert!(cart.totals_consistent());
    }

    #[test]
    fn test_set_quantity_recomputes_totals() {
        let mut cart = Cart::empty();
        cart.merge_or_insert(item("p1", dec!(10.00), 1));

        assert!(cart.set_quantity(&ProductId::new("p1"), 3));
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, dec!(30.00));

        assert!(!cart.set_quantity(&ProductId::new("missing"), 1));
    }

    #[test]
    fn test_remove_decrements_by_line_contribution() {
        let mut cart = Cart::empty();
        cart.merge_or_insert(item("p1", dec!(10.00), 2));
        cart.merge_or_insert(item("p2", dec!(3.50), 1));

        let removed = cart.remove(&ProductId::new("p1")).unwrap();
        assert_eq!(removed.line_total(), dec!(20.00));
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.total_price, dec!(3.50));
        assert!(cart.totals_consistent());

        assert!(cart.remove(&ProductId::new("p1")).is_none());
    }

    #[test]
    fn test_clear_items_zeroes_totals() {
        let mut cart = Cart::empty();
        cart.merge_or_insert(item("p1", dec!(1.25), 4));
        cart.clear_items();

        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_wire_format_camel_case_numeric_prices() {
        let json = r#"{
            "userId": "u1",
            "items": [
                {"productId": "7", "title": "Mug", "price": 9.99, "quantity": 2}
            ],
            "totalItems": 2,
            "totalPrice": 19.98
        }"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.owner, Some(UserId::new("u1")));
        assert_eq!(cart.items[0].product_id, ProductId::new("7"));
        assert_eq!(cart.items[0].price, dec!(9.99));
        assert!(cart.totals_consistent());

        let out = serde_json::to_value(&cart).unwrap();
        assert_eq!(out["items"][0]["productId"], "7");
        assert_eq!(out["totalItems"], 2);
    }

    #[test]
    fn test_summary_of_absent_cart_is_empty() {
        let summary = CartSummary::of(None);
        assert!(summary.is_empty);
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_summary_reflects_totals() {
        let mut cart = Cart::empty();
        cart.merge_or_insert(item("p1", dec!(5.00), 2));

        let summary = CartSummary::of(Some(&cart));
        assert!(!summary.is_empty);
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.subtotal, dec!(10.00));
    }
}
