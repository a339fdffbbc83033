//! Synchronization Controller.
//!
//! Owns the in-memory cart/wishlist state for one session and serializes
//! every mutation through its operations. Cart mutations are two-phase:
//! a tentative optimistic apply against a captured snapshot, then
//! confirm-or-rollback when the durable call settles. The wishlist routes
//! to the server for authenticated sessions and to the device store for
//! guests.
//!
//! The controller is an explicitly owned container: one instance per
//! active session, dependencies injected, no global state.

use std::sync::Arc;

use tracing::{instrument, warn};

use saltmarsh_core::{Cart, CartSummary, ProductId, ProductRef, WishlistItem};

use crate::config::SyncConfig;
use crate::device::DeviceStore;
use crate::error::SyncError;
use crate::notify::{Notifier, Severity};
use crate::pending::{ActionKey, PendingActions};
use crate::remote::RemoteStore;
use crate::session::SessionToken;

const LOGIN_REQUIRED: &str = "Please login to add items to cart";

/// Outcome of [`SyncController::toggle_wishlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistToggle {
    Added,
    Removed,
}

/// Single-writer state container for cart and wishlist synchronization.
pub struct SyncController {
    remote: RemoteStore,
    device: DeviceStore,
    notifier: Arc<dyn Notifier>,
    session: Option<SessionToken>,
    cart: Option<Cart>,
    wishlist: Vec<WishlistItem>,
    pending: PendingActions,
    last_error: Option<String>,
}

impl SyncController {
    /// Create a controller over injected stores and notification sink.
    #[must_use]
    pub fn new(remote: RemoteStore, device: DeviceStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            remote,
            device,
            notifier,
            session: None,
            cart: None,
            wishlist: Vec::new(),
            pending: PendingActions::default(),
            last_error: None,
        }
    }

    /// Build the controller and its stores from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &SyncConfig, notifier: Arc<dyn Notifier>) -> Result<Self, SyncError> {
        let remote = RemoteStore::new(config)?;
        let device = DeviceStore::new(config.wishlist_path.clone());
        let mut controller = Self::new(remote, device, notifier);
        controller.session = config.session_token.clone();
        Ok(controller)
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Begin an authenticated session.
    pub fn start_session(&mut self, token: SessionToken) {
        self.session = Some(token);
    }

    /// End the session, dropping cart state (the wishlist falls back to
    /// the device snapshot on the next fetch).
    pub fn end_session(&mut self) {
        self.session = None;
        self.cart = None;
        self.wishlist.clear();
    }

    /// Whether an authenticated session is active.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Replace in-memory cart state with the authoritative server cart.
    ///
    /// Without a session this is a no-op that clears the cart to `None`.
    /// On failure the error is recorded and re-raised; in-memory state is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&mut self) -> Result<Option<Cart>, SyncError> {
        let Some(token) = self.session.clone() else {
            self.cart = None;
            return Ok(None);
        };

        self.last_error = None;
        match self.remote.get_cart(Some(&token)).await {
            Ok(cart) => {
                self.cart = Some(cart.clone());
                Ok(Some(cart))
            }
            Err(err) => {
                self.last_error = Some(err.user_message("Failed to fetch cart"));
                Err(err)
            }
        }
    }

    /// Add a product to the cart.
    ///
    /// Optimistically merges the line into the in-memory cart (creating
    /// it lazily on first add), then issues the durable add. On success
    /// the server's returned cart replaces the optimistic one — the
    /// server is the source of truth for merge semantics. On failure the
    /// pre-mutation snapshot is restored. A quantity of zero is treated
    /// as one.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or the underlying
    /// failure after rollback.
    #[instrument(skip(self, product), fields(product_id = %product.product_id, quantity))]
    pub async fn add_to_cart(
        &mut self,
        product: &ProductRef,
        quantity: u32,
    ) -> Result<Cart, SyncError> {
        let Some(token) = self.session.clone() else {
            self.last_error = Some(LOGIN_REQUIRED.to_string());
            self.notifier.notify(LOGIN_REQUIRED, Severity::Warning);
            return Err(SyncError::NotAuthenticated);
        };

        let line = product.cart_item(quantity.max(1));
        let key = ActionKey::Add(product.product_id.clone());
        self.pending.begin(key.clone());
        self.last_error = None;

        let snapshot = self.cart.clone();
        let mut optimistic = snapshot.clone().unwrap_or_else(Cart::empty);
        optimistic.merge_or_insert(line.clone());
        self.cart = Some(optimistic);

        let result = self.remote.add_to_cart(Some(&token), &line).await;
        self.pending.finish(&key);

        match result {
            Ok(cart) => {
                self.cart = Some(cart.clone());
                Ok(cart)
            }
            Err(err) => {
                self.cart = snapshot;
                Err(self.mutation_failed("Failed to add item to cart", err))
            }
        }
    }

    /// Rewrite the quantity of a cart line.
    ///
    /// Snapshots the prior cart, optimistically applies the new quantity,
    /// then issues the durable update. On failure the exact prior
    /// snapshot is restored — item list and totals byte-for-byte.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a zero quantity (removal is its own
    /// operation), `NotAuthenticated` without a session, or the
    /// underlying failure after rollback.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, SyncError> {
        if quantity == 0 {
            let err = SyncError::InvalidQuantity(quantity);
            return Err(self.mutation_failed("Failed to update quantity", err));
        }
        let Some(token) = self.session.clone() else {
            return Err(SyncError::NotAuthenticated);
        };

        let key = ActionKey::Update(product_id.clone());
        self.pending.begin(key.clone());
        self.last_error = None;

        let snapshot = self.cart.clone();
        if let Some(cart) = self.cart.as_mut() {
            cart.set_quantity(product_id, quantity);
        }

        let result = self.remote.update_quantity(Some(&token), product_id, quantity).await;
        self.pending.finish(&key);

        match result {
            Ok(cart) => {
                self.cart = Some(cart.clone());
                Ok(cart)
            }
            Err(err) => {
                self.cart = snapshot;
                Err(self.mutation_failed("Failed to update quantity", err))
            }
        }
    }

    /// Remove a line from the cart.
    ///
    /// Optimistically drops the line (totals lose exactly that line's
    /// contribution), then issues the durable remove; the prior snapshot
    /// is restored on failure.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or the underlying
    /// failure after rollback.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<Cart, SyncError> {
        let Some(token) = self.session.clone() else {
            return Err(SyncError::NotAuthenticated);
        };

        let key = ActionKey::Remove(product_id.clone());
        self.pending.begin(key.clone());
        self.last_error = None;

        let snapshot = self.cart.clone();
        if let Some(cart) = self.cart.as_mut() {
            cart.remove(product_id);
        }

        let result = self.remote.remove_from_cart(Some(&token), product_id).await;
        self.pending.finish(&key);

        match result {
            Ok(cart) => {
                self.cart = Some(cart.clone());
                Ok(cart)
            }
            Err(err) => {
                self.cart = snapshot;
                Err(self.mutation_failed("Failed to remove item", err))
            }
        }
    }

    /// Clear the cart.
    ///
    /// Optimistically empties the in-memory cart, then issues the durable
    /// clear; the prior snapshot is restored on failure.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or the underlying
    /// failure after rollback.
    #[instrument(skip(self))]
    pub async fn clear_cart(&mut self) -> Result<Cart, SyncError> {
        let Some(token) = self.session.clone() else {
            return Err(SyncError::NotAuthenticated);
        };

        self.pending.begin(ActionKey::Clear);
        self.last_error = None;

        let snapshot = self.cart.clone();
        let mut emptied = snapshot.clone().unwrap_or_else(Cart::empty);
        emptied.clear_items();
        self.cart = Some(emptied);

        let result = self.remote.clear_cart(Some(&token)).await;
        self.pending.finish(&ActionKey::Clear);

        match result {
            Ok(cart) => {
                self.cart = Some(cart.clone());
                Ok(cart)
            }
            Err(err) => {
                self.cart = snapshot;
                Err(self.mutation_failed("Failed to clear cart", err))
            }
        }
    }

    // =========================================================================
    // Wishlist operations
    // =========================================================================

    /// Re-read the wishlist from its backing store.
    ///
    /// Authenticated sessions read the server; a server failure falls
    /// back to the device snapshot rather than erroring. Guests read the
    /// device snapshot directly.
    #[instrument(skip(self))]
    pub async fn fetch_wishlist(&mut self) -> &[WishlistItem] {
        let items = match self.session.clone() {
            Some(token) => match self.remote.get_wishlist(Some(&token)).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(error = %err, "wishlist fetch failed, falling back to device snapshot");
                    self.device.read()
                }
            },
            None => self.device.read(),
        };
        self.wishlist = items;
        &self.wishlist
    }

    /// Re-read after an externally observed change (another tab wrote the
    /// device slot, or the view regained focus). Consistency across
    /// writers is best-effort pull, not a push channel.
    pub async fn refresh_wishlist(&mut self) -> &[WishlistItem] {
        self.fetch_wishlist().await
    }

    /// Save a product to the wishlist. Idempotent: a product that is
    /// already saved is left alone, never duplicated.
    ///
    /// Guests commit through a read-modify-write of the device slot; the
    /// new list is finalized in memory before the single overwrite, so a
    /// failure never leaves a partially-updated snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the durable add fails.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add_to_wishlist(&mut self, product: &ProductRef) -> Result<(), SyncError> {
        let item = product.wishlist_item();

        match self.session.clone() {
            Some(token) => {
                if self.contains_wishlist(&item.product_id) {
                    return Ok(());
                }
                if let Err(err) = self.remote.add_to_wishlist(Some(&token), &item).await {
                    return Err(self.mutation_failed("Failed to add to wishlist", err));
                }
                self.wishlist.push(item);
            }
            None => {
                let mut items = self.device.read();
                if items.iter().any(|i| i.product_id == item.product_id) {
                    self.wishlist = items;
                    return Ok(());
                }
                items.push(item);
                if let Err(err) = self.device.write(&items) {
                    return Err(self.mutation_failed("Failed to add to wishlist", err));
                }
                self.wishlist = items;
            }
        }
        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error when the durable remove fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(&mut self, product_id: &ProductId) -> Result<(), SyncError> {
        match self.session.clone() {
            Some(token) => {
                if let Err(err) = self.remote.remove_from_wishlist(Some(&token), product_id).await {
                    return Err(self.mutation_failed("Failed to remove from wishlist", err));
                }
                self.wishlist.retain(|i| &i.product_id != product_id);
            }
            None => {
                let mut items = self.device.read();
                items.retain(|i| &i.product_id != product_id);
                if let Err(err) = self.device.write(&items) {
                    return Err(self.mutation_failed("Failed to remove from wishlist", err));
                }
                self.wishlist = items;
            }
        }
        Ok(())
    }

    /// Toggle wishlist membership for a product.
    ///
    /// Membership is decided by product ID against the current backing
    /// store (device snapshot for guests), then delegated to the add or
    /// remove path.
    ///
    /// # Errors
    ///
    /// Returns an error when the durable mutation fails.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn toggle_wishlist(&mut self, product: &ProductRef) -> Result<WishlistToggle, SyncError> {
        let present = if self.session.is_some() {
            self.contains_wishlist(&product.product_id)
        } else {
            self.device
                .read()
                .iter()
                .any(|i| i.product_id == product.product_id)
        };

        if present {
            self.remove_from_wishlist(&product.product_id).await?;
            Ok(WishlistToggle::Removed)
        } else {
            self.add_to_wishlist(product).await?;
            Ok(WishlistToggle::Added)
        }
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// The current in-memory cart, if a session has one.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// The current in-memory wishlist.
    #[must_use]
    pub fn wishlist(&self) -> &[WishlistItem] {
        &self.wishlist
    }

    /// Derived cart display values, computed fresh on every call.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        CartSummary::of(self.cart.as_ref())
    }

    /// Whether the given action key is in flight.
    #[must_use]
    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.pending.is_pending(key)
    }

    /// The message of the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Forget the recorded failure message.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn contains_wishlist(&self, product_id: &ProductId) -> bool {
        self.wishlist.iter().any(|i| &i.product_id == product_id)
    }

    /// Record a failed mutation and notify; returns the error for the
    /// caller to propagate.
    fn mutation_failed(&mut self, fallback: &str, err: SyncError) -> SyncError {
        let message = err.user_message(fallback);
        self.last_error = Some(message.clone());
        self.notifier.notify(&message, Severity::Error);
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    /// Notifier that records every message for assertions.
    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(String, Severity)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, severity: Severity) {
            self.messages
                .lock()
                .unwrap()
                .push((message.to_string(), severity));
        }
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<(String, Severity)> {
            self.messages.lock().unwrap().clone()
        }
    }

    fn product(id: &str, title: &str, price: Decimal) -> ProductRef {
        ProductRef::from_json(&json!({
            "id": id,
            "title": title,
            "price": price.to_string().parse::<f64>().unwrap(),
        }))
        .unwrap()
    }

    fn guest_controller(dir: &tempfile::TempDir) -> (SyncController, Arc<RecordingNotifier>) {
        let config = SyncConfig::new(
            // Unroutable; guest paths never touch the network.
            "http://127.0.0.1:9/api".parse().unwrap(),
            dir.path().join("wishlist_items_v1.json"),
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = SyncController::from_config(&config, notifier.clone()).unwrap();
        (controller, notifier)
    }

    #[tokio::test]
    async fn test_guest_add_to_cart_requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, notifier) = guest_controller(&dir);

        let mug = product("7", "Mug", dec!(9.99));
        let err = controller.add_to_cart(&mug, 1).await.unwrap_err();

        assert!(matches!(err, SyncError::NotAuthenticated));
        assert!(controller.cart().is_none());
        assert_eq!(controller.last_error(), Some(LOGIN_REQUIRED));
        assert!(!controller.is_pending(&ActionKey::Add(ProductId::new("7"))));
        assert_eq!(
            notifier.messages(),
            vec![(LOGIN_REQUIRED.to_string(), Severity::Warning)]
        );
    }

    #[tokio::test]
    async fn test_guest_fetch_cart_clears_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _) = guest_controller(&dir);

        assert!(controller.fetch_cart().await.unwrap().is_none());
        assert!(controller.cart().is_none());
    }

    #[tokio::test]
    async fn test_update_quantity_zero_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, notifier) = guest_controller(&dir);

        let err = controller
            .update_quantity(&ProductId::new("p1"), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::InvalidQuantity(0)));
        assert_eq!(controller.last_error(), Some("Failed to update quantity"));
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_wishlist_add_twice_stays_unique() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _) = guest_controller(&dir);

        let mug = product("7", "Mug", dec!(9.99));
        controller.add_to_wishlist(&mug).await.unwrap();
        controller.add_to_wishlist(&mug).await.unwrap();

        let device = DeviceStore::new(dir.path().join("wishlist_items_v1.json"));
        let stored = device.read();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].product_id, ProductId::new("7"));
        assert_eq!(controller.wishlist().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_toggle_adds_then_removes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _) = guest_controller(&dir);

        let mug = product("7", "Mug", dec!(9.99));
        assert_eq!(
            controller.toggle_wishlist(&mug).await.unwrap(),
            WishlistToggle::Added
        );
        assert_eq!(
            controller.toggle_wishlist(&mug).await.unwrap(),
            WishlistToggle::Removed
        );

        let device = DeviceStore::new(dir.path().join("wishlist_items_v1.json"));
        assert!(device.read().is_empty());
        assert!(controller.wishlist().is_empty());
    }

    #[tokio::test]
    async fn test_guest_wishlist_fetch_reads_device_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _) = guest_controller(&dir);

        let mug = product("7", "Mug", dec!(9.99));
        controller.add_to_wishlist(&mug).await.unwrap();

        // A second controller over the same slot sees the write.
        let (mut other, _) = guest_controller(&dir);
        let items = other.refresh_wishlist().await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_guest_toggle_sees_other_tab_writes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _) = guest_controller(&dir);

        // Another writer saved the product after our last fetch.
        let mug = product("7", "Mug", dec!(9.99));
        let device = DeviceStore::new(dir.path().join("wishlist_items_v1.json"));
        device.write(&[mug.wishlist_item()]).unwrap();

        // Membership is decided against the snapshot, not stale memory.
        assert_eq!(
            controller.toggle_wishlist(&mug).await.unwrap(),
            WishlistToggle::Removed
        );
    }

    #[test]
    fn test_cart_summary_of_absent_cart() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _) = guest_controller(&dir);

        let summary = controller.cart_summary();
        assert!(summary.is_empty);
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_end_session_drops_cart_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _) = guest_controller(&dir);

        controller.start_session(SessionToken::new("tok"));
        assert!(controller.has_session());

        controller.end_session();
        assert!(!controller.has_session());
        assert!(controller.cart().is_none());
        assert!(controller.wishlist().is_empty());
    }
}
