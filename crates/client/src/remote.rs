//! Remote Store Client.
//!
//! Thin REST client for the store API's cart and wishlist documents. All
//! calls share a fixed timeout (expiry aborts the in-flight request and
//! surfaces as `RequestTimeout`), attach the bearer credential when a
//! session token is supplied, and map non-2xx responses to a typed
//! failure carrying the server's `message` field when the body parses.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use saltmarsh_core::{Cart, CartItem, ProductId, WishlistItem};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::session::SessionToken;

/// REST client for the store API.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    /// Create a new store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SyncError::transport)?;

        let base_url = config.api_base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    // =========================================================================
    // Cart endpoints
    // =========================================================================

    /// Fetch the authoritative cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: Option<&SessionToken>) -> Result<Cart, SyncError> {
        let req = self.client.get(format!("{}/cart", self.base_url));
        let response = self.dispatch(req, token).await?;
        response.json().await.map_err(SyncError::transport)
    }

    /// Add a line to the cart. The server decides merge semantics for an
    /// existing product and returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token, line), fields(product_id = %line.product_id))]
    pub async fn add_to_cart(
        &self,
        token: Option<&SessionToken>,
        line: &CartItem,
    ) -> Result<Cart, SyncError> {
        let req = self
            .client
            .post(format!("{}/cart/add", self.base_url))
            .json(line);
        let response = self.dispatch(req, token).await?;
        response.json().await.map_err(SyncError::transport)
    }

    /// Rewrite the quantity of a cart line, returning the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        token: Option<&SessionToken>,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, SyncError> {
        let req = self
            .client
            .put(format!("{}/cart/update/{product_id}", self.base_url))
            .json(&json!({ "quantity": quantity }));
        let response = self.dispatch(req, token).await?;
        response.json().await.map_err(SyncError::transport)
    }

    /// Remove a line from the cart, returning the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: Option<&SessionToken>,
        product_id: &ProductId,
    ) -> Result<Cart, SyncError> {
        let req = self
            .client
            .delete(format!("{}/cart/remove/{product_id}", self.base_url));
        let response = self.dispatch(req, token).await?;
        response.json().await.map_err(SyncError::transport)
    }

    /// Clear the cart, returning the (empty) cart document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: Option<&SessionToken>) -> Result<Cart, SyncError> {
        let req = self.client.delete(format!("{}/cart/clear", self.base_url));
        let response = self.dispatch(req, token).await?;
        response.json().await.map_err(SyncError::transport)
    }

    // =========================================================================
    // Wishlist endpoints
    // =========================================================================

    /// Fetch the server-side wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token))]
    pub async fn get_wishlist(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<Vec<WishlistItem>, SyncError> {
        let req = self.client.get(format!("{}/wishlist", self.base_url));
        let response = self.dispatch(req, token).await?;
        let envelope: WishlistEnvelope = response.json().await.map_err(SyncError::transport)?;
        Ok(envelope.items)
    }

    /// Save a denormalized item to the server-side wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token, item), fields(product_id = %item.product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: Option<&SessionToken>,
        item: &WishlistItem,
    ) -> Result<(), SyncError> {
        let req = self
            .client
            .post(format!("{}/wishlist/{}", self.base_url, item.product_id))
            .json(item);
        self.dispatch(req, token).await?;
        Ok(())
    }

    /// Remove an item from the server-side wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: Option<&SessionToken>,
        product_id: &ProductId,
    ) -> Result<(), SyncError> {
        let req = self
            .client
            .delete(format!("{}/wishlist/{product_id}", self.base_url));
        self.dispatch(req, token).await?;
        Ok(())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Send a request, attaching the bearer credential when present, and
    /// map non-2xx responses to a typed failure.
    async fn dispatch(
        &self,
        mut req: reqwest::RequestBuilder,
        token: Option<&SessionToken>,
    ) -> Result<reqwest::Response, SyncError> {
        if let Some(token) = token {
            req = req.bearer_auth(token.expose());
        }

        let response = req.send().await.map_err(SyncError::transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteFailure {
                status: status.as_u16(),
                message: failure_message(status, &body),
            });
        }

        Ok(response)
    }
}

/// Wrapper for the wishlist list response.
#[derive(Debug, Deserialize)]
struct WishlistEnvelope {
    #[serde(default)]
    items: Vec<WishlistItem>,
}

/// The server-supplied `message` when the error body parses, else a
/// generic HTTP-status-derived message.
fn failure_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
    }

    serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}
