//! Integration test support for Saltmarsh.
//!
//! Provides an in-process axum stub of the store REST API the engine
//! consumes, plus a recording notification sink. Tests spawn the stub on
//! an ephemeral port, point a [`saltmarsh_client::SyncController`] at it,
//! and drive real HTTP through the full client stack.
//!
//! The stub implements the consumed contract:
//! `GET /cart`, `POST /cart/add`, `PUT /cart/update/{id}`,
//! `DELETE /cart/remove/{id}`, `DELETE /cart/clear`, `GET /wishlist`,
//! `POST /wishlist/{id}`, `DELETE /wishlist/{id}` — JSON both ways,
//! bearer auth, error bodies with an optional `message` field.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;

use saltmarsh_client::{Notifier, Severity};
use saltmarsh_core::{Cart, CartItem, ProductId, WishlistItem};

/// Bearer token the stub accepts.
pub const AUTH_TOKEN: &str = "test-token";

type Shared = Arc<Mutex<StoreState>>;

/// Mutable server-side state behind the stub.
struct StoreState {
    cart: Cart,
    wishlist: Vec<WishlistItem>,
    /// One-shot forced failure: status plus an optional JSON `message`
    /// (None produces an unparseable plain-text body).
    fail_next: Option<(u16, Option<String>)>,
    /// Artificial latency applied to every request while set.
    delay: Option<Duration>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            cart: Cart::empty(),
            wishlist: Vec::new(),
            fail_next: None,
            delay: None,
        }
    }
}

/// Handle to a running stub store server.
pub struct StubServer {
    addr: SocketAddr,
    state: Shared,
}

impl StubServer {
    /// Bind an ephemeral port and serve the stub in a background task.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StoreState::new()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self { addr, state }
    }

    /// Base URL for client configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Force the next request to fail with the given status. A `message`
    /// of `None` produces a body the client cannot parse.
    pub fn fail_next(&self, status: u16, message: Option<&str>) {
        self.state.lock().expect("state lock").fail_next =
            Some((status, message.map(str::to_owned)));
    }

    /// Delay every request by the given duration until cleared.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().expect("state lock").delay = Some(delay);
    }

    /// Server-side cart truth, for assertions.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.lock().expect("state lock").cart.clone()
    }

    /// Server-side wishlist truth, for assertions.
    #[must_use]
    pub fn wishlist(&self) -> Vec<WishlistItem> {
        self.state.lock().expect("state lock").wishlist.clone()
    }
}

/// Notifier that records every message for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    /// Snapshot of the messages delivered so far.
    #[must_use]
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .expect("notifier lock")
            .push((message.to_string(), severity));
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update/{product_id}", put(update_quantity))
        .route("/cart/remove/{product_id}", delete(remove_from_cart))
        .route("/cart/clear", delete(clear_cart))
        .route("/wishlist", get(get_wishlist))
        .route("/wishlist/{product_id}", post(add_to_wishlist).delete(remove_from_wishlist))
        .with_state(state)
}

async fn get_cart(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let state = store.lock().expect("state lock");
    Json(state.cart.clone()).into_response()
}

async fn add_to_cart(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(line): Json<CartItem>,
) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let mut state = store.lock().expect("state lock");
    state.cart.merge_or_insert(line);
    Json(state.cart.clone()).into_response()
}

async fn update_quantity(
    State(store): State<Shared>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let quantity = body
        .get("quantity")
        .and_then(serde_json::Value::as_u64)
        .and_then(|q| u32::try_from(q).ok());
    let Some(quantity) = quantity else {
        return failure(StatusCode::BAD_REQUEST, Some("Invalid quantity"));
    };

    let mut state = store.lock().expect("state lock");
    if !state.cart.set_quantity(&ProductId::new(product_id), quantity) {
        return failure(StatusCode::NOT_FOUND, Some("Item not in cart"));
    }
    Json(state.cart.clone()).into_response()
}

async fn remove_from_cart(
    State(store): State<Shared>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let mut state = store.lock().expect("state lock");
    if state.cart.remove(&ProductId::new(product_id)).is_none() {
        return failure(StatusCode::NOT_FOUND, Some("Item not in cart"));
    }
    Json(state.cart.clone()).into_response()
}

async fn clear_cart(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let mut state = store.lock().expect("state lock");
    state.cart.clear_items();
    Json(state.cart.clone()).into_response()
}

async fn get_wishlist(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let state = store.lock().expect("state lock");
    Json(json!({ "items": state.wishlist })).into_response()
}

async fn add_to_wishlist(
    State(store): State<Shared>,
    Path(_product_id): Path<String>,
    headers: HeaderMap,
    Json(item): Json<WishlistItem>,
) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let mut state = store.lock().expect("state lock");
    if !state.wishlist.iter().any(|i| i.product_id == item.product_id) {
        state.wishlist.push(item);
    }
    Json(json!({ "message": "added" })).into_response()
}

async fn remove_from_wishlist(
    State(store): State<Shared>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = gate(&store, &headers).await {
        return resp;
    }
    let mut state = store.lock().expect("state lock");
    let id = ProductId::new(product_id);
    state.wishlist.retain(|i| i.product_id != id);
    Json(json!({ "message": "removed" })).into_response()
}

// =============================================================================
// Request gating
// =============================================================================

/// Apply artificial latency, one-shot failures, and bearer auth.
async fn gate(store: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let delay = store.lock().expect("state lock").delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = store.lock().expect("state lock");
    if let Some((status, message)) = state.fail_next.take() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err(failure(status, message.as_deref()));
    }

    let expected = format!("Bearer {AUTH_TOKEN}");
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return Err(failure(StatusCode::UNAUTHORIZED, Some("Not authorized")));
    }

    Ok(())
}

/// Build an error response; no message yields an unparseable text body.
fn failure(status: StatusCode, message: Option<&str>) -> Response {
    message.map_or_else(
        || (status, "upstream exploded").into_response(),
        |message| (status, Json(json!({ "message": message }))).into_response(),
    )
}
