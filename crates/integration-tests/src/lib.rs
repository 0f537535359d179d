//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - HTTP client behavior against the storefront API
//! - `cart_flow` - Cart store end to end with file persistence
//! - `cart_concurrency` - Concurrent mutations through the real client
//!
//! Tests run against [`FakeStorefront`], an in-process `axum` server that
//! serves `/products/{id}` and `/stock/{id}` the way the storefront API does.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_storefront::config::StorefrontApiConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Seconds advertised in `Retry-After` when stock reads are rate limited.
pub const RETRY_AFTER_SECS: u64 = 7;

/// In-process stand-in for the storefront API.
///
/// The server stops when this value is dropped.
pub struct FakeStorefront {
    base_url: String,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct FakeState {
    products: Mutex<HashMap<i32, Value>>,
    stock: Mutex<HashMap<i32, u32>>,
    product_hits: AtomicUsize,
    stock_hits: AtomicUsize,
    /// Non-zero forces every stock read to answer with this status.
    stock_status: AtomicU16,
    malformed_stock: AtomicBool,
    required_token: Option<String>,
}

impl FakeStorefront {
    /// Start a server accepting any request.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        Self::start(FakeState::default()).await
    }

    /// Start a server that rejects requests without `Authorization: Bearer {token}`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn_with_token(token: &str) -> Self {
        Self::start(FakeState {
            required_token: Some(token.to_string()),
            ..FakeState::default()
        })
        .await
    }

    async fn start(state: FakeState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake storefront");
        let addr = listener.local_addr().expect("fake storefront address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not parse.
    #[must_use]
    pub fn api_config(&self) -> StorefrontApiConfig {
        StorefrontApiConfig::for_base_url(&self.base_url).expect("valid fake storefront URL")
    }

    /// Register a product with `stock` units available.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: u32) {
        lock(&self.state.products).insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
            }),
        );
        self.set_stock(id, stock);
    }

    /// Change the units available for `id`.
    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.state.stock).insert(id, amount);
    }

    /// Answer every stock read with `status`; `None` restores normal replies.
    pub fn fail_stock_with(&self, status: Option<u16>) {
        self.state
            .stock_status
            .store(status.unwrap_or(0), Ordering::SeqCst);
    }

    /// Answer stock reads with a body that is not JSON.
    pub fn malform_stock(&self, malformed: bool) {
        self.state.malformed_stock.store(malformed, Ordering::SeqCst);
    }

    /// Number of `/products/{id}` requests received.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `/stock/{id}` requests received.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeStorefront {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    state.required_token.as_ref().is_none_or(|token| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == format!("Bearer {token}"))
    })
}

async fn get_product(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let product = lock(&state.products).get(&id).cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn get_stock(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match state.stock_status.load(Ordering::SeqCst) {
        0 => {}
        429 => {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, RETRY_AFTER_SECS.to_string())],
            )
                .into_response();
        }
        status => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, "stock service unavailable").into_response();
        }
    }

    if state.malformed_stock.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    let amount = lock(&state.stock).get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}
