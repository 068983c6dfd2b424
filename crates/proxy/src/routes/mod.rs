//! HTTP route handlers for the proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Demo product list
//! GET  /cart                   - Demo buyer/submit page
//! GET  /health                 - Liveness check
//! GET  /static/*               - Demo assets
//!
//! # Cart API (JSON)
//! POST /api/create-cart        - Create a cart with one item, make it active
//! POST /api/add-cart-items     - Add one item to the active cart
//! POST /api/update-buyer       - Set buyer identity on the active cart
//! POST /api/submit-cart        - Submit the active cart
//! ```

pub mod api;
pub mod pages;

use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Demo assets shipped with this crate.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the cart API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/create-cart", post(api::create_cart))
        .route("/add-cart-items", post(api::add_cart_items))
        .route("/update-buyer", post(api::update_buyer))
        .route("/submit-cart", post(api::submit_cart))
}

/// Build the complete application router.
///
/// Sentry layers are not applied here; the binary adds them outermost.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .merge(pages::router())
        .nest_service("/static", ServeDir::new(Path::new(STATIC_DIR)))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not contact Rye.
async fn health() -> &'static str {
    "ok"
}
