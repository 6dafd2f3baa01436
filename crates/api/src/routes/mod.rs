//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                       - Banner with the ice-cream count
//! GET    /health                 - Liveness
//! GET    /health/ready           - Readiness (store ping)
//! GET    /static/*               - Mirrored product images
//!
//! # Ice creams
//! GET    /api/icecream/          - List ice creams
//! POST   /api/icecream/          - Create ice cream (201)
//! GET    /api/icecream/{id}      - Show ice cream
//! PUT    /api/icecream/{id}      - Merge supplied fields (PATCH also accepted)
//! DELETE /api/icecream/{id}      - Delete ice cream (204)
//!
//! # Users
//! POST   /api/user/new           - Register (201)
//! POST   /api/user/login         - Check Basic credentials, return token
//!
//! # Orders (HTTP Basic)
//! POST   /api/order/new          - Place order (201)
//! GET    /api/order/my           - List own orders
//! ```
//!
//! Collection paths answer with and without the trailing slash.

pub mod health;
pub mod home;
pub mod ice_creams;
pub mod orders;
pub mod users;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the ice-cream routes router.
pub fn ice_cream_routes() -> Router<AppState> {
    let collection = || get(ice_creams::index).post(ice_creams::create);

    Router::new()
        .route("/api/icecream", collection())
        .route("/api/icecream/", collection())
        .route(
            "/api/icecream/{id}",
            get(ice_creams::show)
                .put(ice_creams::update)
                .patch(ice_creams::update)
                .delete(ice_creams::destroy),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/new", post(users::create))
        .route("/api/user/login", post(users::login))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/order/new", post(orders::create))
        .route("/api/order/my", get(orders::mine))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(ice_cream_routes())
        .merge(user_routes())
        .merge(order_routes())
}

/// The complete application: routes, static files, request ids and
/// per-request trace spans.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config().statics.root);

    routes()
        .nest_service("/static", static_files)
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
        .with_state(state)
}
