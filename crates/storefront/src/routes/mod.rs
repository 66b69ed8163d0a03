//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Menu page
//! GET  /menu/sections          - Menu sections fragment (polled by the page)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (categories loaded)
//!
//! # Cart
//! GET  /cart                   - Cart page with delivery form
//! POST /cart/add               - Add a product (redirects back to the menu)
//! POST /cart/promo             - Add a featured promotion
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Half & half
//! GET  /half-half              - Flavor picker
//! GET  /half-half/preview      - Price preview (fragment)
//! POST /half-half              - Compose and add
//!
//! # Order
//! POST /order                  - Submit, 303 to the WhatsApp chat (rate limited)
//! ```

pub mod cart;
pub mod half_half;
pub mod menu;
pub mod order;

use std::path::Path;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    create_session_layer, order_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/promo", post(cart::add_promotion))
        .route("/count", get(cart::count))
}

/// Create the half & half routes router.
pub fn half_half_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(half_half::show).post(half_half::add))
        .route("/preview", get(half_half::preview))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(order::submit))
        .route_layer(order_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Menu
        .route("/", get(menu::index))
        .route("/menu/sections", get(menu::sections))
        // Health
        .route("/health", get(menu::health))
        .route("/health/ready", get(menu::readiness))
        // Cart routes
        .nest("/cart", cart_routes())
        // Half & half composer
        .nest("/half-half", half_half_routes())
        // Order submission
        .nest("/order", order_routes())
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let secure = state.config().cookie_secure;
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(security_headers_middleware))
        .layer(create_session_layer(secure))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
