//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public
//! GET  /                - Home page
//! GET  /health          - Liveness check
//! GET  /health/ready    - Readiness check (pings the product store)
//! GET  /login           - Login page
//! POST /login           - Login action
//! GET  /register        - Registration page
//! POST /register        - Registration action
//! GET  /logout          - Logout action
//!
//! # Products (require auth)
//! GET  /products        - Product listing
//! POST /products        - Create product
//! POST /updateProducts  - Upsert product by body productID
//! POST /deleteProducts  - Delete first product matching body productID
//! GET  /featuredItem    - Featured product listing
//! GET  /addItem         - Create form page
//! GET  /updateItem      - Update form page
//! GET  /deleteItem      - Delete form page
//! GET  /lessItem        - Price filter form page
//! POST /lessItem        - Products with price below body value
//! GET  /greaterItem     - Rating filter form page
//! POST /greaterItem     - Products with rating above body value
//!
//! # Fallback
//! *    any unmatched    - Redirect to /products (pages) / 404 (json)
//! ```
//!
//! The auth guard is applied to the protected sub-router in exactly one
//! place, [`protected_routes`]; there is no per-handler gating to drift.

pub mod auth;
pub mod home;
pub mod products;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the public routes router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .route("/health/ready", get(home::readiness))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
}

/// Create the protected routes router.
///
/// Every route here sits behind [`require_auth`].
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list_all).post(products::create))
        .route("/updateProducts", post(products::update))
        .route("/deleteProducts", post(products::delete))
        .route("/featuredItem", get(products::list_featured))
        .route("/addItem", get(products::add_item_page))
        .route("/updateItem", get(products::update_item_page))
        .route("/deleteItem", get(products::delete_item_page))
        .route(
            "/lessItem",
            get(products::less_item_page).post(products::filter_price_below),
        )
        .route(
            "/greaterItem",
            get(products::greater_item_page).post(products::filter_rating_above),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Create the full application router.
///
/// Session and tracing layers are added by the caller so tests can wire in
/// their own session store.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .fallback(home::fallback)
        .with_state(state)
}
