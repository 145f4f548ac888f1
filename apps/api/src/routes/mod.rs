//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Route                              Auth     Handler                    │
//! │  ─────────────────────────────────  ───────  ─────────────────────────  │
//! │  GET    /health                     none     health::health             │
//! │  POST   /api/users/register         none     users::register            │
//! │  POST   /api/auth/login             none     auth::login                │
//! │  GET    /api/cart                   bearer   cart::get_cart             │
//! │  POST   /api/cart/add               bearer   cart::add_item             │
//! │  DELETE /api/cart/remove/{id}       bearer   cart::remove_item          │
//! │  POST   /api/orders                 bearer   orders::place_order        │
//! │  GET    /api/orders                 bearer   orders::list_orders        │
//! │  GET    /api/orders/{id}            bearer   orders::get_order          │
//! │  GET    /api/products               bearer   products::list_products    │
//! │  POST   /api/products               admin    products::create_product   │
//! │  GET    /api/products/{id}          bearer   products::get_product      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/users/register", post(users::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/add", post(cart::add_item))
        .route("/api/cart/remove/{product_id}", delete(cart::remove_item))
        .route(
            "/api/orders",
            post(orders::place_order).get(orders::list_orders),
        )
        .route("/api/orders/{order_id}", get(orders::get_order))
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/products/{product_id}", get(products::get_product))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
