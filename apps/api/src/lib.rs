//! # Emporium API
//!
//! HTTP/JSON server for the Emporium shop: accounts, catalog, carts, orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Layers                                      │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  users / auth  │  │  cart / orders │  │  products                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • get / add    │  │ • list / get               ││
//! │  │ • login        │  │ • remove       │  │ • create (admin)           ││
//! │  │                │  │ • checkout     │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │          │                   │                        │                 │
//! │          ▼                   ▼                        ▼                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  extract: CurrentUser / AdminUser (JWT)   error: ApiError        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                   emporium-db (SQLite)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables use the `EMPORIUM_`
//! prefix, e.g. `EMPORIUM_SECURITY__JWT_SECRET`, `EMPORIUM_SERVER__PORT`.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
