//! Shared application state.

use std::sync::Arc;

use emporium_db::Database;

use crate::auth::JwtManager;
use crate::config::SecurityConfig;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, security: &SecurityConfig) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtManager::from_config(security)),
        }
    }
}
