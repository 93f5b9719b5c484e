//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::{ProductStore, UserStore};
use crate::services::validate::ProductValidator;

/// Application state shared across all handlers.
///
/// Explicitly constructed at startup and passed down; nothing in the server
/// reads process-global state. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
    validator: Arc<dyn ProductValidator>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `users` - Credential store backend
    /// * `products` - Product store backend
    /// * `validator` - Pre-persistence product validation rules
    #[must_use]
    pub fn new(
        config: ServerConfig,
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        validator: Arc<dyn ProductValidator>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                products,
                validator,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get a reference to the product store.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }

    /// Get a reference to the product validator.
    #[must_use]
    pub fn validator(&self) -> &dyn ProductValidator {
        self.inner.validator.as_ref()
    }
}
