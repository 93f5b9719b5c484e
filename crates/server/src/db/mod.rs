//! Persistence layer: store traits and their backends.
//!
//! # Tables
//!
//! - `users` - Account credentials (username + Argon2 hash)
//! - `products` - Schemaless product documents (`JSONB`)
//! - `tower_sessions` - Session storage (created by the session store's own
//!   migration)
//!
//! # Backends
//!
//! Handlers only see the [`UserStore`] / [`ProductStore`] traits. Production
//! wires in the `PostgreSQL` repositories from [`users`] and [`products`];
//! tests use the in-memory implementations from [`memory`].
//!
//! Every backend call is bounded: repositories wrap their queries in
//! [`bounded`], so a hung database surfaces as [`RepositoryError::Timeout`]
//! instead of a request that never completes.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bramble-cli -- migrate
//! ```

pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bramble_core::{ProductDoc, Username};

pub use memory::{MemoryProductStore, MemoryUserStore};
pub use products::ProductRepository;
pub use users::UserRepository;

use crate::models::user::User;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The call did not complete within the configured bound.
    #[error("store call exceeded {}s limit", .0.as_secs())]
    Timeout(Duration),
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// An existing document with the same `productID` was replaced.
    Replaced,
    /// No document matched; a new one was inserted.
    Inserted,
}

/// Store of user credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, RepositoryError>;

    /// Look up a user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn find_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is already taken.
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;
}

/// Store of product documents.
///
/// Documents are schemaless; `productID` is not unique, and the "first
/// match" operations resolve ties by insertion order.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn insert(&self, doc: ProductDoc) -> Result<(), RepositoryError>;

    /// Every document, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn find_all(&self) -> Result<Vec<ProductDoc>, RepositoryError>;

    /// Documents with `featured == true`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn find_featured(&self) -> Result<Vec<ProductDoc>, RepositoryError>;

    /// Documents whose numeric `price` is strictly below the threshold.
    ///
    /// Documents without a numeric `price` never match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn find_price_below(&self, threshold: f64) -> Result<Vec<ProductDoc>, RepositoryError>;

    /// Documents whose numeric `rating` is strictly above the threshold.
    ///
    /// Documents without a numeric `rating` never match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn find_rating_above(&self, threshold: f64) -> Result<Vec<ProductDoc>, RepositoryError>;

    /// Replace the first document whose `productID` matches, or insert the
    /// document if none does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn upsert_by_product_id(
        &self,
        product_id: &str,
        doc: ProductDoc,
    ) -> Result<UpsertOutcome, RepositoryError>;

    /// Delete the first document whose `productID` matches.
    ///
    /// Returns `false` (not an error) when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn delete_by_product_id(&self, product_id: &str) -> Result<bool, RepositoryError>;

    /// Cheap backend connectivity check for readiness probes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend is unreachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run a store operation under a time bound.
///
/// A call that outlives the bound is abandoned and reported as
/// [`RepositoryError::Timeout`].
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: impl Future<Output = Result<T, RepositoryError>>,
) -> Result<T, RepositoryError> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Timeout(limit)),
    }
}
