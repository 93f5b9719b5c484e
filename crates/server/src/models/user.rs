//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use bramble_core::Username;

/// A registered account (domain type).
///
/// The password hash is deliberately not part of this type; it only surfaces
/// through [`crate::db::UserStore::find_with_password_hash`] during login.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique account identifier, assigned at registration.
    pub username: Username,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
