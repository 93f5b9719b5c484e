//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use bramble_core::Username;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// cookie only carries the opaque session id; credentials never outlive the
/// initial verification step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The logged-in account's username.
    pub username: Username,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
