//! HTTP middleware.

pub mod auth;
pub mod session;

pub use auth::{AuthRejection, require_auth, set_current_user};
pub use session::create_session_layer;
