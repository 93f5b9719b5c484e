//! Domain models.

pub mod session;
pub mod user;

pub use session::{CurrentUser, session_keys};
pub use user::User;
