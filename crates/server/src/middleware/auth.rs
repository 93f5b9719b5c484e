//! Authentication middleware.
//!
//! [`require_auth`] is the single gate in front of every protected route. It
//! is applied once, to the protected sub-router, so no individual handler
//! carries (or can forget) its own auth annotation.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::config::ResponseMode;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Error returned when a protected route is hit without a valid session.
pub enum AuthRejection {
    /// Redirect to the login page (page-serving mode).
    RedirectToLogin,
    /// 401 with a structured body (JSON mode).
    Unauthorized,
    /// Session or store failure while resolving the user.
    Internal,
}

impl AuthRejection {
    /// Mode-shaped unauthenticated rejection.
    #[must_use]
    pub const fn unauthenticated(mode: ResponseMode) -> Self {
        match mode {
            ResponseMode::Pages => Self::RedirectToLogin,
            ResponseMode::Json => Self::Unauthorized,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Gate a request on an authenticated session.
///
/// Reads [`CurrentUser`] from the session, re-resolves the account against
/// the user store (a vanished account invalidates its sessions), and attaches
/// the resolved [`crate::models::User`] to request extensions for handlers.
///
/// # Errors
///
/// Returns a mode-shaped [`AuthRejection`] when no valid session identity
/// exists, or `AuthRejection::Internal` on session/store failure.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let mode = state.config().response_mode;

    let current: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to read session");
            AuthRejection::Internal
        })?
        .ok_or(AuthRejection::unauthenticated(mode))?;

    let user = state
        .users()
        .find_by_username(&current.username)
        .await
        .map_err(|e| {
            sentry::capture_error(&e);
            tracing::error!(error = %e, "User lookup failed during auth");
            AuthRejection::Internal
        })?;

    let Some(user) = user else {
        // Stale session for a deleted account
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to flush stale session");
        }
        return Err(AuthRejection::unauthenticated(mode));
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Helper to set the current user in the session after login/registration.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}
