//! Authentication route handlers.
//!
//! Handles registration, login, and logout. Page mode answers with the
//! original flow's redirects (duplicate register goes to `/login`, an unknown
//! login goes to `/register`, a wrong password back to `/login`); JSON mode
//! answers with status codes and structured bodies.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::config::ResponseMode;
use crate::error::AppError;
use crate::filters;
use crate::middleware::set_current_user;
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login and registration form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate { error: query.error }
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let mode = state.config().response_mode;
    let auth = AuthService::new(state.users());

    let user = match auth.register(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::UserAlreadyExists) if mode == ResponseMode::Pages => {
            // An existing account means the visitor wanted to log in
            return Ok(Redirect::to("/login?error=account_exists").into_response());
        }
        Err(AuthError::InvalidUsername(_)) if mode == ResponseMode::Pages => {
            return Ok(Redirect::to("/register?error=invalid_username").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    establish_session(&session, &CurrentUser { username: user.username.clone() }).await?;
    tracing::info!(username = %user.username, "User registered");

    Ok(match mode {
        ResponseMode::Pages => Redirect::to("/products").into_response(),
        ResponseMode::Json => (
            StatusCode::CREATED,
            Json(json!({ "status": "registered", "username": user.username })),
        )
            .into_response(),
    })
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let mode = state.config().response_mode;
    let auth = AuthService::new(state.users());

    let user = match auth.login(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::UnknownUser) if mode == ResponseMode::Pages => {
            return Ok(Redirect::to("/register?error=unknown_user").into_response());
        }
        Err(AuthError::InvalidCredentials) if mode == ResponseMode::Pages => {
            return Ok(Redirect::to("/login?error=wrong_password").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    establish_session(&session, &CurrentUser { username: user.username.clone() }).await?;
    tracing::info!(username = %user.username, "User logged in");

    Ok(match mode {
        ResponseMode::Pages => Redirect::to("/products").into_response(),
        ResponseMode::Json => (
            StatusCode::CREATED,
            Json(json!({ "status": "logged in", "username": user.username })),
        )
            .into_response(),
    })
}

/// Handle logout.
///
/// Flushes the whole session: the server-side record is deleted and the
/// cookie is removed from the client.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    session.flush().await?;

    Ok(match state.config().response_mode {
        ResponseMode::Pages => Redirect::to("/").into_response(),
        ResponseMode::Json => Json(json!({ "status": "logged out" })).into_response(),
    })
}

/// Store the authenticated identity, cycling the session id.
async fn establish_session(session: &Session, user: &CurrentUser) -> Result<(), AppError> {
    // Fresh session id on privilege change
    session.cycle_id().await?;
    set_current_user(session, user).await?;
    Ok(())
}
