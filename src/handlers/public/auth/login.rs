// handlers/public/auth/login.rs - POST /api/auth/login

use axum::{extract::State, response::Response};

use super::success_with_cookies;
use crate::auth::session::session_cookie_headers;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{Credentials, ValidatedJson};

/// POST /api/auth/login - password sign-in
///
/// Expected Input:
/// ```json
/// { "email": "instructor@example.com", "password": "at least 8 chars" }
/// ```
///
/// Responds `{"success": true}` and sets the session cookies. Bad credentials
/// are a 401 carrying the auth service's message.
pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> Result<Response, ApiError> {
    let session = state
        .auth
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
        .map_err(|e| {
            tracing::info!("Sign-in failed for {}: {}", credentials.email, e);
            e
        })?;

    tracing::info!("User {} signed in", credentials.email);
    Ok(success_with_cookies(session_cookie_headers(&session, &state.config.auth)))
}
