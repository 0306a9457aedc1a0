// handlers/public/auth/signup.rs - POST /api/auth/signup

use axum::{extract::State, response::Response};

use super::success_with_cookies;
use crate::auth::{session::session_cookie_headers, AuthError};
use crate::error::{ApiError, FieldErrors};
use crate::state::AppState;
use crate::validation::{Credentials, ValidatedJson};

/// POST /api/auth/signup - register an account
///
/// Same body as login. When the auth service signs the new user in right away
/// the session cookies are set; with email confirmation enabled they are not.
/// Any refusal from the auth service is a 400 with its message.
pub async fn signup_post(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> Result<Response, ApiError> {
    let session = match state.auth.sign_up(&credentials.email, &credentials.password).await {
        Ok(session) => session,
        Err(AuthError::Rejected(message)) | Err(AuthError::InvalidCredentials(message)) => {
            return Err(ApiError::validation_error(message, FieldErrors::new()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Registered {}", credentials.email);
    let cookies = session
        .map(|s| session_cookie_headers(&s, &state.config.auth))
        .unwrap_or_default();
    Ok(success_with_cookies(cookies))
}
