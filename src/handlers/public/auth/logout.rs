// handlers/public/auth/logout.rs - POST /api/auth/logout

use axum::{extract::State, response::Response};

use super::success_with_cookies;
use crate::auth::{session::clear_cookie_headers, SessionCookies};
use crate::state::AppState;

/// POST /api/auth/logout - end the session
///
/// Always succeeds: the auth service is told best-effort and the cookies are cleared.
pub async fn logout_post(State(state): State<AppState>, session: SessionCookies) -> Response {
    if let Some(token) = session.access_token.as_deref() {
        if let Err(e) = state.auth.sign_out(token).await {
            tracing::warn!("Sign-out at the auth service failed: {}", e);
        }
    }
    success_with_cookies(clear_cookie_headers(&state.config.auth))
}
