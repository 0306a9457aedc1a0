use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::{require_user, SessionCookies};
use crate::error::ApiError;
use crate::services::resolve_post_login_redirect;
use crate::state::AppState;

/// POST /api/auth/post-login - where to go after signing in
///
/// ```json
/// { "redirectTo": "/acme/admin/problems/new" }
/// ```
///
/// Without a session the answer is a 401 that still names a destination:
/// `{"redirectTo": "/login"}`.
pub async fn post_login(State(state): State<AppState>, session: SessionCookies) -> Result<Response, ApiError> {
    let user = match require_user(state.auth.as_ref(), &session).await {
        Ok(user) => user,
        Err(ApiError::Unauthorized(_)) => {
            return Ok((StatusCode::UNAUTHORIZED, Json(json!({ "redirectTo": "/login" }))).into_response());
        }
        Err(e) => return Err(e),
    };

    let memberships = state.store.list_memberships_for_user(user.id).await?;
    let redirect_to = resolve_post_login_redirect(&memberships);
    tracing::debug!("User {} redirected to {}", user.id, redirect_to);

    Ok(Json(json!({ "redirectTo": redirect_to })).into_response())
}
