use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::auth::{require_user, SessionCookies};
use crate::database::models::Invitation;
use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::services::{invitation_service, load_admin_context};
use crate::state::AppState;
use crate::validation::{AcceptInvitationRequest, CreateInvitationRequest, ValidatedJson};

/// POST /api/tenants/:tenant/invitations (also /:tenant/admin/invitations)
///
/// Expected Input:
/// ```json
/// { "email": "student@example.com", "role": "student" }
/// ```
///
/// `role` defaults to `student`. Responds `{"id": "<invitation uuid>"}`.
pub async fn invitation_post(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    session: SessionCookies,
    ValidatedJson(request): ValidatedJson<CreateInvitationRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = require_user(state.auth.as_ref(), &session).await?;
    let ctx = load_admin_context(state.store.as_ref(), &tenant, &user).await?;
    let invitation = invitation_service::create(state.store.as_ref(), &ctx, &user, request).await?;
    Ok(Json(json!({ "id": invitation.id })))
}

/// GET /api/tenants/:tenant/invitations (also /:tenant/admin/invitations)
pub async fn invitation_list(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    session: SessionCookies,
) -> ApiResult<Vec<Invitation>> {
    let user = require_user(state.auth.as_ref(), &session).await?;
    let ctx = load_admin_context(state.store.as_ref(), &tenant, &user).await?;
    let invitations = invitation_service::list_for_tenant(state.store.as_ref(), &ctx).await?;
    Ok(ApiResponse::success(invitations))
}

/// GET /api/invitations - pending invitations addressed to the caller
pub async fn pending_list(State(state): State<AppState>, session: SessionCookies) -> ApiResult<Vec<Invitation>> {
    let user = require_user(state.auth.as_ref(), &session).await?;
    let invitations = invitation_service::list_pending_for_user(state.store.as_ref(), &user).await?;
    Ok(ApiResponse::success(invitations))
}

/// POST /api/invitations/accept
///
/// ```json
/// { "inviteId": "6b1f0f9e-..." }
/// ```
///
/// 404 for an unknown invitation, 400 when it was already accepted or revoked.
pub async fn accept_post(
    State(state): State<AppState>,
    session: SessionCookies,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> Result<Json<Value>, ApiError> {
    let invite_id = request.invite_id()?;
    let user = require_user(state.auth.as_ref(), &session).await?;
    invitation_service::accept(state.store.as_ref(), &user, invite_id).await?;
    Ok(Json(json!({ "success": true })))
}
