use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::{require_user, SessionCookies};
use crate::error::ApiError;
use crate::services::tenant_service;
use crate::state::AppState;
use crate::validation::{CreateTenantRequest, ValidatedJson};

/// POST /api/tenants - create a tenant owned by the caller
///
/// Expected Input:
/// ```json
/// { "name": "Acme Academy", "slug": "acme" }
/// ```
///
/// Expected Output:
/// ```json
/// { "slug": "acme" }
/// ```
///
/// A taken slug is reported as a storage error carrying the store's
/// `code`/`details`/`hint`.
pub async fn tenant_post(
    State(state): State<AppState>,
    session: SessionCookies,
    ValidatedJson(request): ValidatedJson<CreateTenantRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = require_user(state.auth.as_ref(), &session).await?;
    let organization = tenant_service::create_tenant(state.store.as_ref(), &user, request).await?;
    Ok(Json(json!({ "slug": organization.slug })))
}
