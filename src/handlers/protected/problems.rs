use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::auth::{require_user, SessionCookies};
use crate::database::models::Problem;
use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::services::{load_admin_context, problem_service};
use crate::state::AppState;
use crate::validation::{ProblemPayload, ValidatedJson};

/// POST /api/tenants/:tenant/problems (also /:tenant/admin/problems)
///
/// Expected Input:
/// ```json
/// {
///   "title": "Capitals",
///   "prompt": "Capital of France?",
///   "type": "single_choice",
///   "options": [
///     { "label": "Paris", "isCorrect": true },
///     { "label": "Lyon" }
///   ],
///   "explanation": "Paris has been the capital since 987."
/// }
/// ```
///
/// Text problems send `textAnswer` and no options. Responds `{"id": "<problem uuid>"}`.
pub async fn problem_post(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    session: SessionCookies,
    ValidatedJson(payload): ValidatedJson<ProblemPayload>,
) -> Result<Json<Value>, ApiError> {
    let problem = payload.into_problem()?;
    let user = require_user(state.auth.as_ref(), &session).await?;
    let ctx = load_admin_context(state.store.as_ref(), &tenant, &user).await?;

    let created = problem_service::create(state.store.as_ref(), &ctx, &user, &problem).await?;
    Ok(Json(json!({ "id": created.id })))
}

/// GET /api/tenants/:tenant/problems (also /:tenant/admin/problems) - newest first
pub async fn problem_list(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    session: SessionCookies,
) -> ApiResult<Vec<Problem>> {
    let user = require_user(state.auth.as_ref(), &session).await?;
    let ctx = load_admin_context(state.store.as_ref(), &tenant, &user).await?;
    let problems = problem_service::list_for_tenant(state.store.as_ref(), &ctx).await?;
    Ok(ApiResponse::success(problems))
}
