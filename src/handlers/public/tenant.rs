use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::load_organization;
use crate::state::AppState;

/// GET /:tenant - tenant home
///
/// ```json
/// { "tenant": "acme", "name": "Acme Academy" }
/// ```
pub async fn tenant_get(State(state): State<AppState>, Path(tenant): Path<String>) -> Result<Json<Value>, ApiError> {
    let organization = load_organization(state.store.as_ref(), &tenant).await?;
    Ok(Json(json!({
        "tenant": organization.slug,
        "name": organization.name,
    })))
}
