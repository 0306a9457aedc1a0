use crate::database::models::Membership;
use crate::error::ApiError;
use crate::types::Role;

/// Grant access when the caller holds a membership whose role is at least `min_role`.
pub fn require_role(membership: Option<&Membership>, min_role: Role) -> Result<&Membership, ApiError> {
    match membership {
        Some(m) if m.role >= min_role => Ok(m),
        Some(m) => {
            tracing::warn!(
                "Access denied: user {} has role '{}', '{}' required",
                m.user_id,
                m.role,
                min_role
            );
            Err(ApiError::forbidden("You do not have permission to perform this action"))
        }
        None => Err(ApiError::forbidden("You are not a member of this organization")),
    }
}
