use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::issue;
use crate::error::{ApiError, FieldErrors};
use crate::types::Role;

/// Body of `POST /api/tenants/{tenant}/invitations`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    pub role: Role,
}

/// Body of `POST /api/invitations/accept`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[serde(rename = "inviteId", default)]
    #[validate(custom(function = "validate_uuid"))]
    pub invite_id: String,
}

impl AcceptInvitationRequest {
    pub fn invite_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(self.invite_id.trim()).map_err(|_| {
            let mut fields = FieldErrors::new();
            fields.insert("inviteId".to_string(), vec!["Invalid invitation id".to_string()]);
            ApiError::validation_error("Please check the submitted fields", fields)
        })
    }
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    match Uuid::parse_str(value.trim()) {
        Ok(_) => Ok(()),
        Err(_) => Err(issue("uuid", "Invalid invitation id")),
    }
}
