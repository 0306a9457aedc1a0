use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    Invitation, Membership, MembershipSummary, NewInvitation, NewOrganization, NewProblem, Organization,
    Problem,
};

/// Errors surfaced by a `Store` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A failed statement, with the database's own code/details/hint when it reported them
    #[error("{message}")]
    Database {
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn database(message: impl Into<String>, code: Option<&str>) -> Self {
        StoreError::Database {
            message: message.into(),
            code: code.map(str::to_string),
            details: None,
            hint: None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                let (details, hint) = match db.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
                    Some(pg) => (pg.detail().map(str::to_string), pg.hint().map(str::to_string)),
                    None => (None, None),
                };
                StoreError::Database {
                    message: db.message().to_string(),
                    code: db.code().map(|c| c.into_owned()),
                    details,
                    hint,
                }
            }
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            _ => StoreError::Database {
                message: err.to_string(),
                code: None,
                details: None,
                hint: None,
            },
        }
    }
}

/// Postgres unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// The relational store holding organizations, memberships, invitations and problems.
///
/// Composite operations (`create_organization_with_admin`, `create_problem`,
/// `accept_invitation`) are atomic: either every row is written or none is.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>, StoreError>;

    /// Insert the organization and its creator's admin membership.
    async fn create_organization_with_admin(
        &self,
        new: NewOrganization,
    ) -> Result<(Organization, Membership), StoreError>;

    async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, StoreError>;

    async fn list_memberships_for_user(&self, user_id: Uuid) -> Result<Vec<MembershipSummary>, StoreError>;

    async fn create_invitation(&self, new: NewInvitation) -> Result<Invitation, StoreError>;

    /// Flip a pending invitation to accepted and insert the membership it grants.
    /// `NotFound` if the invitation does not exist, `Conflict` if it is not pending
    /// or the user already belongs to the organization.
    async fn accept_invitation(
        &self,
        id: Uuid,
        user_id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<Membership, StoreError>;

    /// Newest first
    async fn list_invitations(&self, organization_id: Uuid) -> Result<Vec<Invitation>, StoreError>;

    async fn list_pending_invitations_for_email(&self, email: &str) -> Result<Vec<Invitation>, StoreError>;

    /// Insert the problem and, for choice problems, its options with positions by index.
    async fn create_problem(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        problem: &NewProblem,
    ) -> Result<Problem, StoreError>;

    /// Newest first
    async fn list_problems(&self, organization_id: Uuid) -> Result<Vec<Problem>, StoreError>;
}
