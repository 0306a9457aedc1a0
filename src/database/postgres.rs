use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::models::{
    Invitation, Membership, MembershipSummary, NewInvitation, NewOrganization, NewProblem, Organization,
    Problem,
};
use super::store::{Store, StoreError};
use crate::types::{InvitationStatus, Role};

const ORGANIZATION_COLUMNS: &str = "id, name, slug, created_by, created_at";
const MEMBERSHIP_COLUMNS: &str = "id, organization_id, user_id, role, created_at";
const INVITATION_COLUMNS: &str =
    "id, organization_id, email, role, token, status, created_by, created_at, accepted_at, accepted_by";
const PROBLEM_COLUMNS: &str =
    "id, organization_id, title, prompt, type, answer_text, explanation, created_by, created_at, updated_at";

/// `Store` backed by Postgres through sqlx
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>, StoreError> {
        let sql = format!("SELECT {} FROM organizations WHERE slug = $1", ORGANIZATION_COLUMNS);
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(organization)
    }

    async fn create_organization_with_admin(
        &self,
        new: NewOrganization,
    ) -> Result<(Organization, Membership), StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO organizations (name, slug, created_by) VALUES ($1, $2, $3) RETURNING {}",
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(&new.name)
            .bind(&new.slug)
            .bind(new.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, $3) RETURNING {}",
            MEMBERSHIP_COLUMNS
        );
        let membership = sqlx::query_as::<_, Membership>(&sql)
            .bind(organization.id)
            .bind(new.created_by)
            .bind(Role::Admin)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Created organization '{}' ({})", organization.slug, organization.id);
        Ok((organization, membership))
    }

    async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        let sql = format!(
            "SELECT {} FROM organization_members WHERE organization_id = $1 AND user_id = $2",
            MEMBERSHIP_COLUMNS
        );
        let membership = sqlx::query_as::<_, Membership>(&sql)
            .bind(organization_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(membership)
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> Result<Vec<MembershipSummary>, StoreError> {
        let rows = sqlx::query_as::<_, MembershipSummary>(
            r#"
            SELECT m.role, o.slug AS organization_slug
            FROM organization_members m
            LEFT JOIN organizations o ON o.id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_invitation(&self, new: NewInvitation) -> Result<Invitation, StoreError> {
        let sql = format!(
            "INSERT INTO organization_invitations (organization_id, email, role, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            INVITATION_COLUMNS
        );
        let invitation = sqlx::query_as::<_, Invitation>(&sql)
            .bind(new.organization_id)
            .bind(&new.email)
            .bind(new.role)
            .bind(new.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(invitation)
    }

    async fn accept_invitation(
        &self,
        id: Uuid,
        user_id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<Membership, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent accepts of the same invitation
        let sql = format!(
            "SELECT {} FROM organization_invitations WHERE id = $1 FOR UPDATE",
            INVITATION_COLUMNS
        );
        let invitation = sqlx::query_as::<_, Invitation>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Invitation {} not found", id)))?;

        if !invitation.is_pending() {
            return Err(StoreError::Conflict(format!("Invitation is {}", invitation.status)));
        }

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(invitation.organization_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(StoreError::Conflict("User is already a member of this organization".to_string()));
        }

        sqlx::query(
            "UPDATE organization_invitations SET status = $2, accepted_at = $3, accepted_by = $4 WHERE id = $1",
        )
        .bind(invitation.id)
        .bind(InvitationStatus::Accepted)
        .bind(accepted_at)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, $3) RETURNING {}",
            MEMBERSHIP_COLUMNS
        );
        let membership = sqlx::query_as::<_, Membership>(&sql)
            .bind(invitation.organization_id)
            .bind(user_id)
            .bind(invitation.role)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Invitation {} accepted by {}", invitation.id, user_id);
        Ok(membership)
    }

    async fn list_invitations(&self, organization_id: Uuid) -> Result<Vec<Invitation>, StoreError> {
        let sql = format!(
            "SELECT {} FROM organization_invitations WHERE organization_id = $1 ORDER BY created_at DESC",
            INVITATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Invitation>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_pending_invitations_for_email(&self, email: &str) -> Result<Vec<Invitation>, StoreError> {
        let sql = format!(
            "SELECT {} FROM organization_invitations \
             WHERE lower(email) = lower($1) AND status = $2 ORDER BY created_at DESC",
            INVITATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Invitation>(&sql)
            .bind(email)
            .bind(InvitationStatus::Pending)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_problem(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        problem: &NewProblem,
    ) -> Result<Problem, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO problems (organization_id, title, prompt, type, answer_text, explanation, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PROBLEM_COLUMNS
        );
        let created = sqlx::query_as::<_, Problem>(&sql)
            .bind(organization_id)
            .bind(&problem.title)
            .bind(&problem.prompt)
            .bind(problem.problem_type())
            .bind(problem.answer_text())
            .bind(problem.explanation.as_deref())
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        for (position, option) in problem.options().iter().enumerate() {
            sqlx::query(
                "INSERT INTO problem_options (organization_id, problem_id, label, position, is_correct) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(organization_id)
            .bind(created.id)
            .bind(&option.label)
            .bind(position as i32)
            .bind(option.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            "Created {} problem {} with {} option(s)",
            created.problem_type,
            created.id,
            problem.options().len()
        );
        Ok(created)
    }

    async fn list_problems(&self, organization_id: Uuid) -> Result<Vec<Problem>, StoreError> {
        let sql = format!(
            "SELECT {} FROM problems WHERE organization_id = $1 ORDER BY created_at DESC",
            PROBLEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, Problem>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
