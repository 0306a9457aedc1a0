use chrono::Utc;
use uuid::Uuid;

use super::access::TenantContext;
use crate::auth::AuthUser;
use crate::database::models::{Invitation, Membership, NewInvitation};
use crate::database::{Store, StoreError};
use crate::error::ApiError;
use crate::validation::CreateInvitationRequest;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Invite an email address into the tenant. The caller must already be its admin.
pub async fn create(
    store: &dyn Store,
    ctx: &TenantContext,
    user: &AuthUser,
    request: CreateInvitationRequest,
) -> Result<Invitation, ApiError> {
    let invitation = store
        .create_invitation(NewInvitation {
            organization_id: ctx.organization.id,
            email: normalize_email(&request.email),
            role: request.role,
            created_by: user.id,
        })
        .await?;

    tracing::info!(
        "Invited {} to '{}' as {}",
        invitation.email,
        ctx.organization.slug,
        invitation.role
    );
    Ok(invitation)
}

/// Redeem a pending invitation for the caller.
pub async fn accept(store: &dyn Store, user: &AuthUser, invite_id: Uuid) -> Result<Membership, ApiError> {
    match store.accept_invitation(invite_id, user.id, Utc::now()).await {
        Ok(membership) => {
            tracing::info!(
                "User {} accepted invitation {} as {}",
                user.id,
                invite_id,
                membership.role
            );
            Ok(membership)
        }
        Err(StoreError::NotFound(_)) => Err(ApiError::not_found("Invitation not found")),
        Err(StoreError::Conflict(reason)) => {
            tracing::warn!("Invitation {} rejected: {}", invite_id, reason);
            Err(ApiError::conflict("This invitation is no longer valid"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_for_tenant(store: &dyn Store, ctx: &TenantContext) -> Result<Vec<Invitation>, ApiError> {
    Ok(store.list_invitations(ctx.organization.id).await?)
}

/// Pending invitations addressed to the caller's email
pub async fn list_pending_for_user(store: &dyn Store, user: &AuthUser) -> Result<Vec<Invitation>, ApiError> {
    let Some(email) = user.email.as_deref() else {
        return Ok(Vec::new());
    };
    Ok(store.list_pending_invitations_for_email(&normalize_email(email)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::access::load_admin_context;
    use crate::services::tenant_service::create_tenant;
    use crate::testing::user;
    use crate::types::{InvitationStatus, Role};
    use crate::validation::CreateTenantRequest;

    async fn tenant(store: &MemoryStore, owner: &AuthUser) -> TenantContext {
        create_tenant(
            store,
            owner,
            CreateTenantRequest {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
            },
        )
        .await
        .unwrap();
        load_admin_context(store, "acme", owner).await.unwrap()
    }

    fn invite(email: &str) -> CreateInvitationRequest {
        CreateInvitationRequest {
            email: email.to_string(),
            role: Role::Student,
        }
    }

    #[tokio::test]
    async fn accept_grants_membership_once() {
        let store = MemoryStore::new();
        let owner = user("owner@example.com");
        let ctx = tenant(&store, &owner).await;
        let student = user("student@example.com");

        let invitation = create(&store, &ctx, &owner, invite(" Student@Example.com ")).await.unwrap();
        assert_eq!(invitation.email, "student@example.com");
        assert_eq!(invitation.status, InvitationStatus::Pending);

        let pending = list_pending_for_user(&store, &student).await.unwrap();
        assert_eq!(pending.len(), 1);

        let membership = accept(&store, &student, invitation.id).await.unwrap();
        assert_eq!(membership.role, Role::Student);
        assert_eq!(store.membership_count(ctx.organization.id).await, 2);

        let err = accept(&store, &student, invitation.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(store.membership_count(ctx.organization.id).await, 2);

        assert!(list_pending_for_user(&store, &student).await.unwrap().is_empty());
        let all = list_for_tenant(&store, &ctx).await.unwrap();
        assert_eq!(all[0].status, InvitationStatus::Accepted);
        assert_eq!(all[0].accepted_by, Some(student.id));
    }

    #[tokio::test]
    async fn unknown_invitation_is_not_found() {
        let store = MemoryStore::new();
        let err = accept(&store, &user("s@example.com"), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn user_without_email_has_no_pending_invitations() {
        let store = MemoryStore::new();
        let anonymous = AuthUser {
            id: Uuid::new_v4(),
            email: None,
        };
        assert!(list_pending_for_user(&store, &anonymous).await.unwrap().is_empty());
    }
}
