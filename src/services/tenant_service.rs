use crate::auth::AuthUser;
use crate::database::models::{NewOrganization, Organization};
use crate::database::Store;
use crate::error::ApiError;
use crate::validation::CreateTenantRequest;

/// Create an organization and make the caller its first admin.
pub async fn create_tenant(
    store: &dyn Store,
    user: &AuthUser,
    request: CreateTenantRequest,
) -> Result<Organization, ApiError> {
    let (organization, membership) = store
        .create_organization_with_admin(NewOrganization {
            name: request.name.trim().to_string(),
            slug: request.slug,
            created_by: user.id,
        })
        .await?;

    tracing::info!(
        "Created tenant '{}' ({}) with admin {}",
        organization.slug,
        organization.id,
        membership.user_id
    );
    Ok(organization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use crate::database::MemoryStore;
    use crate::testing::user;

    fn request(slug: &str) -> CreateTenantRequest {
        CreateTenantRequest {
            name: "Acme".to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn creator_becomes_admin() {
        let store = MemoryStore::new();
        let owner = user("owner@example.com");

        let org = create_tenant(&store, &owner, request("acme")).await.unwrap();
        assert_eq!(org.slug, "acme");

        let membership = store.find_membership(org.id, owner.id).await.unwrap().unwrap();
        assert_eq!(membership.role, Role::Admin);
    }

    #[tokio::test]
    async fn duplicate_slug_surfaces_store_code() {
        let store = MemoryStore::new();
        create_tenant(&store, &user("a@example.com"), request("acme")).await.unwrap();

        let err = create_tenant(&store, &user("b@example.com"), request("acme"))
            .await
            .unwrap_err();
        match err {
            ApiError::Storage { code, .. } => assert_eq!(code.as_deref(), Some("23505")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
