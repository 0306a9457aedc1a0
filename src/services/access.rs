use crate::auth::{require_role, AuthUser};
use crate::database::models::{Membership, Organization};
use crate::database::Store;
use crate::error::ApiError;
use crate::tenant::normalize_tenant_slug;
use crate::types::Role;

/// An organization together with the caller's membership in it
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub organization: Organization,
    pub membership: Membership,
}

/// Look up a tenant by slug, 404 if it does not exist
pub async fn load_organization(store: &dyn Store, slug: &str) -> Result<Organization, ApiError> {
    let slug = normalize_tenant_slug(slug);
    store
        .find_organization_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tenant '{}' not found", slug)))
}

/// Resolve the tenant and require the caller to administer it.
///
/// 404 when the slug is unknown, 403 when the caller is not an admin member.
pub async fn load_admin_context(
    store: &dyn Store,
    slug: &str,
    user: &AuthUser,
) -> Result<TenantContext, ApiError> {
    let organization = load_organization(store, slug).await?;
    let membership = store.find_membership(organization.id, user.id).await?;
    let membership = require_role(membership.as_ref(), Role::Admin)?.clone();

    tracing::debug!("User {} administers tenant '{}'", user.id, organization.slug);
    Ok(TenantContext {
        organization,
        membership,
    })
}
