use crate::database::models::MembershipSummary;
use crate::types::Role;

/// Where to send a user right after signing in.
///
/// An admin membership wins and lands on problem authoring; otherwise the
/// first membership with a visible tenant; otherwise tenant creation.
pub fn resolve_post_login_redirect(memberships: &[MembershipSummary]) -> String {
    let admin = memberships
        .iter()
        .filter(|m| m.role == Role::Admin)
        .find_map(|m| m.organization_slug.as_deref());
    if let Some(slug) = admin {
        return format!("/{}/admin/problems/new", slug);
    }

    match memberships.iter().find_map(|m| m.organization_slug.as_deref()) {
        Some(slug) => format!("/{}", slug),
        None => "/tenants/new".to_string(),
    }
}
