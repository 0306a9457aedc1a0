//! The request pipeline behind each endpoint: resolve the tenant, check the
//! caller's role, then read or write the store.

pub mod access;
pub mod invitation_service;
pub mod problem_service;
pub mod redirect;
pub mod tenant_service;

pub use access::{load_admin_context, load_organization, TenantContext};
pub use redirect::resolve_post_login_redirect;
