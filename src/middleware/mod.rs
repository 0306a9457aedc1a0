pub mod tenant_scope;

pub use tenant_scope::{tenant_scope, TenantSlug, X_TENANT};
