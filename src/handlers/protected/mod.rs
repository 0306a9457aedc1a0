// handlers/protected/mod.rs - Endpoints that require a session
//
// Each handler validates its body first, then resolves the caller with
// `require_user`, then (for tenant endpoints) loads the admin context.
pub mod auth;
pub mod invitations;
pub mod problems;
pub mod tenants;
