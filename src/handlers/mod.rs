// handlers/mod.rs - HTTP endpoints in two tiers
//
// Public (no session required) → Protected (session required; tenant-scoped
// endpoints also require an admin membership).
pub mod protected;
pub mod public;
