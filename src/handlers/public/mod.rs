// handlers/public/mod.rs - Endpoints that do not require a session
pub mod auth;
pub mod home;
pub mod tenant;
