pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod tenant;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod validation;

pub use routes::{router, serve};
pub use state::AppState;
