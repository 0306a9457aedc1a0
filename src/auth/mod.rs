//! Authentication is delegated to an external auth service. This module defines
//! the capability the rest of the crate consumes (`AuthProvider`), the hosted
//! implementation (`GoTrueClient`), session cookie handling and the role policy.

pub mod gotrue;
pub mod policy;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use gotrue::GoTrueClient;
pub use policy::require_role;
pub use session::{require_user, SessionCookies};

/// The caller as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Tokens issued by the auth service after sign-in or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

/// Claims of an access token issued by the auth service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session")]
    MissingSession,

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("{0}")]
    InvalidCredentials(String),

    /// The auth service refused the request (e.g. sign-up of an existing address)
    #[error("{0}")]
    Rejected(String),

    #[error("Auth service is not configured")]
    NotConfigured,

    #[error("Auth service unreachable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

/// Sign-in, sign-up, sign-out and session lookup, provided by the auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Register an account. A session is returned when the service signs the user in immediately.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolve the user an access token belongs to
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;
}
