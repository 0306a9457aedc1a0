//! Test doubles: an in-process auth provider and helpers for building callers.
//!
//! Compiled for unit tests and behind the `testing` feature, which the
//! integration tests under `tests/` enable.

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{AuthError, AuthProvider, AuthUser, Session};

const FAKE_SECRET: &[u8] = b"learnboard-fake-auth";

/// A caller with a fresh id
pub fn user(email: &str) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
    }
}

#[derive(Default)]
struct Accounts {
    /// email -> (password, user)
    by_email: HashMap<String, (String, AuthUser)>,
    access: HashMap<String, AuthUser>,
    refresh: HashMap<String, AuthUser>,
}

/// `AuthProvider` keeping accounts and tokens in memory.
///
/// Access tokens are real HS256 JWTs carrying `exp`, so the refresh logic
/// sees the same shape it sees from the hosted service.
pub struct FakeAuth {
    accounts: RwLock<Accounts>,
    token_lifetime: i64,
}

impl Default for FakeAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::with_token_lifetime(3600)
    }

    /// Tokens expire `secs` after issue; a negative value issues already-expired tokens.
    pub fn with_token_lifetime(secs: i64) -> Self {
        Self {
            accounts: RwLock::new(Accounts::default()),
            token_lifetime: secs,
        }
    }

    /// Register an account and return the user it belongs to
    pub async fn register(&self, email: &str, password: &str) -> AuthUser {
        let user = user(email);
        self.accounts
            .write()
            .await
            .by_email
            .insert(email.to_lowercase(), (password.to_string(), user.clone()));
        user
    }

    /// Issue a session for a user without a password check
    pub async fn session_for(&self, user: &AuthUser) -> Session {
        let mut accounts = self.accounts.write().await;
        self.issue(&mut accounts, user)
    }

    fn issue(&self, accounts: &mut Accounts, user: &AuthUser) -> Session {
        let claims = json!({
            "sub": user.id,
            "email": user.email,
            "aud": "authenticated",
            "exp": chrono::Utc::now().timestamp() + self.token_lifetime,
            "jti": Uuid::new_v4(),
        });
        let access_token = encode(&Header::default(), &claims, &EncodingKey::from_secret(FAKE_SECRET))
            .unwrap_or_else(|_| Uuid::new_v4().to_string());
        let refresh_token = Uuid::new_v4().simple().to_string();

        accounts.access.insert(access_token.clone(), user.clone());
        accounts.refresh.insert(refresh_token.clone(), user.clone());
        Session {
            access_token,
            refresh_token,
            expires_in: self.token_lifetime,
        }
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut accounts = self.accounts.write().await;
        let user = match accounts.by_email.get(&email.to_lowercase()) {
            Some((stored, user)) if stored == password => user.clone(),
            _ => return Err(AuthError::InvalidCredentials("Invalid login credentials".to_string())),
        };
        Ok(self.issue(&mut accounts, &user))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        if self.accounts.read().await.by_email.contains_key(&email.to_lowercase()) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }
        let user = self.register(email, password).await;
        Ok(Some(self.session_for(&user).await))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write().await;
        if let Some(user) = accounts.access.remove(access_token) {
            accounts.refresh.retain(|_, owner| owner.id != user.id);
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.accounts
            .read()
            .await
            .access
            .get(access_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidSession("Unknown access token".to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let mut accounts = self.accounts.write().await;
        let user = accounts
            .refresh
            .remove(refresh_token)
            .ok_or_else(|| AuthError::InvalidSession("Invalid refresh token".to_string()))?;
        Ok(self.issue(&mut accounts, &user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn password_sign_in_round_trip() {
        let auth = FakeAuth::new();
        let registered = auth.register("a@example.com", "password1").await;

        let session = auth.sign_in_with_password("a@example.com", "password1").await.unwrap();
        assert_eq!(auth.get_user(&session.access_token).await.unwrap(), registered);

        assert!(matches!(
            auth.sign_in_with_password("a@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials(_))
        ));

        auth.sign_out(&session.access_token).await.unwrap();
        assert!(auth.get_user(&session.access_token).await.is_err());
    }

    #[tokio::test]
    async fn refresh_tokens_are_single_use() {
        let auth = FakeAuth::new();
        let session = auth.session_for(&user("a@example.com")).await;

        let refreshed = auth.refresh_session(&session.refresh_token).await.unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert!(auth.refresh_session(&session.refresh_token).await.is_err());
    }
}
