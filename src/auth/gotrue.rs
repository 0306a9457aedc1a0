use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{AuthError, AuthProvider, AuthUser, Claims, Session};
use crate::config::AuthConfig;

/// Client for a hosted GoTrue-compatible auth API (`{url}/auth/v1/...`)
#[derive(Clone)]
pub struct GoTrueClient {
    http: Client,
    base_url: String,
    anon_key: String,
    jwt_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: uuid::Uuid,
    email: Option<String>,
}

/// Error bodies differ between endpoints and service versions
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self, status: StatusCode) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| format!("auth service responded with {}", status))
    }
}

impl GoTrueClient {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let url = config.url.as_deref().ok_or(AuthError::NotConfigured)?;
        let anon_key = config.anon_key.clone().ok_or(AuthError::NotConfigured)?;
        Ok(Self {
            http: Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
            anon_key,
            jwt_secret: config.jwt_secret.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn error_message(response: Response) -> String {
        let status = response.status();
        response
            .json::<ErrorResponse>()
            .await
            .unwrap_or_default()
            .into_message(status)
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<Response, AuthError> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }

    /// Verify the token locally when the signing secret is known
    fn verify_locally(&self, secret: &str, access_token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["authenticated"]);

        let data = decode::<Claims>(access_token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map_err(|e| AuthError::InvalidSession(e.to_string()))?;

        Ok(AuthUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidCredentials(Self::error_message(response).await));
        }

        let token: TokenResponse = response.json().await?;
        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let response = self
            .http
            .post(self.endpoint("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected(Self::error_message(response).await));
        }

        // With email confirmation enabled the service returns only the user
        let body: serde_json::Value = response.json().await?;
        Ok(serde_json::from_value::<TokenResponse>(body).ok().map(|token| Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        }))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::Rejected(Self::error_message(response).await))
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        if let Some(secret) = &self.jwt_secret {
            return self.verify_locally(secret, access_token);
        }

        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidSession(Self::error_message(response).await));
        }

        let user: UserResponse = response.json().await?;
        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let response = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidSession(Self::error_message(response).await));
        }

        let token: TokenResponse = response.json().await?;
        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }
}
