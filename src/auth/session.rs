use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::convert::Infallible;

use super::{AuthError, AuthProvider, AuthUser, Session};
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Session tokens carried by the request, taken from cookies with a
/// `Authorization: Bearer` fallback for the access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionCookies {
    pub fn from_headers(headers: &HeaderMap, config: &AuthConfig) -> Self {
        let mut cookies = SessionCookies::default();

        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';') {
                let Some((name, token)) = pair.trim().split_once('=') else { continue };
                if token.is_empty() {
                    continue;
                }
                if name == config.access_cookie {
                    cookies.access_token = Some(token.to_string());
                } else if name == config.refresh_cookie {
                    cookies.refresh_token = Some(token.to_string());
                }
            }
        }

        if cookies.access_token.is_none() {
            cookies.access_token = bearer_token(headers);
        }
        cookies
    }

    pub fn from_session(session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Reads the session the tenant-scoping middleware left in the extensions
/// (possibly refreshed), falling back to the raw request headers.
#[async_trait]
impl FromRequestParts<AppState> for SessionCookies {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(cookies) = parts.extensions.get::<SessionCookies>() {
            return Ok(cookies.clone());
        }
        Ok(SessionCookies::from_headers(&parts.headers, &state.config.auth))
    }
}

/// Resolve the current user or fail with 401
pub async fn require_user(auth: &dyn AuthProvider, session: &SessionCookies) -> Result<AuthUser, ApiError> {
    let token = session.access_token.as_deref().ok_or(AuthError::MissingSession)?;
    let user = auth.get_user(token).await.map_err(|e| {
        tracing::debug!("Session rejected: {}", e);
        match e {
            AuthError::Transport(_) | AuthError::NotConfigured => ApiError::from(e),
            _ => ApiError::unauthorized("Authentication required"),
        }
    })?;
    Ok(user)
}

#[derive(Debug, Deserialize)]
struct Expiry {
    exp: Option<i64>,
}

/// Read `exp` from an access token without verifying it. Verification is the
/// auth service's job; this is only used to decide whether to refresh.
fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Expiry>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

/// A session needs refreshing when a refresh token exists and the access token
/// is absent, unreadable, or expires within `leeway_secs`.
pub fn needs_refresh(cookies: &SessionCookies, now: i64, leeway_secs: i64) -> bool {
    if cookies.refresh_token.is_none() {
        return false;
    }
    match cookies.access_token.as_deref().map(token_expiry) {
        Some(Some(exp)) => exp - leeway_secs <= now,
        _ => true,
    }
}

/// Best-effort refresh. Failures are logged and swallowed.
pub async fn refresh_if_needed(
    auth: &dyn AuthProvider,
    cookies: &SessionCookies,
    config: &AuthConfig,
) -> Option<Session> {
    let now = chrono::Utc::now().timestamp();
    if !needs_refresh(cookies, now, config.refresh_leeway_secs) {
        return None;
    }
    let refresh_token = cookies.refresh_token.as_deref()?;

    match auth.refresh_session(refresh_token).await {
        Ok(session) => {
            tracing::debug!("Session refreshed");
            Some(session)
        }
        Err(e) => {
            tracing::debug!("Session refresh failed: {}", e);
            None
        }
    }
}

fn cookie_header(name: &str, value: &str, max_age: i64, config: &AuthConfig) -> Option<HeaderValue> {
    let secure = if config.secure_cookies { "; Secure" } else { "" };
    let cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}");
    HeaderValue::from_str(&cookie).ok()
}

/// Refresh tokens outlive the access token; the auth service decides when they stop working.
const REFRESH_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 30;

/// `Set-Cookie` values that store a session
pub fn session_cookie_headers(session: &Session, config: &AuthConfig) -> Vec<HeaderValue> {
    [
        cookie_header(&config.access_cookie, &session.access_token, session.expires_in.max(0), config),
        cookie_header(&config.refresh_cookie, &session.refresh_token, REFRESH_COOKIE_MAX_AGE, config),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// `Set-Cookie` values that remove the session
pub fn clear_cookie_headers(config: &AuthConfig) -> Vec<HeaderValue> {
    [
        cookie_header(&config.access_cookie, "", 0, config),
        cookie_header(&config.refresh_cookie, "", 0, config),
    ]
    .into_iter()
    .flatten()
    .collect()
}
