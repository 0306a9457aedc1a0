#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, SET_COOKIE};

use learnboard_api::auth::{AuthUser, Session};
use learnboard_api::config::AppConfig;
use learnboard_api::database::MemoryStore;
use learnboard_api::testing::FakeAuth;
use learnboard_api::{serve, AppState};

pub const ROOT_DOMAIN: &str = "example.com";

/// The real router served in-process over a `MemoryStore` and `FakeAuth`
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<FakeAuth>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;

        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(FakeAuth::new());
        let config = AppConfig::development().with_root_domain(ROOT_DOMAIN);
        let state = AppState::new(config, store.clone(), auth.clone());

        tokio::spawn(async move {
            if let Err(e) = serve(listener, state).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            store,
            auth,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and return it with a `Cookie` header value for its session
    pub async fn signed_in(&self, email: &str) -> (AuthUser, String) {
        let user = self.auth.register(email, "password123").await;
        let session = self.auth.session_for(&user).await;
        (user, session_cookie(&session))
    }

    pub async fn post_json(&self, path: &str, cookie: Option<&str>, body: serde_json::Value) -> Result<reqwest::Response> {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        Ok(request.send().await?)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        Ok(request.send().await?)
    }

    /// Create a tenant owned by a fresh admin; returns the admin's cookie
    pub async fn tenant_with_admin(&self, slug: &str) -> Result<String> {
        let (_, cookie) = self.signed_in(&format!("admin@{}.test", slug)).await;
        let res = self
            .post_json("/api/tenants", Some(&cookie), serde_json::json!({ "name": slug, "slug": slug }))
            .await?;
        anyhow::ensure!(res.status().is_success(), "tenant creation failed: {}", res.status());
        Ok(cookie)
    }
}

pub fn session_cookie(session: &Session) -> String {
    format!(
        "sb-access-token={}; sb-refresh-token={}",
        session.access_token, session.refresh_token
    )
}

/// `name=value` pairs from the response's `Set-Cookie` headers
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .collect()
}

/// The value a browser keeps for `name`: the last `Set-Cookie` for it wins
pub fn final_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .filter_map(|pair| pair.split_once('=').map(|(n, v)| (n.to_string(), v.to_string())))
        .filter(|(n, _)| n == name)
        .map(|(_, value)| value)
        .last()
}

/// Cookie header for a session whose access token can no longer be read, so the
/// middleware refreshes it before routing
pub fn stale_session_cookie(session: &Session) -> String {
    format!("sb-access-token=expired; sb-refresh-token={}", session.refresh_token)
}
