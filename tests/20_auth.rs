mod common;

use anyhow::{Context, Result};
use learnboard_api::auth::AuthProvider;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_then_login_sets_session_cookies() -> Result<()> {
    let server = common::TestServer::start().await?;
    let creds = json!({ "email": "new@example.com", "password": "password123" });

    let res = server.post_json("/api/auth/signup", None, creds.clone()).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?["success"], true);

    let again = server.post_json("/api/auth/signup", None, creds.clone()).await?;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let res = server.post_json("/api/auth/login", None, creds).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookies = common::set_cookies(&res);
    assert!(cookies.iter().any(|c| c.starts_with("sb-access-token=")));
    assert!(cookies.iter().any(|c| c.starts_with("sb-refresh-token=")));
    Ok(())
}

#[tokio::test]
async fn login_validates_before_calling_auth() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .post_json("/api/auth/login", None, json!({ "email": "nope", "password": "short" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_array());
    assert!(body["field_errors"]["password"].is_array());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.auth.register("user@example.com", "password123").await;

    let res = server
        .post_json(
            "/api/auth/login",
            None,
            json!({ "email": "user@example.com", "password": "not-the-password" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<serde_json::Value>().await?["message"], "Invalid login credentials");
    Ok(())
}

#[tokio::test]
async fn post_login_routes_by_membership() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.post_json("/api/auth/post-login", None, json!({})).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<serde_json::Value>().await?["redirectTo"], "/login");

    let (_, newcomer) = server.signed_in("newcomer@example.com").await;
    let res = server.post_json("/api/auth/post-login", Some(&newcomer), json!({})).await?;
    assert_eq!(res.json::<serde_json::Value>().await?["redirectTo"], "/tenants/new");

    let admin = server.tenant_with_admin("acme").await?;
    let res = server.post_json("/api/auth/post-login", Some(&admin), json!({})).await?;
    assert_eq!(
        res.json::<serde_json::Value>().await?["redirectTo"],
        "/acme/admin/problems/new"
    );
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookies_and_session() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (_, cookie) = server.signed_in("user@example.com").await;

    let res = server.post_json("/api/auth/logout", Some(&cookie), json!({})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::final_cookie(&res, "sb-access-token").as_deref(), Some(""));
    assert_eq!(common::final_cookie(&res, "sb-refresh-token").as_deref(), Some(""));

    let res = server.get("/api/invitations", Some(&cookie)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_with_stale_session_still_clears_cookies() -> Result<()> {
    let server = common::TestServer::start().await?;
    let user = server.auth.register("user@example.com", "password123").await;
    let session = server.auth.session_for(&user).await;

    let res = server
        .post_json("/api/auth/logout", Some(&common::stale_session_cookie(&session)), json!({}))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::final_cookie(&res, "sb-access-token").as_deref(), Some(""));
    assert_eq!(common::final_cookie(&res, "sb-refresh-token").as_deref(), Some(""));
    Ok(())
}

#[tokio::test]
async fn login_replaces_a_leftover_session() -> Result<()> {
    let server = common::TestServer::start().await?;
    let previous = server.auth.register("a@example.com", "password123").await;
    let leftover = server.auth.session_for(&previous).await;
    server.auth.register("b@example.com", "password123").await;

    let res = server
        .post_json(
            "/api/auth/login",
            Some(&common::stale_session_cookie(&leftover)),
            json!({ "email": "b@example.com", "password": "password123" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::set_cookies(&res).len(), 2);

    let access = common::final_cookie(&res, "sb-access-token").context("no access cookie")?;
    let signed_in = server.auth.get_user(&access).await?;
    assert_eq!(signed_in.email.as_deref(), Some("b@example.com"));
    Ok(())
}
