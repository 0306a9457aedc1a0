// handlers/public/auth/mod.rs - Sign-in, sign-up and sign-out
//
// Credentials go to the auth service; on success the session tokens are
// written as HttpOnly cookies.

use axum::{
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub mod login;
pub mod logout;
pub mod signup;

pub use login::login_post;
pub use logout::logout_post;
pub use signup::signup_post;

/// `{"success": true}` with the given `Set-Cookie` headers
fn success_with_cookies(cookies: Vec<HeaderValue>) -> Response {
    let mut response = Json(json!({ "success": true })).into_response();
    for cookie in cookies {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}
