use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router, ServiceExt,
};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::tenant_scope;
use crate::state::AppState;

/// All routes, without the tenant-scoping middleware.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(public::home::root))
        .route("/health", get(public::home::health))
        .merge(auth_routes())
        .merge(tenant_api_routes())
        .merge(invitation_routes())
        .merge(tenant_path_routes())
        .layer(TraceLayer::new_for_http());

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/signup", post(auth::signup_post))
        .route("/api/auth/logout", post(auth::logout_post))
        .route("/api/auth/post-login", post(protected::auth::post_login))
}

fn tenant_api_routes() -> Router<AppState> {
    use protected::{invitations, problems, tenants};

    Router::new()
        .route("/api/tenants", post(tenants::tenant_post))
        .route(
            "/api/tenants/:tenant/invitations",
            get(invitations::invitation_list).post(invitations::invitation_post),
        )
        .route(
            "/api/tenants/:tenant/problems",
            get(problems::problem_list).post(problems::problem_post),
        )
}

fn invitation_routes() -> Router<AppState> {
    use protected::invitations;

    Router::new()
        .route("/api/invitations", get(invitations::pending_list))
        .route("/api/invitations/accept", post(invitations::accept_post))
}

/// Path-addressed tenant routes; subdomain requests are rewritten onto these.
fn tenant_path_routes() -> Router<AppState> {
    use protected::{invitations, problems};

    Router::new()
        .route("/:tenant", get(public::tenant::tenant_get))
        .route(
            "/:tenant/admin/problems",
            get(problems::problem_list).post(problems::problem_post),
        )
        .route(
            "/:tenant/admin/invitations",
            get(invitations::invitation_list).post(invitations::invitation_post),
        )
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Serve the application on `listener` until the process stops.
///
/// The tenant-scoping middleware wraps the router from the outside so that
/// its URI rewrite happens before route matching.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = axum::middleware::from_fn_with_state(state.clone(), tenant_scope).layer(router(state));
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await
}
