use axum::{
    extract::{Request, State},
    http::{
        header::{HOST, SET_COOKIE},
        uri::PathAndQuery,
        HeaderMap, HeaderName, HeaderValue, Uri,
    },
    middleware::Next,
    response::Response,
};

use crate::auth::session::{refresh_if_needed, session_cookie_headers};
use crate::auth::SessionCookies;
use crate::state::AppState;
use crate::tenant::{
    hostname_from_host_header, normalize_tenant_slug, resolve_tenant_from_host, tenant_from_path, RESERVED_PATHS,
};

/// Header carrying the resolved tenant, on both the request and the response
pub static X_TENANT: HeaderName = HeaderName::from_static("x-tenant");

/// Resolved tenant slug, available to handlers as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSlug(pub String);

/// Where the effective tenant came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantSource {
    Path(String),
    /// From the host; `rewrite` is set when the path must be prefixed with the slug
    Host { tenant: String, rewrite: bool },
}

impl TenantSource {
    pub fn slug(&self) -> &str {
        match self {
            TenantSource::Path(slug) => slug,
            TenantSource::Host { tenant, .. } => tenant,
        }
    }
}

/// Decide which tenant a request addresses.
///
/// A tenant subdomain wins over the path: under `acme.example.com` the path
/// `/admin/problems` belongs to `acme`, and is rewritten unless it already starts
/// with `/acme` or with a reserved segment.
pub fn resolve_request_tenant(hostname: &str, path: &str, root_domain: Option<&str>) -> Option<TenantSource> {
    let first_segment = path.split('/').find(|s| !s.is_empty());

    if let Some(host_tenant) = resolve_tenant_from_host(hostname, root_domain) {
        let tenant = normalize_tenant_slug(&host_tenant);
        let already_scoped = first_segment.map_or(false, |s| normalize_tenant_slug(s) == tenant);
        let reserved = first_segment.map_or(false, |s| RESERVED_PATHS.contains(&s));
        return Some(TenantSource::Host {
            rewrite: !already_scoped && !reserved,
            tenant,
        });
    }

    tenant_from_path(path).map(|segment| TenantSource::Path(normalize_tenant_slug(segment)))
}

fn request_hostname(request: &Request) -> String {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default();
    hostname_from_host_header(host).to_ascii_lowercase()
}

fn scoped_uri(uri: &Uri, tenant: &str) -> Option<Uri> {
    let path = match uri.path() {
        "/" => String::new(),
        path => path.to_string(),
    };
    let path_and_query = match uri.query() {
        Some(query) => format!("/{}{}?{}", tenant, path, query),
        None => format!("/{}{}", tenant, path),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// Runs before routing: refreshes the session, attaches the tenant and
/// rewrites subdomain-addressed requests onto the `/{tenant}/...` routes.
pub async fn tenant_scope(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth_config = &state.config.auth;

    let cookies = SessionCookies::from_headers(request.headers(), auth_config);
    let refreshed = refresh_if_needed(state.auth.as_ref(), &cookies, auth_config).await;
    if let Some(session) = &refreshed {
        request.extensions_mut().insert(SessionCookies::from_session(session));
    }

    let hostname = request_hostname(&request);
    let source = resolve_request_tenant(&hostname, request.uri().path(), state.config.root_domain());

    let tenant = match source.as_ref().map(|s| (s, HeaderValue::from_str(s.slug()))) {
        Some((source, Ok(value))) => {
            tracing::debug!("Request for {} scoped to tenant '{}'", request.uri().path(), source.slug());
            request.headers_mut().insert(X_TENANT.clone(), value.clone());
            request.extensions_mut().insert(TenantSlug(source.slug().to_string()));

            if let TenantSource::Host { tenant, rewrite: true } = source {
                match scoped_uri(request.uri(), tenant) {
                    Some(uri) => {
                        tracing::debug!("Rewrote {} to {}", request.uri(), uri);
                        *request.uri_mut() = uri;
                    }
                    None => tracing::warn!("Could not rewrite {} for tenant '{}'", request.uri(), tenant),
                }
            }
            Some(value)
        }
        Some((source, Err(_))) => {
            tracing::debug!("Ignoring tenant '{}': not a valid header value", source.slug());
            None
        }
        None => None,
    };

    let mut response = next.run(request).await;

    if let Some(value) = tenant {
        response.headers_mut().insert(X_TENANT.clone(), value);
    }
    if let Some(session) = &refreshed {
        // Cookies the handler wrote itself (sign-in, sign-out) take precedence
        let handler_set = set_cookie_names(response.headers());
        for cookie in session_cookie_headers(session, auth_config) {
            let name = cookie_name(&cookie).map(str::to_string);
            if name.map_or(false, |n| handler_set.contains(&n)) {
                continue;
            }
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    response
}

fn cookie_name(value: &HeaderValue) -> Option<&str> {
    let (name, _) = value.to_str().ok()?.split_once('=')?;
    Some(name.trim())
}

fn set_cookie_names(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(cookie_name)
        .map(str::to_string)
        .collect()
}
