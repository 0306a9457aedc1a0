//! Tenant resolution from the request host or the first path segment.
//!
//! Pure functions only; the middleware in `crate::middleware::tenant_scope`
//! decides which of the candidates wins.

/// First path segments that address global routes rather than a tenant.
pub const RESERVED_PATHS: [&str; 4] = ["api", "login", "signup", "tenants"];

/// Resolve the tenant candidate encoded as a subdomain of `root_domain`.
///
/// Returns `None` when no root domain is configured, when the host is the apex
/// itself, or when the host is not under the root domain.
pub fn resolve_tenant_from_host(hostname: &str, root_domain: Option<&str>) -> Option<String> {
    let root_domain = root_domain?;
    if hostname == root_domain {
        return None;
    }
    if !hostname.ends_with(root_domain) {
        return None;
    }

    // "fooexample.com" ends with "example.com" but is not a subdomain of it
    let subdomain = hostname.strip_suffix(root_domain)?.strip_suffix('.')?;
    if subdomain.is_empty() {
        None
    } else {
        Some(subdomain.to_string())
    }
}

/// Trim and lowercase a slug. Idempotent.
pub fn normalize_tenant_slug(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Tenant named by the first path segment, unless that segment is reserved.
pub fn tenant_from_path(path: &str) -> Option<&str> {
    let first = path.split('/').find(|segment| !segment.is_empty())?;
    if RESERVED_PATHS.contains(&first) {
        None
    } else {
        Some(first)
    }
}

/// Strip an optional `:port` from a Host header value. Bracketed IPv6 hosts keep their brackets.
pub fn hostname_from_host_header(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or("")
}
