use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub tenant: TenantConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Apex domain under which `{tenant}.{root_domain}` hosts are recognised
    pub root_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub access_cookie: String,
    pub refresh_cookie: String,
    pub secure_cookies: bool,
    pub refresh_leeway_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("BIND_HOST") {
            self.server.bind_host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Tenant overrides
        let root_domain = env::var("ROOT_DOMAIN")
            .ok()
            .or_else(|| env::var("NEXT_PUBLIC_ROOT_DOMAIN").ok());
        if let Some(v) = root_domain {
            self.tenant.root_domain = normalize_root_domain(&v);
        }

        // Auth overrides
        if let Ok(v) = env::var("SUPABASE_URL") {
            self.auth.url = non_empty(v);
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY") {
            self.auth.anon_key = non_empty(v);
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.auth.jwt_secret = non_empty(v);
        }
        if let Ok(v) = env::var("AUTH_ACCESS_COOKIE") {
            self.auth.access_cookie = v;
        }
        if let Ok(v) = env::var("AUTH_REFRESH_COOKIE") {
            self.auth.refresh_cookie = v;
        }
        if let Ok(v) = env::var("AUTH_SECURE_COOKIES") {
            self.auth.secure_cookies = v.parse().unwrap_or(self.auth.secure_cookies);
        }
        if let Ok(v) = env::var("AUTH_REFRESH_LEEWAY_SECS") {
            self.auth.refresh_leeway_secs = v.parse().unwrap_or(self.auth.refresh_leeway_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            tenant: TenantConfig { root_domain: None },
            auth: AuthConfig {
                url: None,
                anon_key: None,
                jwt_secret: None,
                access_cookie: "sb-access-token".to_string(),
                refresh_cookie: "sb-refresh-token".to_string(),
                secure_cookies: false,
                refresh_leeway_secs: 60,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.auth.secure_cookies = true;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.database.run_migrations = false;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.auth.secure_cookies = true;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.run_migrations = false;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    /// Builder used by tests and embedders that do not read the environment
    pub fn with_root_domain(mut self, root_domain: &str) -> Self {
        self.tenant.root_domain = normalize_root_domain(root_domain);
        self
    }

    pub fn root_domain(&self) -> Option<&str> {
        self.tenant.root_domain.as_deref()
    }

    pub fn auth_configured(&self) -> bool {
        self.auth.url.is_some() && self.auth.anon_key.is_some()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_root_domain(value: &str) -> Option<String> {
    non_empty(value.to_lowercase())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert!(config.root_domain().is_none());
        assert!(!config.auth.secure_cookies);
        assert!(!config.auth_configured());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.auth.secure_cookies);
        assert!(!config.database.run_migrations);
        assert_eq!(config.auth.access_cookie, "sb-access-token");
    }

    #[test]
    fn root_domain_is_normalized() {
        let config = AppConfig::development().with_root_domain("  Example.COM ");
        assert_eq!(config.root_domain(), Some("example.com"));

        let config = AppConfig::development().with_root_domain("   ");
        assert_eq!(config.root_domain(), None);
    }
}
