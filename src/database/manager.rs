use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::store::StoreError;
use crate::config::DatabaseConfig;

/// Builds and prepares the Postgres connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect using `DATABASE_URL` settings from config
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config.url.as_deref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let connection_string = Self::validate_connection_string(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(
            "Created database pool (max {} connections)",
            config.max_connections
        );
        Ok(pool)
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    fn validate_connection_string(url: &str) -> Result<String, StoreError> {
        let parsed = url::Url::parse(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        match parsed.scheme() {
            "postgres" | "postgresql" => {}
            _ => return Err(StoreError::InvalidDatabaseUrl),
        }
        if parsed.path().trim_start_matches('/').is_empty() {
            return Err(StoreError::InvalidDatabaseUrl);
        }
        Ok(parsed.into())
    }
}
