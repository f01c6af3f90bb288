use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;

/// Shared Postgres pool for the order, review and product tables
#[derive(Clone)]
pub struct DbClient {
    pub pool: PgPool,
}

impl DbClient {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        info!("Connected to Postgres (pool size {})", config.max_connections);
        Ok(Self { pool })
    }

    /// Applies `migrations/` in order; already-applied versions are skipped
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        let migrator = sqlx::migrate!("../migrations");
        info!("Applying {} schema migration(s)", migrator.iter().count());
        migrator.run(&self.pool).await
    }
}
