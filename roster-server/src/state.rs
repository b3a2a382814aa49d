//! Application state for roster-server

use std::time::Duration;

use shared::ContactMergePolicy;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::ApiSecret;
use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Knobs for the sync transaction
#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    /// Whole-transaction deadline; the transaction is rolled back when it fires
    pub timeout: Duration,
    pub contact_merge: ContactMergePolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            contact_merge: ContactMergePolicy::Overwrite,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Expected `x-api-secret`
    pub api_secret: ApiSecret,
    pub sync: SyncSettings,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Self::from_parts(
            pool,
            &config.api_secret,
            SyncSettings {
                timeout: config.sync_timeout,
                contact_merge: config.contact_merge,
            },
        )
    }

    /// Assemble state from an existing pool
    pub fn from_parts(pool: PgPool, api_secret: &str, sync: SyncSettings) -> Result<Self, BoxError> {
        Ok(Self {
            pool,
            api_secret: ApiSecret::new(api_secret).map_err(|_| "API secret rejected by HMAC")?,
            sync,
        })
    }
}
