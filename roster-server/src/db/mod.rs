//! Database access layer
//!
//! Write paths take `&mut PgConnection` so they can run inside the sync
//! transaction; read paths take the pool.

pub mod assignments;
pub mod members;
pub mod notifications;

use sqlx::{PgConnection, PgPool};

/// Advisory lock key serializing roster syncs (ASCII "ROSTER").
const SYNC_LOCK_KEY: i64 = 0x524F_5354_4552;

/// Block until no other sync holds the roster lock.
///
/// Transaction-scoped: released automatically on commit or rollback.
pub async fn acquire_sync_lock(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SYNC_LOCK_KEY)
        .execute(conn)
        .await?;
    Ok(())
}

/// Round-trip to the database, for health checks
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
