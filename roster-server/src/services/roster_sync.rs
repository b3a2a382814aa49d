//! Roster synchronization transaction
//!
//! One sync applies a validated snapshot in a single transaction:
//!
//! ```text
//! BEGIN
//!   pg_advisory_xact_lock      (one sync at a time)
//!   upsert members             (skipped when the list is absent or empty)
//!   DELETE FROM assignments    (always)
//!   INSERT assignments         (in submitted order)
//! COMMIT                       (any failure → ROLLBACK, nothing persists)
//! ```
//!
//! Everything up to `COMMIT` runs under a deadline. When it fires the
//! in-flight future is dropped, and dropping an uncommitted `Transaction`
//! rolls it back.

use std::time::Duration;

use shared::ContactMergePolicy;
use shared::RosterSnapshot;
use shared::error::{AppError, ErrorCode};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::db;
use crate::error::is_connection_error;
use crate::state::SyncSettings;

/// Counts of rows processed by a committed sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub members_count: usize,
    pub assignments_count: usize,
    /// Assignment rows that existed before the sync
    pub assignments_removed: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No transaction could be opened; nothing to roll back
    #[error("could not open sync transaction: {0}")]
    Connection(#[source] sqlx::Error),
    /// A statement or the commit failed; the transaction was rolled back
    #[error("sync rolled back: {0}")]
    Transaction(#[source] sqlx::Error),
    /// Deadline reached; the transaction was dropped uncommitted
    #[error("sync timed out after {0:?}")]
    Timeout(Duration),
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Connection(err) => {
                AppError::new(ErrorCode::DatabaseUnavailable).with_details(err.to_string())
            }
            SyncError::Transaction(err) => AppError::sync_failed(db_message(&err)),
            SyncError::Timeout(after) => AppError::with_message(
                ErrorCode::TimeoutError,
                format!("Sync timed out after {}s", after.as_secs()),
            ),
        }
    }
}

/// Prefer the server's own message for database errors (constraint names etc.)
fn db_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

/// Apply `snapshot` atomically.
///
/// The deadline covers acquiring the connection, the lock wait and every
/// statement. `COMMIT` runs outside it, so a reported timeout always means
/// nothing was committed.
pub async fn sync_roster(
    pool: &PgPool,
    snapshot: &RosterSnapshot,
    settings: &SyncSettings,
) -> Result<SyncOutcome, SyncError> {
    let staged = tokio::time::timeout(
        settings.timeout,
        stage_transaction(pool, snapshot, settings.contact_merge),
    )
    .await;

    let (tx, assignments_removed) = match staged {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!(
                timeout_ms = settings.timeout.as_millis() as u64,
                "Sync deadline reached, transaction dropped"
            );
            return Err(SyncError::Timeout(settings.timeout));
        }
    };

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Sync commit failed");
        SyncError::Transaction(e)
    })?;

    Ok(SyncOutcome {
        members_count: snapshot.member_count(),
        assignments_count: snapshot.assignment_count(),
        assignments_removed,
    })
}

/// Run every statement of the sync and hand back the open transaction
async fn stage_transaction(
    pool: &PgPool,
    snapshot: &RosterSnapshot,
    policy: ContactMergePolicy,
) -> Result<(Transaction<'static, Postgres>, u64), SyncError> {
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(
            error = %e,
            connection = is_connection_error(&e),
            "Failed to open sync transaction"
        );
        SyncError::Connection(e)
    })?;

    let now = shared::util::now_millis();

    match apply_snapshot(&mut *tx, snapshot, policy, now).await {
        Ok(assignments_removed) => Ok((tx, assignments_removed)),
        Err(e) => {
            tracing::error!(error = %e, "Sync statement failed, rolling back");
            if let Err(rb) = tx.rollback().await {
                // Connection is discarded by the pool; the server aborts the transaction
                tracing::warn!(error = %rb, "Explicit rollback failed");
            }
            Err(SyncError::Transaction(e))
        }
    }
}

/// Statements of one sync, in order. Returns the number of assignment rows removed.
async fn apply_snapshot(
    conn: &mut PgConnection,
    snapshot: &RosterSnapshot,
    policy: ContactMergePolicy,
    now: i64,
) -> Result<u64, sqlx::Error> {
    db::acquire_sync_lock(&mut *conn).await?;

    if let Some(members) = snapshot.members.as_deref() {
        for member in members {
            db::members::upsert_member(&mut *conn, member, policy, now).await?;
        }
    }

    let removed = db::assignments::delete_all(&mut *conn).await?;

    if let Some(assignments) = snapshot.assignments.as_deref() {
        for assignment in assignments {
            db::assignments::insert_assignment(&mut *conn, assignment, now).await?;
        }
    }

    Ok(removed)
}
