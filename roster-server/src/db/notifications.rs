//! Reminder run bookkeeping (one row per UTC day)

use chrono::NaiveDate;
use sqlx::PgPool;

/// Claim `run_date` for the reminder job.
///
/// Returns `false` when the day was already claimed, by this process before a
/// restart or by another replica. An unfinished claim created before
/// `stale_before` belonged to a run that died; it is taken over.
pub async fn claim_run(
    pool: &PgPool,
    run_date: NaiveDate,
    now: i64,
    stale_before: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(NaiveDate,)> = sqlx::query_as(
        r#"
        INSERT INTO notification_runs (run_date, created_at)
        VALUES ($1, $2)
        ON CONFLICT (run_date) DO UPDATE SET created_at = EXCLUDED.created_at
        WHERE notification_runs.finished_at IS NULL
          AND notification_runs.created_at < $3
        RETURNING run_date
        "#,
    )
    .bind(run_date)
    .bind(now)
    .bind(stale_before)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn finish_run(
    pool: &PgPool,
    run_date: NaiveDate,
    sent: i32,
    failed: i32,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE notification_runs SET sent = $1, failed = $2, finished_at = $3 WHERE run_date = $4",
    )
    .bind(sent)
    .bind(failed)
    .bind(now)
    .bind(run_date)
    .execute(pool)
    .await?;
    Ok(())
}

/// Drop an unfinished claim so the day can be run again
pub async fn release_run(pool: &PgPool, run_date: NaiveDate) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM notification_runs WHERE run_date = $1 AND finished_at IS NULL")
        .bind(run_date)
        .execute(pool)
        .await?;
    Ok(())
}
