//! Daily assignment reminders
//!
//! A background task wakes up every `REMINDER_INTERVAL_SECS`. The first
//! wake-up of each UTC day claims that day in `notification_runs`, then
//! emails every member assigned `REMINDER_LEAD_DAYS` ahead. A finished day is
//! never run again, so restarts and extra replicas do not double-send. A claim
//! left unfinished for `STALE_CLAIM` (crash mid-run, failed bookkeeping) is
//! taken over by the next wake-up; members reached before the crash may get a
//! second reminder.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::db::assignments::{self, ReminderTarget};
use crate::db::notifications;
use crate::email;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Age after which an unfinished daily claim is considered abandoned
pub const STALE_CLAIM: Duration = Duration::from_secs(60 * 60);

/// Delivery channel for one reminder
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reminder(&self, target: &ReminderTarget) -> Result<(), BoxError>;
}

/// Sends reminders through Amazon SES
pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub fn new(client: SesClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_reminder(&self, target: &ReminderTarget) -> Result<(), BoxError> {
        email::send_assignment_reminder(&self.client, &self.from, target).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReminderSettings {
    /// Days between the reminder and the assignment
    pub lead_days: i64,
    /// Wake-up period of the background task
    pub interval: Duration,
}

/// Outcome of one daily run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Date whose assignments are announced on `today`
pub fn target_date(today: NaiveDate, lead_days: i64) -> NaiveDate {
    shared::util::add_days(today, lead_days)
}

/// Run the reminders for `today` unless that day was already claimed.
///
/// Returns `None` when there was nothing to do. Individual send failures are
/// logged and counted; they never abort the run.
pub async fn run_due_reminders(
    pool: &PgPool,
    mailer: &dyn Mailer,
    today: NaiveDate,
    lead_days: i64,
) -> Result<Option<RunSummary>, sqlx::Error> {
    let now = shared::util::now_millis();
    let stale_before = now - STALE_CLAIM.as_millis() as i64;
    if !notifications::claim_run(pool, today, now, stale_before).await? {
        tracing::debug!(%today, "Reminders already handled for today");
        return Ok(None);
    }

    let date = target_date(today, lead_days);
    let targets = match assignments::reminder_targets(pool, date).await {
        Ok(targets) => targets,
        Err(e) => {
            // Nothing was sent yet; give the day back so the next tick retries
            notifications::release_run(pool, today).await?;
            return Err(e);
        }
    };
    tracing::info!(%today, assignment_date = %date, count = targets.len(), "Sending assignment reminders");

    let mut summary = RunSummary::default();
    for target in &targets {
        match mailer.send_reminder(target).await {
            Ok(()) => summary.sent += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(
                    to = %target.email,
                    member = %target.member_name,
                    error = %e,
                    "Failed to send assignment reminder"
                );
            }
        }
    }

    notifications::finish_run(
        pool,
        today,
        i32::try_from(summary.sent).unwrap_or(i32::MAX),
        i32::try_from(summary.failed).unwrap_or(i32::MAX),
        shared::util::now_millis(),
    )
    .await?;

    tracing::info!(%today, sent = summary.sent, failed = summary.failed, "Reminder run finished");
    Ok(Some(summary))
}

/// Start the periodic reminder task
pub fn spawn(pool: PgPool, mailer: Arc<dyn Mailer>, settings: ReminderSettings) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(settings.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let today = shared::util::today_utc();
            if let Err(e) =
                run_due_reminders(&pool, mailer.as_ref(), today, settings.lead_days).await
            {
                tracing::error!(error = %e, "Reminder run failed");
            }
        }
    })
}
