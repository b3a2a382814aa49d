//! roster-server: roster and assignment sync service
//!
//! Long-running service that:
//! - Accepts full roster snapshots from the back-office SPA (shared secret)
//! - Applies them atomically: member upserts + assignment replace
//! - Serves read-only member/assignment views for dashboards
//! - Emails assignment reminders once a day through SES

mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod reminders;
mod services;
mod state;

use std::sync::Arc;

use aws_sdk_sesv2::Client as SesClient;
use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use config::Config;
use reminders::{ReminderSettings, SesMailer};
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.environment,
        contact_merge = ?config.contact_merge,
        sync_timeout_secs = config.sync_timeout.as_secs(),
        "Starting roster-server"
    );
    if config.is_development() {
        tracing::warn!("Development mode: API_SECRET falls back to a placeholder when unset");
    }

    let state = AppState::new(&config).await?;

    let reminder_task = if config.reminders_enabled {
        let ses = build_ses_client(config.ses_region.clone()).await;
        let mailer = Arc::new(SesMailer::new(ses, config.ses_from_email.clone()));
        tracing::info!(
            lead_days = config.reminder_lead_days,
            interval_secs = config.reminder_interval.as_secs(),
            from = %config.ses_from_email,
            "Reminder job enabled"
        );
        Some(reminders::spawn(
            state.pool.clone(),
            mailer,
            ReminderSettings {
                lead_days: config.reminder_lead_days,
                interval: config.reminder_interval,
            },
        ))
    } else {
        tracing::info!("Reminder job disabled");
        None
    };

    let mut app = api::create_router(state);
    if let Some(origin) = &config.cors_allowed_origin {
        app = app.layer(cors_layer(origin)?);
        tracing::info!(origin = %origin, "CORS enabled");
    }

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("roster-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = reminder_task {
        task.abort();
    }
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` filter with a service default; JSON lines when `LOG_FORMAT=json`
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roster_server=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_ses_client(region: Option<String>) -> SesClient {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    match region {
        Some(region) => {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(region))
                .build();
            SesClient::new(&ses_config)
        }
        None => SesClient::new(&aws_config),
    }
}

/// Single-origin CORS for the back-office SPA
fn cors_layer(origin: &str) -> Result<CorsLayer, BoxError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| format!("CORS_ALLOWED_ORIGIN is not a valid header value: {e}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers(Any))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
