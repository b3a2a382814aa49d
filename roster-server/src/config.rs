//! Server configuration

use std::time::Duration;

use shared::ContactMergePolicy;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Roster server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Shared secret expected in the `x-api-secret` header
    pub api_secret: String,
    /// Pool size
    pub db_max_connections: u32,
    /// How long a request waits for a pooled connection
    pub db_acquire_timeout: Duration,
    /// Upper bound for one sync transaction, commit included
    pub sync_timeout: Duration,
    /// How member upserts treat missing contact fields
    pub contact_merge: ContactMergePolicy,
    /// Run the daily reminder job
    pub reminders_enabled: bool,
    /// Reminders go out this many days before the assignment
    pub reminder_lead_days: i64,
    /// How often the reminder job wakes up to check whether today's run is due
    pub reminder_interval: Duration,
    /// SES sender email address
    pub ses_from_email: String,
    /// SES region override (defaults to the ambient AWS region)
    pub ses_region: Option<String>,
    /// Allowed CORS origin for the back-office SPA (none = same-origin only)
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any key lookup (environment, test map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let contact_merge = match lookup("MEMBER_CONTACT_MERGE") {
            Some(raw) => raw.parse::<ContactMergePolicy>()?,
            None => ContactMergePolicy::default(),
        };

        let reminder_lead_days: i64 = parse_or(&lookup, "REMINDER_LEAD_DAYS", 7)?;
        if !(0..=365).contains(&reminder_lead_days) {
            return Err(format!("REMINDER_LEAD_DAYS out of range: {reminder_lead_days}").into());
        }

        let sync_timeout_secs: u64 = parse_or(&lookup, "SYNC_TIMEOUT_SECS", 30)?;
        if sync_timeout_secs == 0 {
            return Err("SYNC_TIMEOUT_SECS must be at least 1".into());
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,
            api_secret: require_secret(&lookup, "API_SECRET", &environment)?,
            environment,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
            sync_timeout: Duration::from_secs(sync_timeout_secs),
            contact_merge,
            reminders_enabled: parse_flag(&lookup, "REMINDERS_ENABLED", true)?,
            reminder_lead_days,
            reminder_interval: Duration::from_secs(
                parse_or(&lookup, "REMINDER_INTERVAL_SECS", 3600)?.max(1),
            ),
            ses_from_email: lookup("SES_FROM_EMAIL")
                .unwrap_or_else(|| "noreply@example.org".into()),
            ses_region: lookup("SES_REGION").filter(|s| !s.is_empty()),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|s| !s.is_empty()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Unset or blank means `default`; anything else must parse.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, BoxError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| -> BoxError { format!("{name}: invalid value '{raw}': {e}").into() }),
    }
}

fn parse_flag<F>(lookup: &F, name: &str, default: bool) -> Result<bool, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => Err(format!("{name}: expected true/false, got '{other}'").into()),
    }
}

/// Require a secret: must be set and non-empty in non-development environments.
fn require_secret<F>(lookup: &F, name: &str, environment: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, BoxError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_in_development() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/roster")]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert!(config.is_development());
        assert_eq!(config.api_secret, "dev-API_SECRET-not-for-production");
        assert_eq!(config.sync_timeout, Duration::from_secs(30));
        assert_eq!(config.contact_merge, ContactMergePolicy::Overwrite);
        assert!(config.reminders_enabled);
        assert_eq!(config.reminder_lead_days, 7);
        assert!(config.cors_allowed_origin.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn secret_required_outside_development() {
        let err = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("ENVIRONMENT", "production"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("API_SECRET"));

        let err = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("ENVIRONMENT", "production"),
            ("API_SECRET", ""),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let config = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("ENVIRONMENT", "production"),
            ("API_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.api_secret, "s3cret");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("HTTP_PORT", "9000"),
            ("SYNC_TIMEOUT_SECS", "5"),
            ("MEMBER_CONTACT_MERGE", "keep_existing"),
            ("REMINDERS_ENABLED", "false"),
            ("REMINDER_LEAD_DAYS", "2"),
            ("CORS_ALLOWED_ORIGIN", "https://club.example.org"),
        ])
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.sync_timeout, Duration::from_secs(5));
        assert_eq!(config.contact_merge, ContactMergePolicy::KeepExisting);
        assert!(!config.reminders_enabled);
        assert_eq!(config.reminder_lead_days, 2);
        assert_eq!(
            config.cors_allowed_origin.as_deref(),
            Some("https://club.example.org")
        );
    }

    #[test]
    fn invalid_merge_policy_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("MEMBER_CONTACT_MERGE", "merge"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("merge"));
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("HTTP_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().starts_with("HTTP_PORT"));

        let config = load(&[("DATABASE_URL", "postgres://db/roster"), ("HTTP_PORT", " ")]).unwrap();
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn reminder_flag_accepts_common_spellings() {
        for (raw, expected) in [("0", false), ("off", false), ("No", false), ("1", true), ("on", true)] {
            let config = load(&[
                ("DATABASE_URL", "postgres://db/roster"),
                ("REMINDERS_ENABLED", raw),
            ])
            .unwrap();
            assert_eq!(config.reminders_enabled, expected, "{raw}");
        }

        let err = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("REMINDERS_ENABLED", "disabled"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("REMINDERS_ENABLED"));
    }

    #[test]
    fn zero_sync_timeout_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://db/roster"),
            ("SYNC_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("SYNC_TIMEOUT_SECS"));
    }
}
