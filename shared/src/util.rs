use chrono::{Duration, NaiveDate, Utc};

/// Current UTC timestamp (Unix millis)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current UTC calendar date
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// `date + days`, saturating at the calendar bounds
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}
