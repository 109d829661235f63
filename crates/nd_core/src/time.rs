use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Source of "now" for relative time labels.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the timestamp shapes the feeds produce. Zone-less values are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn plural(count: i64, unit: &str) -> String {
    if count > 1 {
        format!("{} {}s ago", count, unit)
    } else {
        format!("{} {} ago", count, unit)
    }
}

/// Human relative label for `timestamp` as seen at `now`.
///
/// Anything under a minute (including future timestamps) is "Just now";
/// a week or older falls back to the absolute date, `M/D/YYYY`.
pub fn time_ago(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(past) = parse_timestamp(timestamp) else {
        tracing::debug!("Unparseable timestamp: {:?}", timestamp);
        return "Unknown date".to_string();
    };

    let minutes = (now - past).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        past.format("%-m/%-d/%Y").to_string()
    }
}
