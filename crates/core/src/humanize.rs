//! Human-friendly labels for dashboard timestamps.

use chrono::{DateTime, Utc};

/// Describe how long ago `then` was, relative to `now`.
///
/// Anything older than a week is shown as a calendar date instead.
///
/// ```
/// use chrono::{Duration, Utc};
/// use local_crust_core::humanize::time_ago;
///
/// let now = Utc::now();
/// assert_eq!(time_ago(now, now - Duration::minutes(5)), "5 minutes ago");
/// assert_eq!(time_ago(now, now - Duration::hours(1)), "1 hour ago");
/// ```
#[must_use]
pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();

    if seconds < 60 {
        return "Just now".to_owned();
    }
    if seconds < 3_600 {
        return plural(seconds / 60, "minute");
    }
    if seconds < 86_400 {
        return plural(seconds / 3_600, "hour");
    }
    if seconds < 604_800 {
        return plural(seconds / 86_400, "day");
    }
    then.format("%b %d, %Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// 12-hour clock label for an hour of the day, e.g. `0` → `12 AM`, `15` → `3 PM`.
#[must_use]
pub fn hour_label(hour: u32) -> String {
    let period = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display} {period}")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).single().unwrap_or_default();
        assert_eq!(time_ago(now, now), "Just now");
        assert_eq!(time_ago(now, now - Duration::seconds(59)), "Just now");
        assert_eq!(time_ago(now, now - Duration::seconds(60)), "1 minute ago");
        assert_eq!(time_ago(now, now - Duration::minutes(59)), "59 minutes ago");
        assert_eq!(time_ago(now, now - Duration::hours(2)), "2 hours ago");
        assert_eq!(time_ago(now, now - Duration::days(1)), "1 day ago");
        assert_eq!(time_ago(now, now - Duration::days(6)), "6 days ago");
    }

    #[test]
    fn test_time_ago_falls_back_to_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).single().unwrap_or_default();
        assert_eq!(time_ago(now, now - Duration::days(7)), "Mar 13, 2024");
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(9), "9 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(23), "11 PM");
    }
}
