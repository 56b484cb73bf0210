//! Human-readable timestamp formatting for chatroom lists and message bubbles.

use chrono::{DateTime, Utc};

/// Describe how long ago `ts` was, relative to `now`.
///
/// Under a minute reads "Just now", then minutes, hours and days up to a
/// week; anything older falls back to the calendar date.
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

/// Wall-clock time of a message, `HH:MM`.
pub fn format_clock(ts: DateTime<Utc>) -> String {
    ts.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_is_just_now() {
        assert_eq!(format_relative(now() - Duration::seconds(30), now()), "Just now");
        // Clock skew must not produce negative output.
        assert_eq!(format_relative(now() + Duration::seconds(5), now()), "Just now");
    }

    #[test]
    fn test_minutes_hours_days() {
        assert_eq!(format_relative(now() - Duration::minutes(5), now()), "5m ago");
        assert_eq!(format_relative(now() - Duration::minutes(59), now()), "59m ago");
        assert_eq!(format_relative(now() - Duration::hours(3), now()), "3h ago");
        assert_eq!(format_relative(now() - Duration::days(2), now()), "2d ago");
    }

    #[test]
    fn test_old_falls_back_to_date() {
        assert_eq!(format_relative(now() - Duration::days(10), now()), "2024-03-05");
    }

    #[test]
    fn test_clock() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 9, 7, 42).unwrap();
        assert_eq!(format_clock(ts), "09:07");
    }
}
