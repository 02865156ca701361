//! Relative "time ago" formatting for status timestamps.

use chrono::{DateTime, Utc};

/// Largest whole unit only: `45s ago`, `2m ago`, `3h ago`, `1d ago`.
///
/// Units are floor-divided; there is no week or month granularity. A
/// timestamp in the future (clock skew) reads as `0s ago`.
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 60 {
        return format!("{}s ago", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}
