//! Human-readable ages for commit listings.

use chrono::{DateTime, Utc};

use crate::activity::parse_commit_timestamp;

/// Describe how long ago `at` was, relative to `now`.
///
/// Under a minute (or in the future) is `just now`; then minutes, hours and
/// days up to 30 days; anything older is shown as its UTC calendar date.
#[must_use]
pub fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} {} ago", plural(minutes, "minute"))
    } else if hours < 24 {
        format!("{hours} {} ago", plural(hours, "hour"))
    } else if days < 30 {
        format!("{days} {} ago", plural(days, "day"))
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// [`relative_age`] for a raw timestamp string. Unparseable input is
/// returned unchanged; a missing timestamp renders as an em dash.
#[must_use]
pub fn relative_age_raw(raw: Option<&str>, now: DateTime<Utc>) -> String {
    match raw {
        None => "\u{2014}".to_string(),
        Some(raw) => parse_commit_timestamp(raw)
            .map_or_else(|| raw.to_string(), |at| relative_age(at, now)),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}
