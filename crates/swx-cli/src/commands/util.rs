//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, Local, LocalResult, NaiveTime, TimeZone, Utc};
use regex::Regex;
use swx_core::{TimeFormat, TimePoint};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a time given on the command line.
///
/// Supports:
/// - The log's timestamp format: "2026-01-15T10:30"
/// - The short format, taken as today in local time: "10:30"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_time(
    s: &str,
    format: &TimeFormat,
    short_format: &str,
    now: TimePoint,
) -> anyhow::Result<TimePoint> {
    let s = s.trim();
    if let Ok(time) = format.parse(s) {
        return Ok(time);
    }

    if let Ok(time_of_day) = NaiveTime::parse_from_str(s, short_format) {
        let today = now.with_timezone(&Local).date_naive();
        return match Local.from_local_datetime(&today.and_time(time_of_day)) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
            LocalResult::None => anyhow::bail!("{s} does not exist today in the local time zone"),
        };
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid time: {s}. Use {} (e.g., {}), {short_format}, or relative (e.g., '2 hours ago')",
            format.pattern(),
            format.format(now)
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    // Safe to create Duration now that we've validated the range
    let duration = Duration::minutes(n * minutes_per_unit);
    Ok(now - duration)
}

/// Formats a duration as "Xh Ym" if at least an hour, "Xm" otherwise.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Joins command-line words into an activity name.
pub fn activity_name(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}
