//! Relative age strings ("5 minutes", "3 hours").

use chrono::{DateTime, FixedOffset, Utc};

/// Shown when the age is unknown or would be negative.
pub const UNKNOWN_AGE: &str = "-";

/// Describe how long before `now` the `reference` instant was.
///
/// The difference is rounded to the nearest minute (half away from zero).
/// Under an hour it is reported in minutes; from 60 minutes on it is whole
/// hours, truncated.  There are no day or week units: two days reads
/// "48 hours".  A `reference` after `now` yields [`UNKNOWN_AGE`].
pub fn format_age(now: DateTime<Utc>, reference: DateTime<Utc>) -> String {
    let millis = now.signed_duration_since(reference).num_milliseconds();
    let minutes = (millis as f64 / 60_000.0).round() as i64;

    match minutes {
        m if m < 0 => UNKNOWN_AGE.to_string(),
        1 => "1 minute".to_string(),
        m if m < 60 => format!("{m} minutes"),
        m => match m / 60 {
            1 => "1 hour".to_string(),
            h => format!("{h} hours"),
        },
    }
}

/// Age of an item's publication time; undated items read as [`UNKNOWN_AGE`].
pub fn describe_published(now: DateTime<Utc>, published: Option<DateTime<FixedOffset>>) -> String {
    match published {
        Some(date) => format_age(now, date.with_timezone(&Utc)),
        None => UNKNOWN_AGE.to_string(),
    }
}
