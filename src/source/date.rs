//! Publication date parsing.
//!
//! RSS dates are nominally RFC 822, but feeds in the wild vary: single-digit
//! days, missing seconds, named zones, day names that contradict the date.
//! [`parse_date`] walks an ordered list of known layouts and returns the
//! first one that matches.

use chrono::{DateTime, FixedOffset, Weekday};
use thiserror::Error;

/// No known layout matched the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse date '{input}'")]
pub struct DateParseError {
    /// The string exactly as it appeared in the feed.
    pub input: String,
}

/// One way of reading a date string.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// A `chrono` strftime pattern that must include a numeric `%z` offset.
    Pattern(&'static str),
    /// chrono's generic RFC 2822 reader (named zones, optional weekday).
    Rfc2822,
    /// Drop a leading `"<weekday>, "` and read the rest with the inner layout.
    /// The weekday must be a real day name but need not agree with the date.
    IgnoreWeekday(&'static Layout),
}

/// Tried in order; the first match wins.
const LAYOUTS: [Layout; 7] = [
    // RFC 1123 with numeric zone, e.g. "Mon, 02 Jan 2006 15:04:05 -0700".
    Layout::Pattern("%a, %d %b %Y %H:%M:%S %z"),
    // Same, single-digit day of month: "Mon, 2 Jan 2006 15:04:05 -0700".
    Layout::Pattern("%a, %-d %b %Y %H:%M:%S %z"),
    Layout::Pattern("%a, %d %b %Y %H:%M %z"),
    Layout::Rfc2822,
    // Feeds that print the wrong day name for the date.
    Layout::IgnoreWeekday(&Layout::Pattern("%d %b %Y %H:%M:%S %z")),
    Layout::IgnoreWeekday(&Layout::Pattern("%d %b %Y %H:%M %z")),
    Layout::IgnoreWeekday(&Layout::Rfc2822),
];

impl Layout {
    fn parse(self, input: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Layout::Pattern(fmt) => DateTime::parse_from_str(input, fmt).ok(),
            Layout::Rfc2822 => DateTime::parse_from_rfc2822(input).ok(),
            Layout::IgnoreWeekday(inner) => {
                let (day, rest) = input.split_once(", ")?;
                day.parse::<Weekday>().ok()?;
                (*inner).parse(rest.trim_start())
            }
        }
    }
}

/// Parse an RSS `pubDate` into an absolute instant.
///
/// The returned value keeps the offset written in the feed; comparisons and
/// arithmetic on it use the absolute instant, so `-0600` and `+0200` dates
/// order correctly against each other.
pub fn parse_date(input: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    let trimmed = input.trim();

    LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(trimmed))
        .ok_or_else(|| DateParseError {
            input: input.to_string(),
        })
}
