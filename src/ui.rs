//! Plain-text digest rendering.
//!
//! Each source renders as a block terminated by a blank line:
//!
//! ```text
//! Hacker News
//!  1 Show HN: A tiny RSS reader
//!    https://example.com/1 - 12 minutes
//!  2 Something else
//!    https://example.com/2 - 3 hours
//! ```
//!
//! The index column is as wide as the total item count, so a feed with 30
//! items pads single-digit indices to two columns even when only five are
//! shown.  Failed sources print their error message in place of the items.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::age::describe_published;
use crate::source::{Feed, FeedItem, Source, SourceError};

/// Items shown per source unless configured otherwise.
pub const DEFAULT_ITEM_LIMIT: usize = 5;

/// Write one source's block: its feed digest or its error.
pub fn render_source(
    out: &mut impl Write,
    source: &Source,
    result: &Result<Feed, SourceError>,
    now: DateTime<Utc>,
    limit: usize,
) -> io::Result<()> {
    match result {
        Ok(feed) => render_feed(out, source, feed, now, limit),
        Err(e) => render_error(out, source, e),
    }
}

fn render_error(out: &mut impl Write, source: &Source, error: &SourceError) -> io::Result<()> {
    writeln!(out, "{}", source.name)?;
    writeln!(out, "{error}")?;
    writeln!(out)
}

fn render_feed(
    out: &mut impl Write,
    source: &Source,
    feed: &Feed,
    now: DateTime<Utc>,
    limit: usize,
) -> io::Result<()> {
    writeln!(out, "{}", source.name)?;

    let width = digit_count(feed.items.len());
    let indent = " ".repeat(width + 1);

    for (i, item) in feed.items.iter().take(limit).enumerate() {
        render_item(out, i + 1, item, width, &indent, now)?;
    }

    writeln!(out)
}

fn render_item(
    out: &mut impl Write,
    index: usize,
    item: &FeedItem,
    width: usize,
    indent: &str,
    now: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(out, "{index:>width$} {}", item.title)?;
    writeln!(
        out,
        "{indent}{} - {}",
        item.link,
        describe_published(now, item.published)
    )
}

/// Decimal digits needed to print `n`; an empty feed still gets one column.
fn digit_count(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}
