//! RSS document parsing.
//!
//! [`parse_feed`] turns a complete RSS 2.0 document into a [`Feed`]: the XML
//! is decoded with the [`rss`](::rss) crate, titles get a second pass of HTML
//! entity decoding (feeds routinely double-escape, e.g. `&amp;#x27;`), dates
//! go through [`parse_date`], and the items are ordered newest first.
//!
//! A bad date never fails the feed.  It is logged and the item is kept with
//! no publication time.

use thiserror::Error;

use super::date::parse_date;
use super::feed_item::{sort_newest_first, Feed, FeedItem};

/// The document is not well-formed XML or is not an `<rss><channel>` document.
#[derive(Debug, Error)]
#[error("failed to parse feed: {0}")]
pub struct ParseError(#[from] ::rss::Error);

/// Parse a complete RSS document.
pub fn parse_feed(body: &str) -> Result<Feed, ParseError> {
    let channel = ::rss::Channel::read_from(body.as_bytes())?;

    Ok(Feed {
        title: decode_entities(channel.title()),
        items: parse_items(channel.items()),
    })
}

/// Convert raw `<item>`s into [`FeedItem`]s, keeping every one of them.
fn parse_items(items: &[::rss::Item]) -> Vec<FeedItem> {
    let mut result: Vec<FeedItem> = items
        .iter()
        .map(|item| {
            let title = decode_entities(item.title().unwrap_or_default());

            // Missing and unrecognised dates are treated the same way.
            let published = match parse_date(item.pub_date().unwrap_or_default()) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::warn!(input = %e.input, title = %title, "Unrecognised item date");
                    None
                }
            };

            FeedItem {
                title,
                link: item.link().unwrap_or_default().to_string(),
                published,
            }
        })
        .collect();

    sort_newest_first(&mut result);
    result
}

/// Decode numeric and named HTML entities left in a text field.
fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
