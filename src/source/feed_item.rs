//! The normalized feed model.
//!
//! A [`Feed`] is what the parser hands to the renderer: the channel title and
//! its items, newest first.  Everything here is plain data, built once per
//! parse and never mutated afterwards.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};

/// A parsed RSS channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Channel title, entity-decoded.
    pub title: String,
    /// Every `<item>` of the channel, newest first.  Items whose date could
    /// not be parsed are kept and sit at the end.
    pub items: Vec<FeedItem>,
}

/// A single feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Headline with HTML entities decoded.
    pub title: String,

    /// URL of the entry.  Empty when the feed omits `<link>`.
    pub link: String,

    /// Publication time with the offset the feed used.
    ///
    /// `None` means the `<pubDate>` was missing or matched no known layout.
    pub published: Option<DateTime<FixedOffset>>,
}

impl FeedItem {
    /// Reverse-chronological comparison: newer items come first and undated
    /// items come after every dated one.
    pub fn newest_first(a: &FeedItem, b: &FeedItem) -> Ordering {
        // `None < Some(_)`, so comparing `b` against `a` sinks undated items.
        b.published.cmp(&a.published)
    }
}

/// Stable newest-first sort; items with equal dates keep document order.
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by(FeedItem::newest_first);
}
