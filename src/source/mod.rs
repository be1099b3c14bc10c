//! Feed sources and the feed model.
//!
//! A [`Source`] is a named feed URL.  Fetched bodies are turned into a
//! [`Feed`] by [`parse_feed`]; the sub-modules split that work up:
//!
//! * [`date`]: `<pubDate>` parsing against an ordered list of layouts.
//! * [`feed_item`]: [`Feed`] / [`FeedItem`] and their newest-first ordering.
//! * [`rss`](self::rss): XML decoding and normalization.

mod date;
mod feed_item;
mod rss;

pub use feed_item::{Feed, FeedItem};
pub use self::rss::{parse_feed, ParseError};

use std::str::FromStr;

use thiserror::Error;

use crate::fetch::FetchError;

/// A named feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Heading printed above the feed's items.
    pub name: String,
    /// URL of the RSS document.
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A `--feed` argument that is not of the form `NAME=URL`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceParseError {
    #[error("expected NAME=URL, got '{0}'")]
    MissingSeparator(String),
    #[error("missing feed name in '{0}'")]
    MissingName(String),
    #[error("missing feed URL in '{0}'")]
    MissingUrl(String),
}

/// Parses the command-line form `NAME=URL`.  The first `=` separates the two,
/// so URLs with query strings are fine.
impl FromStr for Source {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| SourceParseError::MissingSeparator(s.to_string()))?;
        let (name, url) = (name.trim(), url.trim());

        if name.is_empty() {
            return Err(SourceParseError::MissingName(s.to_string()));
        }
        if url.is_empty() {
            return Err(SourceParseError::MissingUrl(s.to_string()));
        }
        Ok(Source::new(name, url))
    }
}

/// The feeds shown when none are given on the command line.
pub fn default_sources() -> Vec<Source> {
    vec![
        Source::new(
            "Yle",
            "https://feeds.yle.fi/uutiset/v1/majorHeadlines/YLE_UUTISET.rss",
        ),
        Source::new("Hacker News", "https://news.ycombinator.com/rss"),
        Source::new("Lobsters", "https://lobste.rs/rss"),
    ]
}

/// Why a source has no digest: it could not be fetched or not be parsed.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parse a fetch result into a feed, folding both failure kinds together.
pub fn load_feed(body: Result<String, FetchError>) -> Result<Feed, SourceError> {
    let body = body?;
    Ok(parse_feed(&body)?)
}
