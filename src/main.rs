//! news-digest: a short, newest-first digest of several RSS feeds.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  bodies   ┌──────────┐  Feed   ┌──────────┐
//! │ fetch.rs │ ────────► │ source/  │ ──────► │  ui.rs   │
//! │ (tasks)  │ (ordered) │ (parse)  │         │ (render) │
//! └──────────┘           └──────────┘         └──────────┘
//!                                                  │
//!                                             ┌──────────┐
//!                                             │  age.rs  │
//!                                             └──────────┘
//! ```
//!
//! * **`fetch`**: one tokio task per source; results come back in source
//!   order and failures stay with their own source.
//! * **`source/`**: source configuration, RSS parsing, date parsing and the
//!   normalized [`Feed`](source::Feed) model.
//! * **`age`**: "12 minutes" / "3 hours" strings.
//! * **`ui`**: writes each source's block to stdout.
//! * **`main`**: parses arguments, sets up logging and wires the stages.

mod age;
mod fetch;
mod source;
mod ui;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fetch::HttpFetcher;
use source::Source;

#[derive(Parser, Debug)]
#[command(name = "news-digest", about = "Print the latest items of several RSS feeds")]
struct Args {
    /// Feed to show, as NAME=URL.  Repeat for more feeds; replaces the
    /// built-in list.
    #[arg(long = "feed", value_name = "NAME=URL")]
    feeds: Vec<Source>,

    /// Number of most recent items shown per feed
    #[arg(long, value_name = "N", default_value_t = ui::DEFAULT_ITEM_LIMIT)]
    items: usize,

    /// Give up on a feed after this many seconds (default: wait indefinitely)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the digest.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let sources = if args.feeds.is_empty() {
        source::default_sources()
    } else {
        args.feeds
    };

    let fetcher = HttpFetcher::new(args.timeout.map(Duration::from_secs))
        .context("Failed to build HTTP client")?;

    tracing::info!(sources = sources.len(), "Fetching feeds");
    let bodies = fetch::fetch_all(Arc::new(fetcher), &sources).await;

    let now = Utc::now();
    let mut out = io::stdout().lock();

    for (source, body) in sources.iter().zip(bodies) {
        let result = source::load_feed(body);
        match &result {
            Ok(feed) => tracing::info!(
                source = %source.name,
                title = %feed.title,
                items = feed.items.len(),
                "Parsed feed"
            ),
            Err(e) => tracing::warn!(source = %source.name, error = %e, "Feed unavailable"),
        }

        ui::render_source(&mut out, source, &result, now, args.items)
            .context("Failed to write digest")?;
    }

    out.flush().context("Failed to flush stdout")?;
    Ok(())
}
