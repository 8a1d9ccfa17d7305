//! HTTP feed source.
//!
//! Downloads the feed with [`reqwest`] and parses it with the [`rss`] crate.
//! Documents the RSS parser rejects (Atom, RDF, JSON Feed) are handed to
//! [`feed_rs`] before giving up.  Parsing is split from I/O so tests can feed
//! fixture XML straight into [`RssSource::parse_document`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{Entry, FeedSource};
use crate::error::{RelayError, Result};

/// Title used when the feed omits one.
const UNTITLED: &str = "(untitled)";

/// A feed fetched over HTTP.
pub struct RssSource {
    /// The feed URL to poll.
    url: String,
    /// Label used in log lines.
    label: String,
    client: reqwest::Client,
}

impl RssSource {
    /// Create a new source with its own HTTP client.
    ///
    /// # Arguments
    ///
    /// * `url`: full URL of the feed.
    /// * `label`: short name used in logs.
    /// * `timeout`: total request timeout.
    /// * `user_agent`: `User-Agent` header sent with every request.
    pub fn new(
        url: impl Into<String>,
        label: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            label: label.into(),
            client,
        })
    }

    /// Parse a raw feed body, RSS first, then any format `feed-rs` knows.
    pub fn parse_document(body: &[u8]) -> Result<Vec<Entry>> {
        match ::rss::Channel::read_from(body) {
            Ok(channel) => Ok(Self::parse_channel(&channel)),
            Err(rss_err) => {
                debug!("not an RSS 2.0 document ({rss_err}), trying feed-rs");
                let feed = feed_rs::parser::parse(body)
                    .map_err(|e| RelayError::Fetch(format!("unparseable feed: {e}")))?;
                Ok(Self::parse_feed(feed))
            }
        }
    }

    /// Convert an already-parsed [`rss::Channel`] into [`Entry`] values.
    pub fn parse_channel(channel: &::rss::Channel) -> Vec<Entry> {
        channel
            .items()
            .iter()
            .map(|item| {
                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                Entry {
                    guid: item.guid().map(|g| g.value().to_string()),
                    title: item.title().unwrap_or(UNTITLED).to_string(),
                    link: item.link().map(String::from),
                    published,
                }
            })
            .collect()
    }

    /// Convert a `feed-rs` model (Atom and friends) into [`Entry`] values.
    fn parse_feed(feed: feed_rs::model::Feed) -> Vec<Entry> {
        feed.entries
            .into_iter()
            .map(|entry| Entry {
                guid: Some(entry.id).filter(|id| !id.is_empty()),
                title: entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| UNTITLED.to_string()),
                link: entry.links.first().map(|l| l.href.clone()),
                published: entry.published.or(entry.updated),
            })
            .collect()
    }
}

impl FeedSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<Entry>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Fetch(format!("{}: HTTP {status}", self.url)));
        }

        let body = response.bytes().await?;
        Self::parse_document(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
