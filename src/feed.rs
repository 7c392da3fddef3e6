//! Source feed retrieval and decoding.
//!
//! This module fetches the source feed over HTTP and decodes it into [`FeedEntry`] values.
//! Both RSS 2.0 and Atom documents are accepted. Every entry must carry a link and a
//! parseable publication date: a single bad entry fails the whole decode, because the
//! newest-first selection would otherwise be computed over a partial list.

use crate::error::{Error, Result};
use crate::types::FeedEntry;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::time::Duration;
use tracing::debug;

/// Something that can produce the current list of feed entries
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and decode the feed
    ///
    /// # Errors
    /// Returns error if the feed cannot be retrieved or any entry cannot be decoded
    async fn fetch(&self) -> Result<Vec<FeedEntry>>;
}

/// Feed source that performs an HTTP GET of a fixed URL
pub struct HttpFeedSource {
    /// HTTP client for fetching the feed
    http_client: reqwest::Client,

    /// Feed URL
    url: String,
}

impl HttpFeedSource {
    /// Create a source for `url`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("livestream-grabber/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// Feed URL this source polls
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        debug!(url = %self.url, "fetching feed");

        let response = self.http_client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Feed(format!(
                "feed returned HTTP {}: {}",
                status.as_u16(),
                self.url
            )));
        }

        let content = response.text().await?;

        parse_feed(&content)
    }
}

/// Decode a feed document, trying RSS first and Atom second
pub fn parse_feed(content: &str) -> Result<Vec<FeedEntry>> {
    match parse_as_rss(content) {
        Ok(entries) => {
            debug!("parsed as RSS, found {} entries", entries.len());
            Ok(entries)
        }
        // A well-formed RSS document with a bad entry must not fall through to Atom
        Err(RssDecode::Entry(e)) => Err(e),
        Err(RssDecode::Document(rss_err)) => {
            debug!("failed to parse as RSS: {}, trying Atom", rss_err);
            match parse_as_atom(content) {
                Ok(entries) => {
                    debug!("parsed as Atom, found {} entries", entries.len());
                    Ok(entries)
                }
                Err(Error::Feed(atom_err)) => Err(Error::Feed(format!(
                    "Failed to parse feed as RSS or Atom. RSS error: {}. Atom error: {}",
                    rss_err, atom_err
                ))),
                Err(e) => Err(e),
            }
        }
    }
}

/// Order entries most recent first; entries with equal dates keep their feed order
pub fn sort_newest_first(entries: &mut [FeedEntry]) {
    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Parse an RFC-822 date such as `Mon, 02 Jan 2006 15:04:05 MST`
pub fn parse_pub_date(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(value.trim())
        .map_err(|e| Error::Feed(format!("invalid pubDate '{}': {}", value, e)))
}

/// Links are stored one per line, so a line break would split the record entry
fn check_link(link: &str) -> Result<()> {
    if link.contains(['\n', '\r']) {
        return Err(Error::Feed(format!("link {:?} contains a line break", link)));
    }
    Ok(())
}

enum RssDecode {
    Document(String),
    Entry(Error),
}

fn parse_as_rss(content: &str) -> std::result::Result<Vec<FeedEntry>, RssDecode> {
    let channel = content
        .parse::<rss::Channel>()
        .map_err(|e| RssDecode::Document(e.to_string()))?;

    channel
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let title = item.title().unwrap_or("").to_string();

            let link = item.link().map(|l| l.trim().to_string()).ok_or_else(|| {
                Error::Feed(format!("item {} ('{}') has no link", index, title))
            })?;
            check_link(&link)?;

            let pub_date = item.pub_date().ok_or_else(|| {
                Error::Feed(format!("item {} ('{}') has no pubDate", index, title))
            })?;

            Ok(FeedEntry {
                published_at: parse_pub_date(pub_date)?,
                description: item.description().unwrap_or("").to_string(),
                title,
                link,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map_err(RssDecode::Entry)
}

fn parse_as_atom(content: &str) -> Result<Vec<FeedEntry>> {
    let feed = atom_syndication::Feed::read_from(content.as_bytes())
        .map_err(|e| Error::Feed(format!("Atom parse error: {}", e)))?;

    feed.entries()
        .iter()
        .map(|entry| {
            let title = entry.title().as_str().to_string();

            let link = entry
                .links()
                .first()
                .map(|link| link.href().to_string())
                .ok_or_else(|| Error::Feed(format!("entry '{}' has no link", title)))?;
            check_link(&link)?;

            // Prefer published, fall back to updated; round-trip through RFC 3339 so the
            // value does not depend on the chrono version atom_syndication was built with
            let raw_date = entry.published().unwrap_or(entry.updated()).to_rfc3339();
            let published_at = DateTime::parse_from_rfc3339(&raw_date)
                .map_err(|e| Error::Feed(format!("invalid date '{}': {}", raw_date, e)))?;

            let description = entry
                .summary()
                .map(|s| s.as_str().to_string())
                .or_else(|| {
                    entry
                        .content()
                        .and_then(|c| c.value().map(|v| v.to_string()))
                })
                .unwrap_or_default();

            Ok(FeedEntry {
                title,
                link,
                description,
                published_at,
            })
        })
        .collect()
}
