//! Podcast feed generation from the output directory.
//!
//! The feed is rebuilt from scratch on every run: whatever audio files are in the output
//! directory at that moment become the items, in file-name order. Descriptions come from
//! the title → description map assembled by the dispatcher; files from earlier runs fall
//! back to a placeholder.

use crate::config::PublishConfig;
use crate::error::{PublishError, Result};
use crate::types::TitleDescriptions;
use chrono::{DateTime, Utc};
use rss::extension::itunes::{
    ITunesCategoryBuilder, ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder,
};
use rss::{Channel, ChannelBuilder, EnclosureBuilder, ItemBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// RFC-822 date layout used for item `pubDate`
const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Indentation of the written feed document
const INDENT_SIZE: usize = 4;

/// Audio file discovered in the output directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioArtifact {
    /// File name including extension
    pub file_name: String,
    /// File name without extension; the dispatcher's derived title
    pub title: String,
    /// Size on disk in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Result of a publish pass
#[derive(Clone, Debug)]
pub struct PublishedFeed {
    /// Where the feed was written
    pub path: PathBuf,
    /// Number of items in the feed
    pub items: usize,
}

/// Writes the podcast feed for an output directory
pub struct FeedPublisher {
    output_dir: PathBuf,
    config: PublishConfig,
}

impl FeedPublisher {
    /// Create a publisher for `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>, config: PublishConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    /// Path of the feed document this publisher writes
    pub fn feed_path(&self) -> PathBuf {
        self.output_dir.join(&self.config.feed_file_name)
    }

    /// List the audio files in the output directory, sorted by file name
    ///
    /// # Errors
    /// Returns [`PublishError::ReadDir`] if the directory cannot be listed
    pub async fn scan(&self) -> Result<Vec<AudioArtifact>> {
        let read_dir_err = |source| PublishError::ReadDir {
            path: self.output_dir.clone(),
            source,
        };

        let mut dir = tokio::fs::read_dir(&self.output_dir)
            .await
            .map_err(read_dir_err)?;

        let mut artifacts = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(read_dir_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str())
                != Some(self.config.audio_extension.as_str())
            {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            let (Some(file_name), Some(title)) = (
                path.file_name().and_then(|n| n.to_str()),
                path.file_stem().and_then(|s| s.to_str()),
            ) else {
                warn!(path = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };

            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            artifacts.push(AudioArtifact {
                file_name: file_name.to_string(),
                title: title.to_string(),
                size: metadata.len(),
                modified,
            });
        }

        artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(
            dir = %self.output_dir.display(),
            count = artifacts.len(),
            "scanned output directory"
        );
        Ok(artifacts)
    }

    /// Build the channel for a set of artifacts
    pub fn build_channel(
        &self,
        artifacts: &[AudioArtifact],
        descriptions: &TitleDescriptions,
    ) -> Channel {
        let show = &self.config.show;

        let items = artifacts
            .iter()
            .map(|artifact| {
                let description = descriptions
                    .get(&artifact.title)
                    .cloned()
                    .unwrap_or_else(|| self.config.placeholder_description.clone());
                let url = self.enclosure_url(&artifact.file_name);

                ItemBuilder::default()
                    .title(Some(self.text(&artifact.title)))
                    .link(Some(url.clone()))
                    .description(Some(self.text(&description)))
                    .pub_date(Some(artifact.modified.format(PUB_DATE_FORMAT).to_string()))
                    .enclosure(Some(
                        EnclosureBuilder::default()
                            .url(url)
                            .length(artifact.size.to_string())
                            .mime_type(self.config.mime_type.clone())
                            .build(),
                    ))
                    .itunes_ext(Some(
                        ITunesItemExtensionBuilder::default()
                            .explicit(Some("no".to_string()))
                            .build(),
                    ))
                    .build()
            })
            .collect::<Vec<_>>();

        ChannelBuilder::default()
            .title(show.title.clone())
            .link(show.link.clone())
            .description(show.description.clone())
            .language(Some(show.language.clone()))
            .itunes_ext(Some(
                ITunesChannelExtensionBuilder::default()
                    .author(Some(show.author.clone()))
                    .explicit(Some(yes_no(show.explicit).to_string()))
                    .image(Some(show.image_url.clone()))
                    .categories(vec![
                        ITunesCategoryBuilder::default()
                            .text(show.category.clone())
                            .build(),
                    ])
                    .build(),
            ))
            .items(items)
            .build()
    }

    /// Regenerate the feed document from the current directory contents
    ///
    /// The document is written next to its final location and renamed into place, so
    /// readers never see a half-written feed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be listed or the feed cannot be written
    pub async fn publish(&self, descriptions: &TitleDescriptions) -> Result<PublishedFeed> {
        let artifacts = self.scan().await?;
        let channel = self.build_channel(&artifacts, descriptions);

        let path = self.feed_path();
        write_channel(&channel, &path).await?;

        info!(path = %path.display(), items = artifacts.len(), "published podcast feed");
        Ok(PublishedFeed {
            path,
            items: artifacts.len(),
        })
    }

    fn enclosure_url(&self, file_name: &str) -> String {
        format!("{}{}", self.config.base_url, urlencoding::encode(file_name))
    }

    fn text(&self, value: &str) -> String {
        if self.config.clean_text {
            clean_text(value)
        } else {
            value.to_string()
        }
    }
}

/// Make a title or description readable
///
/// Underscores become spaces and HTML entities are decoded. `&#39;` is replaced once more
/// after decoding to catch double-encoded apostrophes.
///
/// # Examples
///
/// ```
/// use livestream_grabber::publisher::clean_text;
///
/// assert_eq!(clean_text("Linux_Unplugged_500"), "Linux Unplugged 500");
/// assert_eq!(clean_text("Rock &amp; Roll"), "Rock & Roll");
/// assert_eq!(clean_text("It&amp;#39;s"), "It's");
/// ```
#[must_use]
pub fn clean_text(text: &str) -> String {
    let text = text.replace('_', " ");
    html_escape::decode_html_entities(&text).replace("&#39;", "'")
}

/// Clean every item title and description of an existing feed document in place
///
/// # Errors
/// Returns error if the feed cannot be read, parsed, or written back
pub async fn clean_feed_file(path: &Path) -> Result<usize> {
    let content = tokio::fs::read(path).await.map_err(|source| PublishError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut channel = Channel::read_from(&content[..]).map_err(|e| PublishError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    for item in channel.items_mut() {
        let title = item.title().map(clean_text);
        let description = item.description().map(clean_text);
        item.set_title(title);
        item.set_description(description);
    }

    write_channel(&channel, path).await?;

    let count = channel.items().len();
    info!(path = %path.display(), items = count, "cleaned feed text");
    Ok(count)
}

async fn write_channel(channel: &Channel, path: &Path) -> Result<()> {
    let xml = channel
        .pretty_write_to(Vec::new(), b' ', INDENT_SIZE)
        .map_err(|e| PublishError::Serialize(e.to_string()))?;

    let write_err = |source| PublishError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp, &xml).await.map_err(write_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(write_err)?;
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
