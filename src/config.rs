//! Configuration types for livestream-grabber

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "GRABBER_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is not set
pub const DEFAULT_CONFIG_PATH: &str = "grabber.toml";

/// External extraction tool configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Deserialize)]
pub struct ToolsConfig {
    /// Path to the extractor executable (auto-detected if None)
    #[serde(default)]
    pub extractor_path: Option<PathBuf>,

    /// Whether to search PATH for the extractor if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Audio format requested from the extractor (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Extra arguments passed to the extractor before the source link
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            extractor_path: None,
            search_path: true,
            audio_format: default_audio_format(),
            extra_args: Vec::new(),
        }
    }
}

/// Fixed show metadata written into the channel of the generated feed
#[derive(Clone, Debug, Deserialize)]
pub struct ShowConfig {
    /// Channel title
    #[serde(default = "default_show_title")]
    pub title: String,

    /// Channel link
    #[serde(default = "default_show_link")]
    pub link: String,

    /// Channel description
    #[serde(default = "default_show_description")]
    pub description: String,

    /// Channel language (default: "en-us")
    #[serde(default = "default_language")]
    pub language: String,

    /// `itunes:author`
    #[serde(default = "default_show_author")]
    pub author: String,

    /// `itunes:explicit` (default: false)
    #[serde(default)]
    pub explicit: bool,

    /// `itunes:image` href
    #[serde(default = "default_image_url")]
    pub image_url: String,

    /// Single `itunes:category` (default: "Technology")
    #[serde(default = "default_category")]
    pub category: String,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            title: default_show_title(),
            link: default_show_link(),
            description: default_show_description(),
            language: default_language(),
            author: default_show_author(),
            explicit: false,
            image_url: default_image_url(),
            category: default_category(),
        }
    }
}

/// Output feed configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Deserialize)]
pub struct PublishConfig {
    /// Public URL prefix under which the output directory is served
    ///
    /// Enclosure URLs are `base_url` followed by the percent-encoded file name.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// File name of the generated feed inside the output directory
    #[serde(default = "default_feed_file_name")]
    pub feed_file_name: String,

    /// Extension of the audio files to publish, without the dot (default: "mp3")
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    /// Enclosure MIME type (default: "audio/mpeg")
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Description used for files with no known description
    #[serde(default = "default_placeholder_description")]
    pub placeholder_description: String,

    /// Replace underscores and decode HTML entities in titles and descriptions (default: true)
    #[serde(default = "default_true")]
    pub clean_text: bool,

    /// Channel metadata
    #[serde(default)]
    pub show: ShowConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            feed_file_name: default_feed_file_name(),
            audio_extension: default_audio_extension(),
            mime_type: default_mime_type(),
            placeholder_description: default_placeholder_description(),
            clean_text: true,
            show: ShowConfig::default(),
        }
    }
}

/// Main configuration for [`crate::Grabber`]
///
/// Every field has a default, so an empty TOML file (or no file at all) yields a
/// working configuration pointed at the default feed.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Source feed to poll
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Processed-items record (one link per line)
    #[serde(default = "default_record_path")]
    pub record_path: PathBuf,

    /// Directory receiving audio files and the generated feed
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum simultaneous extraction jobs (default: 5)
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// How many of the newest entries are considered per run (default: 3)
    #[serde(default = "default_newest_count")]
    pub newest_count: usize,

    /// External extraction tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Generated feed settings
    #[serde(default)]
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            record_path: default_record_path(),
            output_dir: default_output_dir(),
            concurrency_limit: default_concurrency_limit(),
            newest_count: default_newest_count(),
            tools: ToolsConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    /// Parse a TOML config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML for [`Config`]
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the configuration for a run
    ///
    /// Reads the file named by `GRABBER_CONFIG` (default `grabber.toml`). A missing file
    /// yields the defaults. `GRABBER_FEED_URL` and `GRABBER_OUTPUT_DIR` override the
    /// corresponding fields. The result is validated before it is returned.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            tracing::debug!(path = %path.display(), "loading config file");
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("GRABBER_FEED_URL") {
            self.feed_url = url;
        }
        if let Ok(dir) = std::env::var("GRABBER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Check the settings that would otherwise fail late in a run
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(config_error(
                "concurrency_limit",
                "must be at least 1".to_string(),
            ));
        }
        if self.newest_count == 0 {
            return Err(config_error("newest_count", "must be at least 1".to_string()));
        }

        url::Url::parse(&self.feed_url)
            .map_err(|e| config_error("feed_url", format!("invalid URL '{}': {}", self.feed_url, e)))?;
        url::Url::parse(&self.publish.base_url).map_err(|e| {
            config_error(
                "publish.base_url",
                format!("invalid URL '{}': {}", self.publish.base_url, e),
            )
        })?;

        let ext = self.publish.audio_extension.trim();
        if ext.is_empty() || ext.starts_with('.') {
            return Err(config_error(
                "publish.audio_extension",
                "must be a bare extension such as \"mp3\"".to_string(),
            ));
        }
        if self.publish.feed_file_name.trim().is_empty() {
            return Err(config_error(
                "publish.feed_file_name",
                "must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of the generated feed document
    pub fn feed_path(&self) -> PathBuf {
        self.output_dir.join(&self.publish.feed_file_name)
    }
}

fn config_error(key: &str, message: String) -> Error {
    Error::Config {
        message: format!("{}: {}", key, message),
        key: Some(key.to_string()),
    }
}

fn default_true() -> bool {
    true
}

fn default_feed_url() -> String {
    "https://jupiter.tube/feeds/videos.xml".into()
}

fn default_record_path() -> PathBuf {
    PathBuf::from("processed_items.txt")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("podcasts")
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_newest_count() -> usize {
    3
}

fn default_audio_format() -> String {
    "mp3".into()
}

fn default_base_url() -> String {
    "http://localhost/podcasts/".into()
}

fn default_feed_file_name() -> String {
    "podcast_feed.xml".into()
}

fn default_audio_extension() -> String {
    "mp3".into()
}

fn default_mime_type() -> String {
    "audio/mpeg".into()
}

fn default_placeholder_description() -> String {
    "No description available".into()
}

fn default_show_title() -> String {
    "Jupiter Broadcasting Livestreams".into()
}

fn default_show_link() -> String {
    "https://jupiter.tube".into()
}

fn default_show_description() -> String {
    "The latest Jupiter Broadcasting livestreams in MP3 form.".into()
}

fn default_language() -> String {
    "en-us".into()
}

fn default_show_author() -> String {
    "Jupiter Broadcasting".into()
}

fn default_image_url() -> String {
    "https://static.feedpress.com/logo/allshows-5ca8d355b9812.png".into()
}

fn default_category() -> String {
    "Technology".into()
}
