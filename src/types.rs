//! Core types and events for livestream-grabber

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::path::PathBuf;

/// One entry of the source feed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title
    pub title: String,
    /// Entry link, used as the unique identifier
    pub link: String,
    /// Entry description; its first colon-delimited segment names the audio file
    pub description: String,
    /// Publication timestamp
    pub published_at: DateTime<FixedOffset>,
}

/// A single extraction attempt for one dispatched entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadJob {
    /// Source link handed to the extractor
    pub link: String,
    /// Filesystem-safe title derived from the description
    pub title: String,
    /// Output path without extension; the extractor picks the final extension
    pub output_stem: PathBuf,
}

/// Derived title → original description, assembled while dispatching
pub type TitleDescriptions = HashMap<String, String>;

/// Result of one dispatcher pass
///
/// Carries counts only. Individual job failures are reported through
/// [`Event::JobFailed`] and the log.
#[derive(Clone, Debug, Default)]
pub struct DispatchOutcome {
    /// Descriptions of every dispatched entry keyed by derived title
    pub descriptions: TitleDescriptions,
    /// Entries marked processed and handed to the extractor
    pub dispatched: usize,
    /// Entries skipped because their link was already processed
    pub skipped: usize,
    /// Jobs whose extractor run succeeded
    pub succeeded: usize,
    /// Jobs whose extractor run failed
    pub failed: usize,
}

/// Summary of a complete run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries decoded from the source feed
    pub fetched: usize,
    /// Entries dispatched this run
    pub dispatched: usize,
    /// Entries skipped as already processed
    pub skipped: usize,
    /// Successful extraction jobs
    pub succeeded: usize,
    /// Failed extraction jobs
    pub failed: usize,
    /// Items written into the generated feed
    pub published: usize,
}

/// Events emitted during a run
///
/// Subscribe with [`crate::Grabber::subscribe`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A run started polling the feed
    RunStarted {
        /// Source feed URL
        feed_url: String,
    },

    /// Entry skipped because its link is in the processed record
    AlreadyProcessed {
        /// Entry link
        link: String,
    },

    /// Entry marked processed and handed to the extractor
    Dispatched {
        /// Entry link
        link: String,
        /// Derived title
        title: String,
    },

    /// Extraction job finished successfully
    JobCompleted {
        /// Entry link
        link: String,
        /// Derived title
        title: String,
    },

    /// Extraction job failed; the link stays processed
    JobFailed {
        /// Entry link
        link: String,
        /// Derived title
        title: String,
        /// Error message
        error: String,
    },

    /// Output feed regenerated
    FeedPublished {
        /// Path of the feed document
        path: PathBuf,
        /// Number of items in the feed
        items: usize,
    },
}
