//! Error types for livestream-grabber
//!
//! This module provides error handling for the whole run:
//! - A top-level [`Error`] with one variant per failing concern (config, feed, store, tool, publish)
//! - Nested [`StoreError`] and [`PublishError`] enums carrying the path that failed
//! - A [`Result`] alias used throughout the crate
//!
//! Fatal conditions bubble up to [`crate::Grabber::run_once`] and abort the run. Per-job
//! extraction failures are reported through events and logs and never reach the caller
//! as an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for livestream-grabber operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for livestream-grabber
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "concurrency_limit")
        key: Option<String>,
    },

    /// Configuration file could not be parsed
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error while fetching the source feed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Output directory could not be created
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// The configured output directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Feed could not be fetched or decoded
    #[error("feed error: {0}")]
    Feed(String),

    /// Processed-items record could not be read or appended to
    #[error("processed store error: {0}")]
    Store(#[from] StoreError),

    /// Output feed could not be generated
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// External tool execution failed (yt-dlp, etc.)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Processed-items record errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record exists but could not be read
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        /// Path of the record file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Link could not be appended to the record
    #[error("failed to append {link} to {path}: {source}")]
    AppendFailed {
        /// Path of the record file
        path: PathBuf,
        /// The link that was being recorded
        link: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Feed publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Output directory could not be listed
    #[error("failed to read output directory {path}: {source}")]
    ReadDir {
        /// The output directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Feed document could not be serialized
    #[error("failed to serialize feed: {0}")]
    Serialize(String),

    /// Feed document could not be written
    #[error("failed to write feed {path}: {source}")]
    Write {
        /// Destination of the feed document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An existing feed document could not be read
    #[error("failed to read feed {path}: {source}")]
    Read {
        /// The feed document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An existing feed document could not be parsed for cleaning
    #[error("failed to parse existing feed {path}: {reason}")]
    Parse {
        /// The feed document that was read
        path: PathBuf,
        /// Parser error message
        reason: String,
    },
}

impl Error {
    /// Machine-readable error code, used as a structured logging field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } | Error::ConfigParse(_) => "config_error",
            Error::Io(_) | Error::OutputDir { .. } => "io_error",
            Error::Network(_) => "network_error",
            Error::Feed(_) => "feed_error",
            Error::Store(_) => "store_error",
            Error::Publish(_) => "publish_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}
