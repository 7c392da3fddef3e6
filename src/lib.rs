//! # livestream-grabber
//!
//! Turns the newest entries of a video feed into a local audio podcast.
//!
//! ## Design Philosophy
//!
//! livestream-grabber is designed to be:
//! - **Batch-oriented** - One invocation is one run; schedule it with cron or a timer
//! - **Idempotent** - Links are recorded when dispatched, so re-runs never repeat work
//! - **Bounded** - At most `concurrency_limit` extraction jobs run at once
//! - **Regenerative** - The output feed is rebuilt from the directory on every run
//!
//! ## Quick Start
//!
//! ```no_run
//! use livestream_grabber::{Config, Event, Grabber};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         feed_url: "https://example.com/feeds/videos.xml".to_string(),
//!         concurrency_limit: 2,
//!         ..Default::default()
//!     };
//!
//!     let grabber = Grabber::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = grabber.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::JobFailed { link, error, .. } = event {
//!                 eprintln!("{link} failed: {error}");
//!             }
//!         }
//!     });
//!
//!     let summary = grabber.run_once().await?;
//!     println!("dispatched {} new entries", summary.dispatched);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Download dispatcher
pub mod dispatcher;
/// Error types
pub mod error;
/// External audio extraction
pub mod extractor;
/// Source feed retrieval
pub mod feed;
/// Run orchestration
pub mod grabber;
/// Processed-items record
pub mod processed;
/// Podcast feed generation
pub mod publisher;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, PublishConfig, ShowConfig, ToolsConfig};
pub use dispatcher::{Dispatcher, derive_title};
pub use error::{Error, PublishError, Result, StoreError};
pub use extractor::{AudioExtractor, CliExtractor};
pub use feed::{FeedSource, HttpFeedSource};
pub use grabber::Grabber;
pub use processed::ProcessedStore;
pub use publisher::{FeedPublisher, clean_feed_file, clean_text};
pub use types::{DispatchOutcome, DownloadJob, Event, FeedEntry, RunSummary, TitleDescriptions};
