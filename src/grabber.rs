//! One complete grab run: fetch, dispatch, publish.

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::extractor::{self, AudioExtractor};
use crate::feed::{FeedSource, HttpFeedSource};
use crate::processed::ProcessedStore;
use crate::publisher::FeedPublisher;
use crate::types::{Event, RunSummary};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Runs the grab pipeline for one configuration
///
/// Cloneable; all fields are Arc-wrapped or channel handles.
#[derive(Clone)]
pub struct Grabber {
    /// Configuration (wrapped in Arc for sharing)
    config: Arc<Config>,
    /// Where feed entries come from
    feed_source: Arc<dyn FeedSource>,
    /// Extraction backend handed to the dispatcher
    extractor: Arc<dyn AudioExtractor>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<Event>,
}

impl Grabber {
    /// Create a grabber that polls `config.feed_url` over HTTP and extracts with yt-dlp
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, the HTTP client cannot be built, or
    /// no extractor binary can be found
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let feed_source = Arc::new(HttpFeedSource::new(config.feed_url.clone())?);
        let extractor = extractor::from_config(&config.tools)?;
        Self::with_components(config, feed_source, extractor)
    }

    /// Create a grabber with explicit feed source and extractor
    pub fn with_components(
        config: Config,
        feed_source: Arc<dyn FeedSource>,
        extractor: Arc<dyn AudioExtractor>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            feed_source,
            extractor,
            event_tx,
        })
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one run
    ///
    /// Any error before dispatch (output directory, feed, processed record) aborts the
    /// run without starting a job. Extraction failures do not abort the run; they are
    /// counted in the summary.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let config = &self.config;
        info!(feed_url = %config.feed_url, "starting run");
        self.event_tx
            .send(Event::RunStarted {
                feed_url: config.feed_url.clone(),
            })
            .ok();

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|source| Error::OutputDir {
                path: config.output_dir.clone(),
                source,
            })?;

        let entries = self.feed_source.fetch().await?;
        let fetched = entries.len();
        info!(count = fetched, "fetched feed entries");

        let store = ProcessedStore::new(&config.record_path);
        let mut processed = store.load().await?;

        let dispatcher = Dispatcher::new(
            store,
            Arc::clone(&self.extractor),
            &config.output_dir,
            config.concurrency_limit,
            config.newest_count,
            self.event_tx.clone(),
        );
        let outcome = dispatcher.dispatch(entries, &mut processed).await?;

        let publisher = FeedPublisher::new(&config.output_dir, config.publish.clone());
        let published = publisher.publish(&outcome.descriptions).await?;
        self.event_tx
            .send(Event::FeedPublished {
                path: published.path.clone(),
                items: published.items,
            })
            .ok();

        let summary = RunSummary {
            fetched,
            dispatched: outcome.dispatched,
            skipped: outcome.skipped,
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            published: published.items,
        };
        info!(?summary, "run complete");
        Ok(summary)
    }
}
