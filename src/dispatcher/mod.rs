//! Download dispatcher: picks the newest unprocessed entries and runs their extraction jobs.
//!
//! The dispatcher owns the coordination logic of a run:
//! 1. Sort entries newest first and keep the first `newest_count`
//! 2. Skip entries whose link is already in the processed set
//! 3. For each remaining entry, in order: acquire a concurrency permit, durably mark the
//!    link processed, then spawn the extraction job holding that permit
//! 4. Wait for every spawned job before returning
//!
//! Links are marked at dispatch time, not on success. A job that fails stays marked and is
//! never retried automatically.
//!
//! The processed set and the title → description map live on the coordinating task only.
//! Jobs receive owned copies of their link and output path and report back through their
//! join handle, so no lock is needed.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::extractor::AudioExtractor;
use crate::feed::sort_newest_first;
use crate::processed::ProcessedStore;
use crate::types::{DispatchOutcome, DownloadJob, Event, FeedEntry};

/// Character substituted for spaces and path separators in derived titles
const TITLE_FILLER: char = '_';

/// Title used when a description yields nothing usable
const UNTITLED: &str = "untitled";

/// Derive a filesystem-safe title from an entry description
///
/// Takes the text before the first `:`, trims it, and replaces spaces with `_`. Path
/// separators and NUL are replaced too, so the title is always a single path component.
///
/// - No colon: the whole trimmed description is used
/// - Empty (or whitespace-only) segment: `"untitled"`
/// - Two descriptions deriving the same title map to the same output file; the later
///   entry wins in the description map and its download may overwrite the earlier one
///
/// # Examples
///
/// ```
/// use livestream_grabber::dispatcher::derive_title;
///
/// assert_eq!(derive_title("Linux Unplugged 500: The big one"), "Linux_Unplugged_500");
/// assert_eq!(derive_title("  No colon here "), "No_colon_here");
/// assert_eq!(derive_title(""), "untitled");
/// ```
#[must_use]
pub fn derive_title(description: &str) -> String {
    let segment = description.split(':').next().unwrap_or("").trim();
    if segment.is_empty() {
        return UNTITLED.to_string();
    }

    segment
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | '\0' => TITLE_FILLER,
            c => c,
        })
        .collect()
}

/// Keep the `count` most recently published entries, newest first
pub fn select_newest(mut entries: Vec<FeedEntry>, count: usize) -> Vec<FeedEntry> {
    sort_newest_first(&mut entries);
    entries.truncate(count);
    entries
}

/// Runs bounded-concurrency extraction jobs for new feed entries
pub struct Dispatcher {
    /// Processed-items record, appended to once per dispatched entry
    store: ProcessedStore,

    /// Extraction backend shared by all jobs
    extractor: Arc<dyn AudioExtractor>,

    /// Directory receiving the audio files
    output_dir: PathBuf,

    /// Maximum simultaneous jobs
    concurrency_limit: usize,

    /// How many of the newest entries are considered
    newest_count: usize,

    /// Event broadcast channel sender
    event_tx: broadcast::Sender<Event>,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// # Arguments
    /// * `store` - Processed-items record
    /// * `extractor` - Extraction backend
    /// * `output_dir` - Directory receiving the audio files
    /// * `concurrency_limit` - Maximum simultaneous jobs (values below 1 are treated as 1)
    /// * `newest_count` - How many of the newest entries are considered
    /// * `event_tx` - Sink for dispatch and job events
    pub fn new(
        store: ProcessedStore,
        extractor: Arc<dyn AudioExtractor>,
        output_dir: impl Into<PathBuf>,
        concurrency_limit: usize,
        newest_count: usize,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            store,
            extractor,
            output_dir: output_dir.into(),
            concurrency_limit: concurrency_limit.max(1),
            newest_count,
            event_tx,
        }
    }

    /// Build the job for an entry
    fn job_for(&self, entry: &FeedEntry) -> DownloadJob {
        let title = derive_title(&entry.description);
        DownloadJob {
            link: entry.link.clone(),
            output_stem: self.output_dir.join(&title),
            title,
        }
    }

    /// Dispatch the newest unprocessed entries and wait for all their jobs
    ///
    /// `processed` is the set loaded from the store; dispatched links are added to it so
    /// the caller sees the post-run state.
    ///
    /// # Errors
    /// Returns error if a link cannot be appended to the processed record. Dispatching
    /// stops at that entry and the jobs already running are drained before returning.
    /// Job failures are never returned; they are logged and emitted as
    /// [`Event::JobFailed`].
    pub async fn dispatch(
        &self,
        entries: Vec<FeedEntry>,
        processed: &mut HashSet<String>,
    ) -> Result<DispatchOutcome> {
        let candidates = select_newest(entries, self.newest_count);
        debug!(
            candidates = candidates.len(),
            limit = self.concurrency_limit,
            "dispatching newest entries"
        );

        let slots = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut jobs = JoinSet::new();
        let mut outcome = DispatchOutcome::default();
        let mut store_error = None;

        for entry in candidates {
            if processed.contains(&entry.link) {
                info!(link = %entry.link, "already processed");
                self.event_tx
                    .send(Event::AlreadyProcessed {
                        link: entry.link.clone(),
                    })
                    .ok();
                outcome.skipped += 1;
                continue;
            }

            let job = self.job_for(&entry);

            // Blocks while `concurrency_limit` jobs are in flight
            let permit = slots
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::Other(format!("concurrency limiter closed: {}", e)))?;

            // Marked before the job starts; failed jobs stay marked
            if let Err(e) = self.store.append(&job.link).await {
                error!(link = %job.link, error = %e, "failed to record processed link, stopping dispatch");
                store_error = Some(e);
                break;
            }
            processed.insert(job.link.clone());

            if let Some(previous) = outcome
                .descriptions
                .insert(job.title.clone(), entry.description)
            {
                warn!(
                    title = %job.title,
                    previous = %previous,
                    "derived title collides with an earlier entry, output may be overwritten"
                );
            }

            info!(link = %job.link, title = %job.title, "dispatching extraction");
            self.event_tx
                .send(Event::Dispatched {
                    link: job.link.clone(),
                    title: job.title.clone(),
                })
                .ok();
            outcome.dispatched += 1;

            let extractor = Arc::clone(&self.extractor);
            let event_tx = self.event_tx.clone();
            jobs.spawn(async move {
                let ok = run_job(extractor.as_ref(), &job, &event_tx).await;
                drop(permit);
                ok
            });
        }

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok(true) => outcome.succeeded += 1,
                Ok(false) => outcome.failed += 1,
                Err(e) => {
                    error!(error = %e, "extraction job panicked");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            dispatched = outcome.dispatched,
            skipped = outcome.skipped,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "dispatch complete"
        );

        match store_error {
            Some(e) => Err(e),
            None => Ok(outcome),
        }
    }
}

/// Run one extraction attempt and report its outcome
async fn run_job(
    extractor: &dyn AudioExtractor,
    job: &DownloadJob,
    event_tx: &broadcast::Sender<Event>,
) -> bool {
    match extractor.extract(&job.link, &job.output_stem).await {
        Ok(()) => {
            info!(link = %job.link, output = %job.output_stem.display(), "extraction complete");
            event_tx
                .send(Event::JobCompleted {
                    link: job.link.clone(),
                    title: job.title.clone(),
                })
                .ok();
            true
        }
        Err(e) => {
            warn!(
                link = %job.link,
                extractor = extractor.name(),
                error = %e,
                "extraction failed"
            );
            event_tx
                .send(Event::JobFailed {
                    link: job.link.clone(),
                    title: job.title.clone(),
                    error: e.to_string(),
                })
                .ok();
            false
        }
    }
}
