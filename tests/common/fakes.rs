//! In-process stand-ins for the extractor

use async_trait::async_trait;
use livestream_grabber::AudioExtractor;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Extractor that writes a small fake mp3 and tracks concurrency
pub struct FakeExtractor {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            failing: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, link: String) -> Self {
        self.failing.insert(link);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioExtractor for FakeExtractor {
    async fn extract(&self, link: &str, output_stem: &Path) -> livestream_grabber::Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(link.to_string());

        tokio::time::sleep(Duration::from_millis(30)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(link) {
            return Err(livestream_grabber::Error::ExternalTool(
                "extractor exited with code 1: ERROR: Private video".into(),
            ));
        }

        let mut file = output_stem.as_os_str().to_os_string();
        file.push(".mp3");
        // Size varies per link so lengths can be told apart
        let body = vec![0u8; 100 + link.len()];
        tokio::fs::write(PathBuf::from(file), body).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
