//! Trait for audio extraction backends

use async_trait::async_trait;
use std::path::Path;

/// Trait for turning a source link into a local audio file
///
/// Implementations run a single attempt. Retrying, format selection, and any
/// progress reporting are the backend's own business.
///
/// # Examples
///
/// ```no_run
/// use livestream_grabber::extractor::{AudioExtractor, CliExtractor};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = CliExtractor::from_path().expect("yt-dlp binary not found");
///
/// match extractor.extract("https://example.com/w/1", Path::new("out/Episode_1")).await {
///     Ok(()) => println!("extracted with {}", extractor.name()),
///     Err(e) => eprintln!("extraction failed: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract the audio track of `link`
    ///
    /// # Arguments
    ///
    /// * `link` - Source link from the feed entry
    /// * `output_stem` - Destination path without extension; the backend appends
    ///   the extension of the format it produces
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The backend cannot be started
    /// - The backend reports failure (e.g. non-zero exit status)
    async fn extract(&self, link: &str, output_stem: &Path) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
