//! Audio extraction through an external tool
//!
//! The dispatcher never talks to `yt-dlp` directly. It goes through the
//! [`AudioExtractor`] trait so the tool can be swapped or faked:
//!
//! - [`CliExtractor`]: runs an external `yt-dlp`-compatible binary
//!
//! ## Usage
//!
//! ```no_run
//! use livestream_grabber::extractor::{AudioExtractor, CliExtractor};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = CliExtractor::from_path().expect("yt-dlp not found in PATH");
//!
//!     // Writes podcasts/Linux_Unplugged_500.mp3
//!     extractor
//!         .extract(
//!             "https://example.com/w/500",
//!             Path::new("podcasts/Linux_Unplugged_500"),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod traits;

pub use cli::CliExtractor;
pub use traits::AudioExtractor;

use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Build the extractor described by the tools configuration
///
/// An explicit `extractor_path` wins; otherwise PATH is searched when `search_path`
/// is enabled.
///
/// # Errors
/// Returns [`Error::NotSupported`] when no extractor binary can be located
pub fn from_config(tools: &ToolsConfig) -> Result<Arc<dyn AudioExtractor>> {
    let extractor = match &tools.extractor_path {
        Some(path) => CliExtractor::new(path.clone()),
        None if tools.search_path => CliExtractor::from_path().ok_or_else(|| {
            Error::NotSupported(
                "audio extraction requires yt-dlp. \
                 Configure tools.extractor_path or ensure yt-dlp is in PATH."
                    .into(),
            )
        })?,
        None => {
            return Err(Error::NotSupported(
                "no extractor configured and PATH search is disabled".into(),
            ));
        }
    };

    tracing::debug!(
        extractor = extractor.name(),
        binary = %extractor.binary_path().display(),
        "using extractor"
    );

    Ok(Arc::new(
        extractor
            .with_audio_format(tools.audio_format.clone())
            .with_extra_args(tools.extra_args.clone()),
    ))
}
