//! CLI-based extractor using an external yt-dlp binary

use super::traits::AudioExtractor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Maximum number of stderr characters kept in a failure message
const STDERR_TAIL_CHARS: usize = 512;

/// CLI-based extractor using an external yt-dlp binary
///
/// Each call runs
/// `<binary> -x --audio-format <format> -o <output_stem>.%(ext)s [extra args] <link>`
/// and waits for it to exit. There is no timeout: a hung process holds its
/// concurrency slot until it exits.
///
/// # Examples
///
/// ```no_run
/// use livestream_grabber::extractor::CliExtractor;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let extractor = CliExtractor::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let extractor = CliExtractor::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Clone, Debug)]
pub struct CliExtractor {
    binary_path: PathBuf,
    audio_format: String,
    extra_args: Vec<String>,
}

impl CliExtractor {
    /// Create a new CLI extractor with an explicit binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the yt-dlp binary
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            audio_format: "mp3".to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// # Returns
    ///
    /// `Some(CliExtractor)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Set the audio format passed to `--audio-format`
    pub fn with_audio_format(mut self, format: impl Into<String>) -> Self {
        self.audio_format = format.into();
        self
    }

    /// Set extra arguments inserted before the link
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Path of the binary this extractor runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Output template handed to `-o`; the tool substitutes `%(ext)s`
    fn output_template(output_stem: &Path) -> std::ffi::OsString {
        let mut template = output_stem.as_os_str().to_os_string();
        template.push(".%(ext)s");
        template
    }
}

#[async_trait]
impl AudioExtractor for CliExtractor {
    async fn extract(&self, link: &str, output_stem: &Path) -> crate::Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("-x") // Extract audio
            .arg("--audio-format")
            .arg(&self.audio_format)
            .arg("-o")
            .arg(Self::output_template(output_stem))
            .args(&self.extra_args)
            .arg(link)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!(
                    "Failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let tail = match stderr.char_indices().rev().nth(STDERR_TAIL_CHARS - 1) {
            Some((idx, _)) => &stderr[idx..],
            None => stderr,
        };

        Err(crate::Error::ExternalTool(match output.status.code() {
            Some(code) => format!("extractor exited with code {}: {}", code, tail),
            None => format!("extractor terminated by signal: {}", tail),
        }))
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
