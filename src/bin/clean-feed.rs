//! clean-feed: rewrites the generated feed with readable titles and descriptions
//!
//! Uses the same configuration as the grabber to locate the feed document.

use livestream_grabber::{Config, clean_feed_file};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("livestream_grabber=info,warn")),
        )
        .with(fmt::layer().compact())
        .init();

    let path = match Config::load() {
        Ok(config) => config.feed_path(),
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match clean_feed_file(&path).await {
        Ok(items) => {
            info!(path = %path.display(), items, "feed updated");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to clean feed");
            ExitCode::FAILURE
        }
    }
}
