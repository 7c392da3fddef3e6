//! livestream-grabber: binary entrypoint
//!
//! Runs the grab pipeline once and exits. Configuration comes from `grabber.toml`
//! (or the file named by `GRABBER_CONFIG`); a `.env` file is honored when present.
//! Exit status is 0 when the run completed (even if some extraction jobs failed)
//! and 1 when it was aborted.

use livestream_grabber::{Config, Grabber};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("livestream_grabber=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present; no-op otherwise
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let grabber = match Grabber::new(config) {
        Ok(g) => g,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    match grabber.run_once().await {
        Ok(summary) => {
            if summary.failed > 0 {
                warn!(failed = summary.failed, "some extraction jobs failed");
            }
            info!(
                dispatched = summary.dispatched,
                skipped = summary.skipped,
                published = summary.published,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, code = e.error_code(), "run aborted");
            ExitCode::FAILURE
        }
    }
}
