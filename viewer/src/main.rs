mod controls;
mod detect;
mod display;
mod driver;
mod schedule;
mod source;
mod stats;

use std::path::PathBuf;

use frame_scope_common::config::Config;
use tracing::{error, info};

use display::ViewerWindow;
use driver::Pipeline;

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        url = config.source.url,
        mode = config.source.mode,
        skip_interval = config.pipeline.skip_interval,
        "starting frame-scope viewer"
    );
    info!("controls: 1 edge, 2 motion, 3 roi, 4 normal, +/- skip cadence, q quit");

    let source = match source::make_source(&config.source) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to open frame source");
            std::process::exit(1);
        }
    };

    let window = ViewerWindow::new(&config.display.title);
    let mut pipeline = Pipeline::new(source, window, &config.pipeline);
    if let Err(e) = pipeline.run() {
        error!(error = %e, "viewer exited on error");
        std::process::exit(1);
    }
}
