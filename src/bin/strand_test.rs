//! LED strand test
//!
//! Runs [`led_fanout::strand`] until Ctrl-C or SIGTERM, then turns the
//! lights off.
//!
//! Usage: `led-fanout-strand-test [config.toml]`

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use led_fanout::{Duration, FrameScheduler, HardwareDrivers, OutputConfig, strand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// The pattern moves one pixel per frame
const FRAME_DURATION: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    if let Err(err) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        tracing::error!("Failed to install the termination handler: {}", err);
        return ExitCode::FAILURE;
    }

    let config = match std::env::args().nth(1) {
        Some(path) => OutputConfig::load(&path),
        None => Ok(OutputConfig::default()),
    };
    let renderer = match config.and_then(|config| config.build(HardwareDrivers::default())) {
        Ok(renderer) => renderer,
        Err(err) => {
            tracing::error!("Failed to start: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut scheduler = FrameScheduler::with_frame_duration(renderer, FRAME_DURATION);
    strand::run(&mut scheduler, &stop);
    ExitCode::SUCCESS
}
