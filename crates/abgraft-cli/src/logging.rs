use crate::error::Result;
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Both the library and the binary log under this target.
const ABGRAFT_TARGET: &str = "abgraft";

/// Installs the global subscriber.
///
/// The console follows `-v`/`-q`. A log file always keeps at least DEBUG, so
/// per-candidate germline scores are on disk even for a quiet run. Other
/// crates are capped at WARN on both outputs.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = level_for(verbosity, quiet);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(targets(level));

    let file_layer = log_file
        .map(File::create)
        .transpose()?
        .map(|file| file_layer(file, level.max(LevelFilter::DEBUG)));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_filter(targets(level))
}

fn targets(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level.min(LevelFilter::WARN))
        .with_target(ABGRAFT_TARGET, level)
}

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use serial_test::serial;
    use std::path::PathBuf;
    use tracing::{debug, Level};

    #[test]
    fn verbosity_maps_to_level_filters() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn other_crates_are_capped_at_warn() {
        let filter = targets(LevelFilter::TRACE);
        assert!(filter.would_enable("abgraft::engine::selection", &Level::TRACE));
        assert!(!filter.would_enable("rayon_core::registry", &Level::INFO));
        assert!(filter.would_enable("rayon_core::registry", &Level::WARN));

        let quiet = targets(level_for(0, true));
        assert!(!quiet.would_enable("abgraft::workflows::humanize", &Level::WARN));
        assert!(!quiet.would_enable("rayon_core::registry", &Level::WARN));
    }

    #[test]
    #[serial]
    fn log_file_keeps_debug_events_from_abgraft_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("abgraft.log");

        let file = File::create(&log_path).unwrap();
        let layer = file_layer(file, level_for(0, false).max(LevelFilter::DEBUG));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            debug!(
                target: "abgraft::engine::selection",
                germline = "IGHV3-23*01",
                "Scored germline candidate."
            );
            debug!(target: "rayon_core::sleep", "Worker parked.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Scored germline candidate."));
        assert!(content.contains("IGHV3-23*01"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("Worker parked."));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(&invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
