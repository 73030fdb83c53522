use crate::error::Result;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// Maps the `-v`/`-q` flags to a level filter. The default stays at WARN
/// so the progress bar is the primary console surface; `-q` keeps errors
/// visible rather than going fully silent.
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

/// Installs the global subscriber: a terse stderr layer (no timestamps or
/// targets, they add nothing next to a progress bar) and, when requested,
/// a full-detail tee into a log file.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(&path)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true),
            )
        }
        None => None,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(level_for(verbosity, quiet))
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    #[test]
    fn verbosity_flags_map_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(9, false), LevelFilter::TRACE);
    }

    #[test]
    fn quiet_keeps_errors_only() {
        assert_eq!(level_for(0, true), LevelFilter::ERROR);
        assert_eq!(level_for(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn file_layer_receives_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let file = File::create(&path).unwrap();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true),
        );
        tracing::subscriber::with_default(subscriber, || {
            info!("matching started");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("matching started"));
        assert!(content.contains("INFO"));
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let result = setup_logging(0, false, Some(PathBuf::from("/no/such/dir/run.log")));
        assert!(result.is_err());
    }
}
