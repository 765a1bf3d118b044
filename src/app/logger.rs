//! Process-wide tracing subscriber.
//!
//! Output goes to stderr and, optionally, to a log file without ANSI colours.
//! `HULLFLOW_LOG` overrides the level filter (e.g. `HULLFLOW_LOG=hullflow=debug`).

use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::Error as IoError;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV_VAR: &str = "HULLFLOW_LOG";

static INIT: OnceCell<()> = OnceCell::new();

/// Filter used when `HULLFLOW_LOG` is unset or invalid.
pub fn default_directive(quiet: bool) -> &'static str {
    if quiet {
        "hullflow=warn"
    } else {
        "hullflow=info"
    }
}

/// Installs the global subscriber once; later calls are no-ops.
///
/// The log file is created or truncated. If it cannot be opened the error is
/// returned and nothing is installed, so the caller may retry without a file.
pub fn init_logging(quiet: bool, log_file: Option<&Path>) -> Result<(), IoError> {
    let file = log_file.map(open_log_file).transpose()?;
    INIT.get_or_init(|| install(quiet, file));
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, IoError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

fn install(quiet: bool, file: Option<File>) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet)));
    let file_layer = file.map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
            .with_target(false)
    });

    // Another subscriber may already be set (tests); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "hullflow=info");
        assert_eq!(default_directive(true), "hullflow=warn");
    }

    #[test]
    fn test_unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing/dir/run.log");
        assert!(init_logging(true, Some(&bad)).is_err());
    }
}
