//! Logging setup for layermerge.
//!
//! - Writes to a log file (cleared at the start of each session)
//! - Mirrors messages to stderr, keeping stdout free for command output
//! - Filter from `RUST_LOG`, defaulting to `info` (`debug` when verbose)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// The log file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Initialize logging.
///
/// Creates `log_dir` if needed, clears `log_file` and installs the global
/// subscriber with a file layer and a stderr layer.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// cleared.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    verbose: bool,
) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        path: log_path,
    })
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "layermerge.log"
}

/// Split a configured log file path into directory and file name.
///
/// A bare file name lands in `fallback_dir`.
pub fn split_log_path(path: &Path, fallback_dir: &Path) -> (PathBuf, String) {
    let file = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_else(|| default_log_file())
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => fallback_dir.to_path_buf(),
    };
    (dir, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "debug");
    }

    #[test]
    fn test_split_log_path() {
        let fallback = Path::new("/var/tmp");
        assert_eq!(
            split_log_path(Path::new("/home/user/.layermerge/run.log"), fallback),
            (PathBuf::from("/home/user/.layermerge"), "run.log".to_string())
        );
        assert_eq!(
            split_log_path(Path::new("run.log"), fallback),
            (PathBuf::from("/var/tmp"), "run.log".to_string())
        );
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let logging_guard = LoggingGuard {
            _file_guard: guard,
            path: PathBuf::from("layermerge.log"),
        };
        assert_eq!(logging_guard.path(), Path::new("layermerge.log"));
    }

    // init_logging installs a global subscriber, so it is exercised by the
    // CLI rather than here.
}
