//! Logging for update runs.
//!
//! A [`Logger`] owns a `tracing` dispatch with two append-only JSON-lines
//! sinks: `info.log` (INFO and above) and `error.log` (ERROR only). When
//! `RUST_LOG` is set, a human-readable stderr layer filtered by it is added
//! for diagnostics.
//!
//! The dispatch is never installed as the global default. Code that should
//! log into it runs inside [`Logger::in_scope`]; that includes the extractor,
//! whose debug events land in the same sinks.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// File receiving INFO and above.
pub const INFO_LOG: &str = "info.log";

/// File receiving ERROR only.
pub const ERROR_LOG: &str = "error.log";

/// Explicit logging handle passed to the orchestrator.
///
/// Created at process start; dropping the last handle closes the log files.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    console: bool,
}

impl Logger {
    /// Open (or create) the log files under `log_dir`.
    ///
    /// With `console` set, every [`info`](Self::info) and
    /// [`error`](Self::error) event is mirrored as one line on stdout/stderr.
    pub fn open(log_dir: &Path, console: bool) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let info_file = open_append(&log_dir.join(INFO_LOG))?;
        let error_file = open_append(&log_dir.join(ERROR_LOG))?;

        let info_layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(Mutex::new(info_file))
            .with_filter(LevelFilter::INFO);

        let error_layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(Mutex::new(error_file))
            .with_filter(LevelFilter::ERROR);

        let diagnostics = std::env::var_os(EnvFilter::DEFAULT_ENV).map(|_| {
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(EnvFilter::from_default_env())
        });

        let subscriber = Registry::default()
            .with(info_layer)
            .with(error_layer)
            .with(diagnostics);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            console,
        })
    }

    /// A logger with no sinks and no console output.
    pub fn discard() -> Self {
        Self {
            dispatch: Dispatch::none(),
            console: false,
        }
    }

    /// Run `f` with this logger as the current `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Log at INFO and mirror `➜  message` to stdout.
    pub fn info(&self, message: &str) {
        self.in_scope(|| tracing::info!("{}", message));
        if self.console {
            println!("➜  {}", message);
        }
    }

    /// Log at ERROR and mirror `❌  Error: message` to stderr.
    pub fn error(&self, message: &str) {
        self.in_scope(|| tracing::error!("{}", message));
        if self.console {
            eprintln!("❌  Error: {}", message);
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn messages(path: &Path) -> Vec<(String, String)> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                (
                    value["level"].as_str().unwrap().to_string(),
                    value["fields"]["message"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_streams_split_by_level() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::open(temp_dir.path(), false).unwrap();

        logger.info("download the latest version.");
        logger.error("Download failed, status code: 404");
        logger.in_scope(|| tracing::debug!("not persisted"));
        drop(logger);

        let info = messages(&temp_dir.path().join(INFO_LOG));
        assert_eq!(
            info,
            vec![
                ("INFO".to_string(), "download the latest version.".to_string()),
                ("ERROR".to_string(), "Download failed, status code: 404".to_string()),
            ]
        );

        let errors = messages(&temp_dir.path().join(ERROR_LOG));
        assert_eq!(
            errors,
            vec![("ERROR".to_string(), "Download failed, status code: 404".to_string())]
        );
    }

    #[test]
    fn test_logs_are_appended() {
        let temp_dir = TempDir::new().unwrap();

        Logger::open(temp_dir.path(), false).unwrap().info("first run");
        Logger::open(temp_dir.path(), false).unwrap().info("second run");

        let info = messages(&temp_dir.path().join(INFO_LOG));
        assert_eq!(info.len(), 2);
        assert_eq!(info[1].1, "second run");
    }

    #[test]
    fn test_discard_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::discard();
        logger.info("nowhere");
        logger.error("nowhere");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
