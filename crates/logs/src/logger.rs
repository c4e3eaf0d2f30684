use crate::Result;
use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "atomic_writer=info";

/// Status of the log files on disc.
#[derive(Debug, Clone)]
pub struct LogFileStatus {
    /// Most recently modified log file.
    pub current: PathBuf,
    /// All log files, oldest first.
    pub log_files: Vec<PathBuf>,
    /// Size of all the log files in bytes.
    pub total_size: u64,
}

/// Configures the global tracing subscriber.
///
/// Logs are always written to stderr; when a logs directory
/// is given they are also written as JSON to a file that
/// rolls over daily.
#[derive(Debug, Clone)]
pub struct Logger {
    logs_dir: Option<PathBuf>,
    name: String,
}

impl Logger {
    /// Create a logger.
    ///
    /// The `name` is used as the prefix for log files.
    pub fn new(logs_dir: Option<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            logs_dir,
            name: name.into(),
        }
    }

    /// Directory for log files.
    pub fn logs_dir(&self) -> Option<&Path> {
        self.logs_dir.as_deref()
    }

    /// Install the global subscriber.
    ///
    /// When writing to log files the returned guard must be
    /// kept alive for buffered output to be flushed.
    pub fn init_subscriber(&self) -> Result<Option<WorkerGuard>> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let (file_layer, guard) = if let Some(logs_dir) = &self.logs_dir {
            fs::create_dir_all(logs_dir)?;
            let appender =
                tracing_appender::rolling::daily(logs_dir, &self.name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .without_time(),
            )
            .with(file_layer)
            .try_init()?;

        tracing::debug!(
            logs_dir = ?self.logs_dir,
            "logs::init_subscriber"
        );

        Ok(guard)
    }

    /// Status of the log files.
    ///
    /// Returns `None` when there is no logs directory or no
    /// log files have been written yet.
    pub fn status(&self) -> Result<Option<LogFileStatus>> {
        let mut files = self.log_files()?;
        if files.is_empty() {
            return Ok(None);
        }

        files.sort_by_key(|(_, modified, _)| *modified);
        let total_size = files.iter().map(|(_, _, size)| size).sum();
        let log_files: Vec<PathBuf> =
            files.into_iter().map(|(path, _, _)| path).collect();
        let current = log_files[log_files.len() - 1].clone();

        Ok(Some(LogFileStatus {
            current,
            log_files,
            total_size,
        }))
    }

    /// Delete all log files except the current one.
    ///
    /// Returns the number of files deleted.
    pub fn delete_logs(&self) -> Result<usize> {
        let Some(status) = self.status()? else {
            return Ok(0);
        };
        let mut deleted = 0;
        for path in status.log_files {
            if path != status.current {
                fs::remove_file(&path)?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn log_files(&self) -> Result<Vec<(PathBuf, SystemTime, u64)>> {
        let Some(logs_dir) = &self.logs_dir else {
            return Ok(Vec::new());
        };
        if !logs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(logs_dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            let is_log = entry
                .file_name()
                .to_string_lossy()
                .starts_with(&self.name);
            if metadata.is_file() && is_log {
                let modified = metadata.modified()?;
                files.push((entry.path(), modified, metadata.len()));
            }
        }
        Ok(files)
    }
}
