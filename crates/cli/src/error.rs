use std::path::PathBuf;
use thiserror::Error;

/// Errors generated by the command line tool.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when a benchmark is configured
    /// with a payload too small to hold its header.
    #[error("payload size must be at least {0} bytes")]
    PayloadTooSmall(usize),

    /// Error generated when a benchmark is configured
    /// without any tasks or writes.
    #[error("benchmark requires at least one task and one write")]
    EmptyBenchmark,

    /// Error generated when the file content after a
    /// benchmark is not one of the submitted payloads.
    #[error("content of '{}' is not a submitted payload", .0.display())]
    Verify(PathBuf),

    /// Error generated when a logs command runs without
    /// a logs directory.
    #[error("no logs directory, use --log-dir or ATOMIC_WRITER_LOG_DIR")]
    NoLogsDir,

    /// Error generated by the writer.
    #[error(transparent)]
    Writer(#[from] atomic_writer::Error),

    /// Error generated by the logs library.
    #[error(transparent)]
    Logs(#[from] atomic_writer_logs::Error),

    /// Error generated by the io module.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error generated parsing a TOML config file.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Error generated when a benchmark task fails to join.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
