use thiserror::Error;

/// Errors generated by the logs library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when a global subscriber is already set.
    #[error(transparent)]
    TryInit(#[from] tracing_subscriber::util::TryInitError),

    /// Errors generated by the IO module.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
