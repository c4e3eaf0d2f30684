//! Test utilities.
#![deny(missing_docs)]
#![forbid(unsafe_code)]

use anyhow::Result;
use tempfile::{tempdir_in, TempDir};

pub mod mock;

/// Initialize a tracing subscriber.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "atomic_writer=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init();
}

/// Create a temporary directory for a test.
///
/// Directories are created beneath `target` so that renames
/// stay on the same file system as the build output.
pub fn test_dir() -> Result<TempDir> {
    std::fs::create_dir_all("target")?;
    Ok(tempdir_in("target")?)
}
