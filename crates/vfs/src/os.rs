//! Native operating system file system.
pub use tokio::fs::*;

use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write the entire buffer to a file.
///
/// The file is created if it does not exist and
/// truncated if it does exist.
pub async fn write_full(
    path: impl AsRef<Path>,
    buf: impl AsRef<[u8]>,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path.as_ref())
        .await?;
    file.write_all(buf.as_ref()).await?;
    file.flush().await?;
    Ok(())
}

/// Flush the contents and metadata of a file to disc.
pub async fn sync_file(path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = OpenOptions::new().write(true).open(path.as_ref()).await?;
    file.sync_all().await
}

/// Flush a directory so that a rename inside it is durable.
///
/// Directories cannot be opened as files on every platform,
/// where that is not possible this is a no-op.
pub async fn sync_dir(path: impl AsRef<Path>) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let dir = File::open(path.as_ref()).await?;
        dir.sync_all().await
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
