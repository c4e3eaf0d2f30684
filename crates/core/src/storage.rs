//! Storage primitives used by each write.
use crate::WriterOptions;
use async_trait::async_trait;
use atomic_writer_vfs as vfs;
use std::{io, path::Path};

/// Storage for the write-to-temp-then-rename sequence.
///
/// Implementations must make `rename` atomic for paths
/// in the same directory.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Write the entire buffer to `path` replacing any
    /// existing content.
    async fn write_full(&self, path: &Path, buf: &[u8]) -> io::Result<()>;

    /// Flush the content of `path` to durable storage.
    async fn sync(&self, path: &Path) -> io::Result<()>;

    /// Rename `from` to `to`, replacing `to` if it exists.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Flush a directory entry change to durable storage.
    async fn sync_dir(&self, _dir: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Whether writes should be flushed to durable storage.
    fn durable(&self) -> bool {
        false
    }
}

/// Storage backed by the native file system.
#[derive(Debug, Default, Clone)]
pub struct FileSystem {
    options: WriterOptions,
}

impl FileSystem {
    /// Create file system storage.
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Storage for FileSystem {
    async fn write_full(&self, path: &Path, buf: &[u8]) -> io::Result<()> {
        vfs::write_full(path, buf).await
    }

    async fn sync(&self, path: &Path) -> io::Result<()> {
        vfs::sync_file(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        vfs::rename(from, to).await
    }

    async fn sync_dir(&self, dir: &Path) -> io::Result<()> {
        vfs::sync_dir(dir).await
    }

    fn durable(&self) -> bool {
        self.options.sync
    }
}
