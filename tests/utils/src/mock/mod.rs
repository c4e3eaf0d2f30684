//! Mock storage.
use async_trait::async_trait;
use atomic_writer::{FileSystem, Storage, WriterOptions};
use parking_lot::Mutex;
use std::{
    io,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::sync::{watch, Semaphore};

/// Storage backed by the file system that records every
/// payload written and can inject failures.
///
/// A gated storage blocks each temporary file write until
/// a permit is released which lets tests hold a write in
/// flight while queueing more writes.
pub struct MockStorage {
    inner: FileSystem,
    gate: Option<Semaphore>,
    entered: watch::Sender<usize>,
    written: Mutex<Vec<Vec<u8>>>,
    renames: AtomicUsize,
    fail_writes: AtomicUsize,
    fail_renames: AtomicUsize,
    panic_writes: AtomicUsize,
}

impl MockStorage {
    /// Storage that writes without blocking.
    pub fn new() -> Self {
        Self::build(None, Default::default())
    }

    /// Storage that flushes writes to disc.
    pub fn synced() -> Self {
        Self::build(None, WriterOptions::synced())
    }

    /// Storage that blocks every write until released.
    pub fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)), Default::default())
    }

    fn build(gate: Option<Semaphore>, options: WriterOptions) -> Self {
        let (entered, _) = watch::channel(0);
        Self {
            inner: FileSystem::new(options),
            gate,
            entered,
            written: Mutex::new(Vec::new()),
            renames: AtomicUsize::new(0),
            fail_writes: AtomicUsize::new(0),
            fail_renames: AtomicUsize::new(0),
            panic_writes: AtomicUsize::new(0),
        }
    }

    /// Allow `count` blocked writes to proceed.
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Wait until `count` writes have started.
    pub async fn wait_entered(&self, count: usize) {
        let mut receiver = self.entered.subscribe();
        let _ = receiver.wait_for(|entered| *entered >= count).await;
    }

    /// Number of writes that have started.
    pub fn entered(&self) -> usize {
        *self.entered.borrow()
    }

    /// Payloads passed to successful temporary file writes
    /// in the order they were written.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().clone()
    }

    /// Number of successful renames.
    pub fn renames(&self) -> usize {
        self.renames.load(Ordering::SeqCst)
    }

    /// Fail the next `count` temporary file writes.
    pub fn fail_next_writes(&self, count: usize) {
        self.fail_writes.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` renames.
    pub fn fail_next_renames(&self, count: usize) {
        self.fail_renames.store(count, Ordering::SeqCst);
    }

    /// Panic during the next temporary file write.
    pub fn panic_next_write(&self) {
        self.panic_writes.store(1, Ordering::SeqCst);
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn take(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        })
        .is_ok()
}

#[async_trait]
impl Storage for MockStorage {
    async fn write_full(&self, path: &Path, buf: &[u8]) -> io::Result<()> {
        self.entered.send_modify(|entered| *entered += 1);

        if let Some(gate) = &self.gate {
            gate.acquire().await.map_err(io::Error::other)?.forget();
        }

        if take(&self.panic_writes) {
            panic!("simulated storage panic");
        }

        if take(&self.fail_writes) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated write failure",
            ));
        }

        self.inner.write_full(path, buf).await?;
        self.written.lock().push(buf.to_vec());
        Ok(())
    }

    async fn sync(&self, path: &Path) -> io::Result<()> {
        self.inner.sync(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if take(&self.fail_renames) {
            return Err(io::Error::other("simulated rename failure"));
        }
        self.inner.rename(from, to).await?;
        self.renames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sync_dir(&self, dir: &Path) -> io::Result<()> {
        self.inner.sync_dir(dir).await
    }

    fn durable(&self) -> bool {
        self.inner.durable()
    }
}
