//! Coalescing atomic writer bound to a single file.
use crate::{
    paths::temp_path, Error, FileSystem, Result, Storage, WriterOptions,
};
use bytes::Bytes;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use std::{
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::{runtime::Handle, sync::oneshot};

type Outcome = Result<()>;

/// Counters describing the work done by a writer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of calls to write.
    pub submitted: u64,
    /// Number of write-to-temp-then-rename sequences that ran.
    pub generations: u64,
    /// Number of queued payloads replaced by a newer payload
    /// before they were written.
    pub superseded: u64,
    /// Number of generations that failed.
    pub failed: u64,
}

/// Outcome of a generation delivered to every caller
/// coalesced into it.
struct Waiters {
    sender: oneshot::Sender<Outcome>,
    outcome: Shared<oneshot::Receiver<Outcome>>,
}

impl Waiters {
    fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender,
            outcome: receiver.shared(),
        }
    }

    fn handle(&self) -> WriteHandle {
        WriteHandle {
            outcome: self.outcome.clone(),
        }
    }

    fn notify(self, outcome: Outcome) {
        // Every handle may already have been dropped
        let _ = self.sender.send(outcome);
    }
}

/// Payload waiting for the active generation to finish.
struct Queued {
    latest: Bytes,
    waiters: Waiters,
}

#[derive(Default)]
struct State {
    active: bool,
    queued: Option<Queued>,
    stats: WriterStats,
}

struct Inner<S>
where
    S: Storage,
{
    target: PathBuf,
    temp: PathBuf,
    storage: S,
    state: Mutex<State>,
}

/// Drain task that runs generations until nothing is queued.
///
/// Owns the waiters of the running generation. When the task
/// is dropped before it finishes, for example because its
/// runtime shut down, the writer is marked idle again and every
/// pending handle resolves to `Error::Terminated`.
struct Drain<S>
where
    S: Storage,
{
    inner: Arc<Inner<S>>,
    waiters: Option<Waiters>,
}

impl<S> Drain<S>
where
    S: Storage,
{
    async fn run(mut self, mut content: Bytes) {
        while self.waiters.is_some() {
            let outcome = AssertUnwindSafe(self.inner.generation(&content))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    tracing::error!(
                        path = %self.inner.target.display(),
                        "atomic_writer::storage_panic"
                    );
                    Err(Error::Terminated)
                });

            if let Err(error) = &outcome {
                tracing::warn!(
                    path = %self.inner.target.display(),
                    error = %error,
                    "atomic_writer::write_failed"
                );
            }

            let next = {
                let mut state = self.inner.state.lock();
                state.stats.generations += 1;
                if outcome.is_err() {
                    state.stats.failed += 1;
                }
                let next = state.queued.take();
                if next.is_none() {
                    state.active = false;
                }
                next
            };

            let finished = match next {
                Some(queued) => {
                    content = queued.latest;
                    self.waiters.replace(queued.waiters)
                }
                None => self.waiters.take(),
            };
            if let Some(waiters) = finished {
                waiters.notify(outcome);
            }
        }
    }
}

impl<S> Drop for Drain<S>
where
    S: Storage,
{
    fn drop(&mut self) {
        let Some(waiters) = self.waiters.take() else {
            return;
        };

        let queued = {
            let mut state = self.inner.state.lock();
            state.stats.generations += 1;
            state.stats.failed += 1;
            state.active = false;
            state.queued.take()
        };

        tracing::warn!(
            path = %self.inner.target.display(),
            "atomic_writer::drain_aborted"
        );

        // Dropped senders resolve to `Error::Terminated`
        drop(waiters);
        drop(queued);
    }
}

impl<S> Inner<S>
where
    S: Storage,
{
    /// Write the content to the temporary file and rename
    /// it over the target.
    async fn generation(&self, content: &[u8]) -> Result<()> {
        tracing::debug!(
            path = %self.target.display(),
            length = content.len(),
            "atomic_writer::write"
        );

        self.storage
            .write_full(&self.temp, content)
            .await
            .map_err(|e| Error::WriteTemp {
                path: self.temp.clone(),
                source: Arc::new(e),
            })?;

        let durable = self.storage.durable();
        if durable {
            self.storage
                .sync(&self.temp)
                .await
                .map_err(|e| Error::Sync {
                    path: self.temp.clone(),
                    source: Arc::new(e),
                })?;
        }

        self.storage
            .rename(&self.temp, &self.target)
            .await
            .map_err(|e| Error::Rename {
                from: self.temp.clone(),
                to: self.target.clone(),
                source: Arc::new(e),
            })?;

        if durable {
            let dir = match self.target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            self.storage.sync_dir(dir).await.map_err(|e| Error::Sync {
                path: dir.to_path_buf(),
                source: Arc::new(e),
            })?;
        }

        Ok(())
    }
}

/// Writes complete content to a file atomically, collapsing
/// writes that overlap an in-flight write into a single write
/// of the newest payload.
///
/// Clones share the same state so a writer may be handed to
/// many tasks; all writes to one path must go through the same
/// writer (or its clones).
pub struct CoalescingAtomicWriter<S = FileSystem>
where
    S: Storage,
{
    inner: Arc<Inner<S>>,
}

impl CoalescingAtomicWriter<FileSystem> {
    /// Create a writer for a file on the native file system.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, WriterOptions::default())
    }

    /// Create a writer for a file on the native file system
    /// using the given options.
    pub fn with_options(
        path: impl AsRef<Path>,
        options: WriterOptions,
    ) -> Result<Self> {
        Self::with_storage(path, FileSystem::new(options))
    }
}

impl<S> CoalescingAtomicWriter<S>
where
    S: Storage,
{
    /// Create a writer using a custom storage.
    ///
    /// Fails when the path does not have a file name.
    pub fn with_storage(
        path: impl AsRef<Path>,
        storage: S,
    ) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let temp = temp_path(&target)?;
        Ok(Self {
            inner: Arc::new(Inner {
                target,
                temp,
                storage,
                state: Mutex::new(Default::default()),
            }),
        })
    }

    /// Target file path.
    pub fn path(&self) -> &Path {
        &self.inner.target
    }

    /// Temporary file path.
    pub fn temp_path(&self) -> &Path {
        &self.inner.temp
    }

    /// Storage used by this writer.
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// Whether a write is in flight.
    ///
    /// The value may change as soon as it has been read.
    pub fn busy(&self) -> bool {
        self.inner.state.lock().active
    }

    /// Snapshot of the writer statistics.
    pub fn stats(&self) -> WriterStats {
        self.inner.state.lock().stats
    }

    /// Replace the content of the file.
    ///
    /// When the writer is idle the write starts immediately,
    /// otherwise the content is queued and replaces any content
    /// queued earlier. All callers whose content is queued
    /// together share the outcome of the one write that persists
    /// the newest content.
    ///
    /// The returned handle resolves once the content, or newer
    /// content submitted after it, has been renamed over the
    /// target. Dropping the handle does not cancel the write.
    ///
    /// Outside of a Tokio runtime the write is rejected and
    /// the handle resolves to `Error::Terminated`.
    pub fn write(&self, content: impl Into<Bytes>) -> WriteHandle {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                path = %self.inner.target.display(),
                "atomic_writer::no_runtime"
            );
            return Waiters::new().handle();
        };
        let content = content.into();

        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        state.stats.submitted += 1;

        if state.active {
            if let Some(queued) = state.queued.as_mut() {
                queued.latest = content;
                state.stats.superseded += 1;
                tracing::trace!(
                    path = %self.inner.target.display(),
                    "atomic_writer::supersede"
                );
                return queued.waiters.handle();
            }

            let waiters = Waiters::new();
            let handle = waiters.handle();
            state.queued = Some(Queued {
                latest: content,
                waiters,
            });
            tracing::trace!(
                path = %self.inner.target.display(),
                "atomic_writer::queue"
            );
            return handle;
        }

        state.active = true;
        drop(guard);

        let waiters = Waiters::new();
        let handle = waiters.handle();
        let drain = Drain {
            inner: Arc::clone(&self.inner),
            waiters: Some(waiters),
        };
        runtime.spawn(drain.run(content));
        handle
    }
}

impl<S> Clone for CoalescingAtomicWriter<S>
where
    S: Storage,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for CoalescingAtomicWriter<S>
where
    S: Storage,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoalescingAtomicWriter")
            .field("path", &self.inner.target)
            .field("temp_path", &self.inner.temp)
            .field("busy", &self.busy())
            .finish()
    }
}

/// Future that resolves to the outcome of the write
/// that persisted a call's content.
///
/// Handles returned for calls that were coalesced together
/// resolve to the same outcome.
pub struct WriteHandle {
    outcome: Shared<oneshot::Receiver<Outcome>>,
}

impl Future for WriteHandle {
    type Output = Result<()>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        self.outcome.poll_unpin(cx).map(|received| {
            received.unwrap_or_else(|_| Err(Error::Terminated))
        })
    }
}

impl fmt::Debug for WriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteHandle")
            .field("complete", &self.outcome.peek().is_some())
            .finish()
    }
}
