//! Atomic writes to a single file with coalescing of
//! overlapping requests.
//!
//! A [CoalescingAtomicWriter] is bound to one target path. Every
//! write replaces the entire file by writing a hidden temporary
//! file next to the target and renaming it over the target so
//! readers only ever observe complete content.
//!
//! When writes are requested while another write is in flight
//! only the most recent payload is persisted once the current
//! write finishes; every caller whose payload was superseded
//! shares the outcome of that write.
//!
//! ```no_run
//! use atomic_writer::CoalescingAtomicWriter;
//!
//! # async fn run() -> Result<(), atomic_writer::Error> {
//! let writer = CoalescingAtomicWriter::new("state.json")?;
//! let first = writer.write(r#"{"count":1}"#);
//! let second = writer.write(r#"{"count":2}"#);
//! first.await?;
//! second.await?;
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(all(doc, CHANNEL_NIGHTLY), feature(doc_auto_cfg))]

mod error;
mod options;
mod paths;
mod storage;
mod writer;

pub use error::Error;
pub use options::WriterOptions;
pub use paths::temp_path;
pub use storage::{FileSystem, Storage};
pub use writer::{CoalescingAtomicWriter, WriteHandle, WriterStats};

pub use bytes::Bytes;

/// Result type for the library.
pub type Result<T> = std::result::Result<T, Error>;
