//! File system primitives for atomic writes.
//!
//! Everything from `tokio::fs` is re-exported so callers can use
//! this crate as a drop-in replacement; the additional functions
//! cover the steps of the write-to-temp-then-rename pattern.
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod os;
pub use os::*;
