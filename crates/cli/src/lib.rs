//! Command line tool for the coalescing atomic writer.
#![forbid(unsafe_code)]

/// Target for tracing macros.
///
/// Used so that error messages are succinct rather than
/// including the full module path.
pub const TARGET: &str = "atomic_writer";

pub mod commands;
pub mod config;
mod error;

pub use error::Error;

/// Result type for the executable library.
pub type Result<T> = std::result::Result<T, Error>;
