//! Benchmark configuration.
use crate::Result;
use atomic_writer::WriterOptions;
use atomic_writer_vfs as vfs;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a benchmark run.
///
/// Values given on the command line take precedence over
/// values loaded from a file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Options for the writer.
    pub writer: WriterOptions,
    /// Workload settings.
    pub bench: BenchSettings,
}

/// Workload for a benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchSettings {
    /// Number of concurrent tasks.
    pub tasks: usize,
    /// Number of writes issued by each task.
    pub writes: usize,
    /// Size of each payload in bytes.
    pub size: usize,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            tasks: 8,
            writes: 1000,
            size: 4096,
        }
    }
}

impl BenchConfig {
    /// Load a configuration from a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = vfs::read_to_string(path.as_ref()).await?;
        Ok(toml::from_str(&content)?)
    }
}
