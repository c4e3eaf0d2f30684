use serde::{Deserialize, Serialize};

/// Options for a writer backed by the file system.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Flush the temporary file to disc before it is renamed
    /// and the parent directory after the rename.
    ///
    /// Without this the only guarantee is the atomicity of
    /// the rename, the new content may be lost on power failure.
    pub sync: bool,
}

impl WriterOptions {
    /// Options that flush writes to disc.
    pub fn synced() -> Self {
        Self { sync: true }
    }
}
