use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Path of the hidden temporary file used when writing `target`.
///
/// The temporary file lives in the same directory as the target
/// so the rename never crosses a file system boundary; for a
/// target `dir/name` it is `dir/.name.tmp`.
pub fn temp_path(target: impl AsRef<Path>) -> Result<PathBuf> {
    let target = target.as_ref();
    let name = target
        .file_name()
        .ok_or_else(|| Error::InvalidPath(target.to_path_buf()))?;

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");

    Ok(match target.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}
