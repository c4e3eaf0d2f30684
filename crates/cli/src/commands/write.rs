//! Write a file atomically.
use atomic_writer::{CoalescingAtomicWriter, WriterOptions};
use atomic_writer_vfs as vfs;
use clap::Args;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::{Result, TARGET};

/// Arguments for the write command.
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Target file path.
    #[clap(short, long)]
    pub path: PathBuf,

    /// Flush the content to disc before renaming.
    #[clap(long, env = "ATOMIC_WRITER_SYNC")]
    pub sync: bool,

    /// Read content from this file instead of stdin.
    pub input: Option<PathBuf>,
}

pub async fn run(args: WriteArgs) -> Result<()> {
    let content = match &args.input {
        Some(input) => vfs::read(input).await?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };

    let length = content.len();
    let writer = CoalescingAtomicWriter::with_options(
        &args.path,
        WriterOptions { sync: args.sync },
    )?;
    writer.write(content).await?;

    tracing::info!(
        target: TARGET,
        path = %args.path.display(),
        length,
        "write"
    );
    Ok(())
}
