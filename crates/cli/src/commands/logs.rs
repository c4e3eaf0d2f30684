//! Inspect and prune log files.
use atomic_writer_logs::Logger;
use clap::Subcommand;
use human_bytes::human_bytes;

use crate::{Error, Result};

/// Log file commands.
#[derive(Subcommand, Debug)]
pub enum LogsCommand {
    /// Print the log files and their total size.
    Status,
    /// Delete all log files except the current one.
    Delete,
}

pub fn run(logger: &Logger, cmd: LogsCommand) -> Result<()> {
    if logger.logs_dir().is_none() {
        return Err(Error::NoLogsDir);
    }

    match cmd {
        LogsCommand::Status => match logger.status()? {
            Some(status) => {
                for file in &status.log_files {
                    println!("{}", file.display());
                }
                println!("current: {}", status.current.display());
                println!(
                    "total:   {} in {} file(s)",
                    human_bytes(status.total_size as f64),
                    status.log_files.len()
                );
            }
            None => println!("no log files"),
        },
        LogsCommand::Delete => {
            let deleted = logger.delete_logs()?;
            println!("deleted {} log file(s)", deleted);
        }
    }
    Ok(())
}
