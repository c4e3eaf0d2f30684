use atomic_writer_cli::{
    commands::{
        bench::{self, BenchArgs},
        logs::{self, LogsCommand},
        write::{self, WriteArgs},
    },
    Result,
};
use atomic_writer_logs::Logger;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct AtomicWriter {
    /// Also write JSON logs to files in this directory.
    #[clap(long, env = "ATOMIC_WRITER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write stdin or a file to a target file atomically.
    Write(WriteArgs),
    /// Measure throughput of concurrent writes to one file.
    Bench(BenchArgs),
    /// Inspect and delete log files.
    Logs {
        #[clap(subcommand)]
        cmd: LogsCommand,
    },
}

async fn run(logger: &Logger, cmd: Command) -> Result<()> {
    match cmd {
        Command::Write(args) => write::run(args).await?,
        Command::Bench(args) => bench::run(args).await?,
        Command::Logs { cmd } => logs::run(logger, cmd)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = AtomicWriter::parse();

    let logger = Logger::new(args.log_dir.clone(), "atomic-writer");
    let guard = match logger.init_subscriber() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    };

    let result = run(&logger, args.cmd).await;
    if let Err(e) = &result {
        tracing::error!("{}", e);
    }

    drop(guard);
    if result.is_err() {
        std::process::exit(1);
    }
}
