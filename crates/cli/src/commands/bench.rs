//! Measure write throughput and coalescing under concurrency.
use atomic_writer::{CoalescingAtomicWriter, WriterOptions, WriterStats};
use atomic_writer_vfs as vfs;
use clap::Args;
use human_bytes::human_bytes;
use std::{
    fmt,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{
    config::{BenchConfig, BenchSettings},
    Error, Result, TARGET,
};

/// Smallest payload that can hold the payload header.
const MIN_PAYLOAD_SIZE: usize = 32;

/// Arguments for the bench command.
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Target file path.
    #[clap(short, long)]
    pub path: PathBuf,

    /// Config file to load.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent tasks.
    #[clap(short, long)]
    pub tasks: Option<usize>,

    /// Number of writes for each task.
    #[clap(short, long)]
    pub writes: Option<usize>,

    /// Payload size in bytes.
    #[clap(short, long)]
    pub size: Option<usize>,

    /// Flush every write to disc before renaming.
    #[clap(long, env = "ATOMIC_WRITER_SYNC")]
    pub sync: bool,
}

/// Result of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// Workload that was run.
    pub settings: BenchSettings,
    /// Writer statistics after the run.
    pub stats: WriterStats,
    /// Wall clock time for all writes.
    pub elapsed: Duration,
}

impl BenchReport {
    fn per_second(&self, count: u64) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            count as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "tasks:        {} x {} writes of {}",
            self.settings.tasks,
            self.settings.writes,
            human_bytes(self.settings.size as f64)
        )?;
        writeln!(f, "elapsed:      {:.3?}", self.elapsed)?;
        writeln!(
            f,
            "submitted:    {} ({:.0}/s)",
            self.stats.submitted,
            self.per_second(self.stats.submitted)
        )?;
        writeln!(
            f,
            "generations:  {} ({:.0}/s)",
            self.stats.generations,
            self.per_second(self.stats.generations)
        )?;
        writeln!(f, "superseded:   {}", self.stats.superseded)?;
        write!(f, "failed:       {}", self.stats.failed)
    }
}

pub async fn run(args: BenchArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::load(path).await?,
        None => BenchConfig::default(),
    };
    if let Some(tasks) = args.tasks {
        config.bench.tasks = tasks;
    }
    if let Some(writes) = args.writes {
        config.bench.writes = writes;
    }
    if let Some(size) = args.size {
        config.bench.size = size;
    }
    if args.sync {
        config.writer.sync = true;
    }

    let report = bench(&args.path, config.writer, config.bench).await?;
    println!("{}", report);
    Ok(())
}

/// Run a benchmark against a target file.
///
/// Every task awaits each of its writes before issuing the
/// next so the number of tasks is the number of writes in
/// flight at any time.
pub async fn bench(
    path: &Path,
    options: WriterOptions,
    settings: BenchSettings,
) -> Result<BenchReport> {
    if settings.size < MIN_PAYLOAD_SIZE {
        return Err(Error::PayloadTooSmall(MIN_PAYLOAD_SIZE));
    }
    if settings.tasks == 0 || settings.writes == 0 {
        return Err(Error::EmptyBenchmark);
    }

    tracing::debug!(
        target: TARGET,
        path = %path.display(),
        tasks = settings.tasks,
        writes = settings.writes,
        size = settings.size,
        "bench::start"
    );

    let writer = CoalescingAtomicWriter::with_options(path, options)?;
    let start = Instant::now();

    let mut tasks = Vec::with_capacity(settings.tasks);
    for task in 0..settings.tasks {
        let writer = writer.clone();
        let (writes, size) = (settings.writes, settings.size);
        tasks.push(tokio::spawn(async move {
            for write in 0..writes {
                writer.write(payload(task, write, size)).await?;
            }
            Ok::<_, Error>(())
        }));
    }
    for result in futures::future::join_all(tasks).await {
        result??;
    }

    let elapsed = start.elapsed();
    verify(path, settings.size).await?;

    let report = BenchReport {
        settings,
        stats: writer.stats(),
        elapsed,
    };
    tracing::debug!(
        target: TARGET,
        generations = report.stats.generations,
        superseded = report.stats.superseded,
        "bench::complete"
    );
    Ok(report)
}

/// Payload for a write, a header naming the task and write
/// padded with a fill byte to the requested size.
fn payload(task: usize, write: usize, size: usize) -> Vec<u8> {
    let mut buf = format!("{task}:{write}:").into_bytes();
    let fill = b'a' + ((task + write) % 26) as u8;
    buf.resize(size, fill);
    buf
}

/// Verify the file holds a complete payload.
async fn verify(path: &Path, size: usize) -> Result<()> {
    let content = vfs::read(path).await?;
    let header = std::str::from_utf8(&content[..content.len().min(size)])
        .ok()
        .and_then(|text| {
            let mut parts = text.splitn(3, ':');
            let task = parts.next()?.parse::<usize>().ok()?;
            let write = parts.next()?.parse::<usize>().ok()?;
            Some((task, write))
        });

    match header {
        Some((task, write)) if payload(task, write, size) == content => Ok(()),
        _ => Err(Error::Verify(path.to_path_buf())),
    }
}
