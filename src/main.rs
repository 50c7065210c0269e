use clap::Parser;
use dlog_bench::config::BenchConfig;
use dlog_bench::dlp::ScanMode;
use dlog_bench::race::ThreadFactory;
use dlog_bench::{bench, logging};
use eyre::Result;
use std::path::PathBuf;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "dlog-bench")]
#[command(about = "Time a parallel brute-force discrete logarithm search against the number of workers")]
#[command(version)]
struct Args {
    /// JSON benchmark configuration (defaults to the built-in vectors)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker counts to try on every vector
    #[arg(short, long, value_delimiter = ',')]
    workers: Option<Vec<usize>>,

    /// Pause between two runs of the same vector, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Number of vectors per mean time summary
    #[arg(long)]
    report_every: Option<usize>,

    /// Keep scanning after a match instead of stopping
    #[arg(long)]
    keep_scanning: bool,

    /// Let losing workers run to the end of their range
    #[arg(long)]
    no_cancel: bool,

    /// Only check that every vector satisfies g^secret = h mod p
    #[arg(long)]
    check: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_file(path)?,
        None => BenchConfig::builtin()?,
    };
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(workers) = &args.workers {
        config.workers = workers.clone();
    }
    if let Some(settle_ms) = args.settle_ms {
        config.settle_ms = settle_ms;
    }
    if let Some(report_every) = args.report_every {
        config.report_every = report_every;
    }
    if args.keep_scanning {
        config.scan = ScanMode::Exhaust;
    }
    if args.no_cancel {
        config.cancel_losers = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    let config = load_config(&args)?;

    if args.check {
        for vector in &config.vectors {
            vector.check()?;
            tracing::info!("{}: g^secret = h mod p", vector.name);
        }
        return Ok(());
    }

    tracing::info!(
        vectors = config.vectors.len(),
        workers = ?config.workers,
        scan = ?config.scan,
        cancel_losers = config.cancel_losers,
        "starting benchmark"
    );
    let tally = bench::run(&ThreadFactory::new(config.scan), &config)?;
    tally.report.write(&config.output)
}
