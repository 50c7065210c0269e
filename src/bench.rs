//! Benchmark orchestrator: runs every test vector against every worker count,
//! one run at a time, and measures the time to the first solution.
use crate::config::BenchConfig;
use crate::dlp;
use crate::race::{self, LoserPolicy, WorkerFactory};
use crate::report::Report;
use crate::types::{RunRecord, TestVector, TimingBucket, Verification};
use eyre::Result;
use std::thread;

/// State threaded through the benchmark loop.
/// - `report`:     report being written
/// - `bucket`:     elapsed times of the current reporting window
/// - `records`:    every run so far, in execution order
#[derive(Clone, Debug)]
pub struct Tally {
    pub report: Report,
    pub bucket: TimingBucket,
    pub records: Vec<RunRecord>,
}

impl Tally {
    pub fn new(workers: &[usize]) -> Self {
        Self {
            report: Report::new(),
            bucket: TimingBucket::new(workers),
            records: Vec::new(),
        }
    }

    /// Add a finished run.
    pub fn push(mut self, record: RunRecord) -> Self {
        self.bucket.push(record.workers, record.elapsed);
        self.report.record(&record);
        self.records.push(record);
        self
    }

    /// Report the mean times of the window ending at the given vector, then
    /// reset the timing bucket.
    /// - `first`:  1-based index of the first vector of the window
    /// - `last`:   1-based index of the last vector of the window
    pub fn flush_means(mut self, first: usize, last: usize) -> Self {
        let means = self.bucket.means();
        self.report.means(first, last, &means);
        self.bucket.clear();
        self
    }
}

/// Run the race for one vector with the given number of workers.
/// - `factory`:    worker factory
/// - `vector`:     test vector
/// - `workers`:    number of workers
/// - `losers`:     policy applied to the losing workers
pub fn run_once<F>(
    factory: &F,
    vector: &TestVector,
    workers: usize,
    losers: LoserPolicy,
) -> Result<RunRecord>
where
    F: WorkerFactory + ?Sized,
{
    let assignments = dlp::partition(vector.p, vector.g, vector.h, workers)?;
    let res = race::race(factory, &assignments, losers)?;
    let record = RunRecord::new(vector, workers, res.elapsed, res.solution());
    if let Verification::Mismatch { expected, got } = record.verify() {
        tracing::warn!(
            test = %vector.name,
            workers,
            expected,
            got,
            "solution does not match the expected secret"
        );
    }
    Ok(record)
}

/// Run one vector against every worker count of the configuration.
/// - `factory`:    worker factory
/// - `config`:     benchmark configuration
/// - `vector`:     test vector
/// - `tally`:      state of the benchmark
pub fn run_vector<F>(
    factory: &F,
    config: &BenchConfig,
    vector: &TestVector,
    mut tally: Tally,
) -> Result<Tally>
where
    F: WorkerFactory + ?Sized,
{
    tally.report.start_vector(vector);
    for (i, &workers) in config.workers.iter().enumerate() {
        if i > 0 && config.settle_ms > 0 {
            thread::sleep(config.settle());
        }
        tally.report.start_run(&vector.name, workers);
        let record = run_once(factory, vector, workers, config.loser_policy())?;
        tally = tally.push(record);
    }
    Ok(tally)
}

/// Run the whole benchmark and return its final state, report included.
/// - `factory`:    worker factory
/// - `config`:     benchmark configuration
pub fn run<F>(factory: &F, config: &BenchConfig) -> Result<Tally>
where
    F: WorkerFactory + ?Sized,
{
    config.validate()?;
    let window = config.report_every;
    let mut tally = Tally::new(&config.workers);

    for (index, vector) in config.vectors.iter().enumerate() {
        tally = run_vector(factory, config, vector, tally)?;
        let done = index + 1;
        if done % window == 0 {
            tally = tally.flush_means(done + 1 - window, done);
        }
    }

    tally.report.finish();
    Ok(tally)
}
