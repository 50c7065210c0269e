use dlog_bench::bench;
use dlog_bench::config::BenchConfig;
use dlog_bench::race::{LoserPolicy, ThreadFactory};
use dlog_bench::report::{FOOTER, HEADER};
use dlog_bench::types::{TestVector, Verification};
use eyre::Result;
use std::fs;
use std::time::{Duration, Instant};

/// Small vectors whose generator is a primitive root
fn vectors() -> Vec<TestVector> {
    vec![
        TestVector::new("Synthetic 1", 10007, 5, 924, 7777),
        TestVector::new("Synthetic 2", 65537, 3, 64675, 40000),
        TestVector::new("Synthetic 3", 1000003, 2, 870294, 123457),
        TestVector::new("Synthetic 4", 100003, 2, 62502, 99999),
    ]
}

fn config(vectors: Vec<TestVector>) -> BenchConfig {
    let mut config = BenchConfig::new(vectors);
    config.settle_ms = 0;
    config
}

#[test]
fn test_benchmark() -> Result<()> {
    let tally = bench::run(&ThreadFactory::default(), &config(vectors()))?;

    // one record per (vector, worker count), in iteration order
    eyre::ensure!(tally.records.len() == 12, "Wrong number of runs!");
    for (record, (name, workers)) in tally.records.iter().zip(
        vectors()
            .iter()
            .flat_map(|v| [1, 2, 4].map(|w| (v.name.clone(), w))),
    ) {
        eyre::ensure!(
            record.test_name == name && record.workers == workers,
            "Unexpected run order: {} with {} workers",
            record.test_name,
            record.workers
        );
        eyre::ensure!(
            record.verify() == Verification::Matched,
            "{} with {} workers: {:?}",
            record.test_name,
            record.workers,
            record.verify()
        );
    }

    let report = &tally.report;
    let lines = report.lines();
    eyre::ensure!(lines.first().map(String::as_str) == Some(HEADER), "Missing header!");
    eyre::ensure!(lines.last().map(String::as_str) == Some(FOOTER), "Missing footer!");
    eyre::ensure!(report.csv_lines().len() == 12, "Wrong number of data lines!");

    // a single full window of 3 vectors: one mean per worker count
    let means: Vec<&String> = lines
        .iter()
        .filter(|line| line.starts_with("Mean execution time"))
        .collect();
    eyre::ensure!(means.len() == 3, "Wrong number of mean lines: {:?}", means);
    eyre::ensure!(
        means[0].starts_with("Mean execution time for 1 worker(s) over tests 1 to 3: "),
        "Wrong mean line: {}",
        means[0]
    );
    eyre::ensure!(tally.bucket.means().len() == 3, "The last window was not kept!");
    Ok(())
}

#[test]
fn test_failures_do_not_abort() -> Result<()> {
    let vectors = vec![
        // wrong secret: 7777 is the logarithm of 924
        TestVector::new("Wrong secret", 10007, 5, 924, 1234),
        // 0 has no logarithm
        TestVector::new("No solution", 10007, 5, 0, 1),
        TestVector::new("Synthetic 1", 10007, 5, 924, 7777),
    ];
    let mut config = config(vectors);
    config.workers = vec![1, 2];
    let tally = bench::run(&ThreadFactory::default(), &config)?;

    eyre::ensure!(tally.records.len() == 6, "Runs were skipped!");
    eyre::ensure!(
        tally.records[0].verify()
            == Verification::Mismatch {
                expected: 1234,
                got: 7777
            },
        "The mismatch was not detected!"
    );
    eyre::ensure!(
        tally.records[2].verify() == Verification::NotFound,
        "A solution was found for 0!"
    );
    eyre::ensure!(
        tally.records[5].verify() == Verification::Matched,
        "The last vector failed!"
    );

    let text = tally.report.render();
    eyre::ensure!(
        text.contains("Verification FAILED: expected 1234, got 7777"),
        "Missing verification failure!"
    );
    eyre::ensure!(
        text.contains("No solution with 2 worker(s) - No solution found in"),
        "Missing not found line!"
    );
    eyre::ensure!(
        text.contains("No solution,10007,5,1,0,2,"),
        "Missing data line of the failed search!"
    );
    Ok(())
}

#[test]
fn test_settling_delay() -> Result<()> {
    let mut config = config(vec![TestVector::new("t", 11, 2, 8, 3)]);
    config.settle_ms = 100;
    let timer = Instant::now();
    bench::run(&ThreadFactory::default(), &config)?;
    // two pauses between three runs, none after the last one
    eyre::ensure!(timer.elapsed() >= Duration::from_millis(200), "Missing pause!");
    Ok(())
}

#[test]
fn test_idempotence() -> Result<()> {
    let factory = ThreadFactory::default();
    let vector = &vectors()[2];
    let first = bench::run_once(&factory, vector, 4, LoserPolicy::Cancel)?;
    let second = bench::run_once(&factory, vector, 4, LoserPolicy::Cancel)?;
    eyre::ensure!(
        first.solution == second.solution
            && first.test_name == second.test_name
            && (first.p, first.g, first.h, first.secret, first.workers)
                == (second.p, second.g, second.h, second.secret, second.workers),
        "Two runs of the same pair disagree!"
    );
    Ok(())
}

#[test]
fn test_write_report() -> Result<()> {
    let mut config = config(vec![TestVector::new("t", 11, 2, 8, 3)]);
    config.report_every = 1;
    let tally = bench::run(&ThreadFactory::default(), &config)?;

    let path = std::env::temp_dir().join(format!("dlog-report-{}.txt", std::process::id()));
    tally.report.write(&path)?;
    let text = fs::read_to_string(&path)?;
    fs::remove_file(&path)?;

    eyre::ensure!(text.starts_with(HEADER), "Missing header!");
    eyre::ensure!(text.ends_with(&format!("{}\n", FOOTER)), "Missing footer!");
    eyre::ensure!(text.contains("t,11,2,3,8,4,"), "Missing data line!");
    eyre::ensure!(
        text.contains("over tests 1 to 1:"),
        "Missing mean line!"
    );
    Ok(())
}

#[test]
fn test_invalid_config() {
    let mut config = config(vectors());
    config.workers = vec![0];
    assert!(bench::run(&ThreadFactory::default(), &config).is_err());
}

#[test]
#[ignore = "scans up to billions of exponents per run"]
fn test_builtin_vectors() -> Result<()> {
    let mut config = BenchConfig::builtin()?;
    config.settle_ms = 0;
    let tally = bench::run(&ThreadFactory::default(), &config)?;
    for record in &tally.records {
        eyre::ensure!(
            record.verify() == Verification::Matched,
            "{} with {} workers: {:?}",
            record.test_name,
            record.workers,
            record.verify()
        );
    }
    Ok(())
}
