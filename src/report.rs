use crate::types::{RunRecord, TestVector, Verification};
use eyre::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// CSV header of the data lines
pub const HEADER: &str = "Test,Prime,G,Secret,H,Workers,TimeSeconds,FoundSolution";

/// Last line of a complete report
pub const FOOTER: &str = "All experiments completed.";

/// Benchmark report: CSV data lines interleaved with status lines.
///
/// Status lines are also emitted as `info` events so that progress can be
/// followed while the benchmark runs.
#[derive(Clone, Debug)]
pub struct Report {
    lines: Vec<String>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    /// Start a report with its CSV header.
    pub fn new() -> Self {
        Self {
            lines: vec![HEADER.to_string()],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn status(&mut self, line: String) {
        tracing::info!("{}", line);
        self.lines.push(line);
    }

    pub fn start_vector(&mut self, vector: &TestVector) {
        self.lines.push("-".repeat(100));
        self.status(format!(
            "Starting {}: p={}, g={}, h={}, secret={}",
            vector.name, vector.p, vector.g, vector.h, vector.secret
        ));
    }

    pub fn start_run(&mut self, name: &str, workers: usize) {
        self.status(format!("{} with {} worker(s)", name, workers));
    }

    /// Add the outcome, the verification and the data line of a run.
    pub fn record(&mut self, record: &RunRecord) {
        let elapsed = record.elapsed.as_secs_f64();
        match record.verify() {
            Verification::NotFound => self.status(format!(
                "{} with {} worker(s) - No solution found in {:.2} seconds",
                record.test_name, record.workers, elapsed
            )),
            verification => {
                self.status(format!(
                    "{} with {} worker(s) completed in {:.2} seconds",
                    record.test_name, record.workers, elapsed
                ));
                if let Verification::Mismatch { expected, got } = verification {
                    let line = format!("Verification FAILED: expected {}, got {}", expected, got);
                    tracing::warn!("{}: {}", record.test_name, line);
                    self.lines.push(line);
                } else {
                    self.status(
                        "Verification successful: found solution matches expected secret."
                            .to_string(),
                    );
                }
            }
        }
        self.lines.push(record.csv_line());
        self.lines.push(String::new());
    }

    /// Add the mean time per worker count over a window of test vectors.
    /// - `first`:  1-based index of the first vector of the window
    /// - `last`:   1-based index of the last vector of the window
    /// - `means`:  `(worker count, mean seconds)` pairs
    pub fn means(&mut self, first: usize, last: usize, means: &[(usize, f64)]) {
        for (workers, mean) in means {
            self.status(format!(
                "Mean execution time for {} worker(s) over tests {} to {}: {:.2} seconds",
                workers, first, last, mean
            ));
        }
    }

    pub fn finish(&mut self) {
        self.status(FOOTER.to_string());
    }

    /// Data lines of the report, without the header.
    pub fn csv_lines(&self) -> Vec<&str> {
        // a data line has exactly as many fields as the header
        let fields = HEADER.split(',').count();
        self.lines
            .iter()
            .skip(1)
            .filter(|line| line.split(',').count() == fields)
            .map(String::as_str)
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Write the report to the file with the given name, replacing any
    /// previous content.
    /// - `filename`:   name of the report file
    pub fn write(&self, filename: &Path) -> Result<()> {
        let mut file = match File::create(filename) {
            Err(why) => Err(eyre::eyre!("Couldn't open {}: {}", filename.display(), why)),
            Ok(file) => Ok(file),
        }?;
        file.write_all(self.render().as_bytes())?;
        tracing::info!("Report written to {}", filename.display());
        Ok(())
    }
}
