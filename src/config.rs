use crate::dlp::ScanMode;
use crate::race::LoserPolicy;
use crate::types::TestVector;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reference vectors shipped with the crate
const BUILTIN_VECTORS: &str = include_str!("../data/vectors.json");

fn default_workers() -> Vec<usize> {
    vec![1, 2, 4]
}

fn default_settle_ms() -> u64 {
    5_000
}

fn default_report_every() -> usize {
    3
}

fn default_cancel_losers() -> bool {
    true
}

fn default_output() -> PathBuf {
    PathBuf::from("DlogResults.txt")
}

/// Benchmark configuration: test vectors and worker count matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub vectors: Vec<TestVector>,
    /// worker counts tried on every vector, in order
    #[serde(default = "default_workers")]
    pub workers: Vec<usize>,
    /// pause between two runs of the same vector
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// number of vectors per mean time summary
    #[serde(default = "default_report_every")]
    pub report_every: usize,
    #[serde(default)]
    pub scan: ScanMode,
    /// stop the losing workers as soon as a race is decided
    #[serde(default = "default_cancel_losers")]
    pub cancel_losers: bool,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl BenchConfig {
    /// Configuration with default settings for the given vectors.
    pub fn new(vectors: Vec<TestVector>) -> Self {
        Self {
            vectors,
            workers: default_workers(),
            settle_ms: default_settle_ms(),
            report_every: default_report_every(),
            scan: ScanMode::default(),
            cancel_losers: default_cancel_losers(),
            output: default_output(),
        }
    }

    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).wrap_err("Invalid benchmark configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read the JSON configuration file with the given name.
    /// - `filename`:   name of the file
    pub fn from_file(filename: &Path) -> Result<Self> {
        let json = fs::read_to_string(filename)
            .wrap_err_with(|| format!("Couldn't open {}", filename.display()))?;
        Self::from_json(&json).wrap_err_with(|| format!("In {}", filename.display()))
    }

    /// The twelve reference vectors, from 28-bit to 34-bit moduli.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_VECTORS)
    }

    pub fn validate(&self) -> Result<()> {
        eyre::ensure!(!self.vectors.is_empty(), "No test vector given!");
        eyre::ensure!(!self.workers.is_empty(), "No worker count given!");
        eyre::ensure!(
            self.workers.iter().all(|&w| w > 0),
            "Worker counts must be at least 1: {:?}",
            self.workers
        );
        eyre::ensure!(
            self.workers.iter().collect::<HashSet<_>>().len() == self.workers.len(),
            "Duplicated worker count: {:?}",
            self.workers
        );
        eyre::ensure!(self.report_every > 0, "`report_every` must be at least 1!");
        for vector in &self.vectors {
            eyre::ensure!(
                vector.p >= 2 && vector.p <= i64::MAX as u64,
                "{}: modulus {} out of range",
                vector.name,
                vector.p
            );
            eyre::ensure!(
                vector.g < vector.p && vector.h < vector.p && vector.secret < vector.p,
                "{}: g, h and secret must be reduced modulo p",
                vector.name
            );
        }
        Ok(())
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn loser_policy(&self) -> LoserPolicy {
        if self.cancel_losers {
            LoserPolicy::Cancel
        } else {
            LoserPolicy::Detach
        }
    }
}
