use crate::tools;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Benchmark test vector: find `secret` such that `g^secret = h mod p`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    pub name: String,
    /// prime modulus
    pub p: u64,
    /// generator
    pub g: u64,
    /// target
    pub h: u64,
    /// expected exponent
    pub secret: u64,
}

impl TestVector {
    pub fn new(name: &str, p: u64, g: u64, h: u64, secret: u64) -> Self {
        Self {
            name: name.to_string(),
            p,
            g,
            h,
            secret,
        }
    }

    /// Check the ground truth of the vector: `secret < p` and `g^secret = h mod p`.
    pub fn check(&self) -> Result<()> {
        eyre::ensure!(
            self.secret < self.p,
            "{}: secret {} is not smaller than p = {}",
            self.name,
            self.secret,
            self.p
        );
        let h = tools::mod_pow(self.g, self.secret, self.p);
        eyre::ensure!(
            h == self.h,
            "{}: g^secret mod p = {}, expected h = {}",
            self.name,
            h,
            self.h
        );
        Ok(())
    }
}

/// Exponent range given to a single worker: `{start, start + stride, ...} ∩ [0, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkAssignment {
    pub p: u64,
    pub g: u64,
    pub h: u64,
    pub start: u64,
    pub stride: u64,
    /// exclusive upper bound
    pub end: u64,
}

impl WorkAssignment {
    /// Check the assignment can be searched.
    pub fn validate(&self) -> Result<()> {
        eyre::ensure!(self.p > 0, "The modulus must be positive!");
        eyre::ensure!(self.stride > 0, "The stride must be at least 1!");
        eyre::ensure!(
            self.end <= self.p,
            "The range end ({}) exceeds the modulus ({})!",
            self.end,
            self.p
        );
        Ok(())
    }

    /// Iterate over the exponents covered by this assignment.
    pub fn exponents(&self) -> impl Iterator<Item = u64> {
        (self.start..self.end.max(self.start)).step_by(self.stride.max(1) as usize)
    }
}

/// Result reported by one worker.
/// - `solution`:   matching exponent, `None` if the range holds no solution
/// - `origin`:     index of the worker that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub solution: Option<u64>,
    pub origin: usize,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        self.solution.is_some()
    }
}

/// Comparison between a run result and the expected secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    Matched,
    Mismatch { expected: u64, got: u64 },
    NotFound,
}

/// Immutable record of one `(test vector, worker count)` run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunRecord {
    pub test_name: String,
    pub p: u64,
    pub g: u64,
    pub secret: u64,
    pub h: u64,
    pub workers: usize,
    pub elapsed: Duration,
    pub solution: Option<u64>,
}

impl RunRecord {
    pub fn new(
        vector: &TestVector,
        workers: usize,
        elapsed: Duration,
        solution: Option<u64>,
    ) -> Self {
        Self {
            test_name: vector.name.clone(),
            p: vector.p,
            g: vector.g,
            secret: vector.secret,
            h: vector.h,
            workers,
            elapsed,
            solution,
        }
    }

    pub fn verify(&self) -> Verification {
        match self.solution {
            None => Verification::NotFound,
            Some(x) if x == self.secret => Verification::Matched,
            Some(x) => Verification::Mismatch {
                expected: self.secret,
                got: x,
            },
        }
    }

    /// CSV line matching the `Test,Prime,G,Secret,H,Workers,TimeSeconds,FoundSolution` header.
    pub fn csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.2},{}",
            self.test_name,
            self.p,
            self.g,
            self.secret,
            self.h,
            self.workers,
            self.elapsed.as_secs_f64(),
            self.solution.map(|x| x.to_string()).unwrap_or_default()
        )
    }
}

/// Elapsed times accumulated per worker count over a reporting window.
#[derive(Clone, Debug, Default)]
pub struct TimingBucket(BTreeMap<usize, Vec<Duration>>);

impl TimingBucket {
    /// Create a bucket with an empty slot for each of the given worker counts.
    pub fn new(workers: &[usize]) -> Self {
        Self(workers.iter().map(|&w| (w, Vec::new())).collect())
    }

    pub fn push(&mut self, workers: usize, elapsed: Duration) {
        self.0.entry(workers).or_default().push(elapsed);
    }

    /// Mean elapsed time in seconds for each worker count holding samples,
    /// in increasing worker count order.
    pub fn means(&self) -> Vec<(usize, f64)> {
        self.0
            .iter()
            .filter(|(_, times)| !times.is_empty())
            .map(|(&w, times)| {
                let sum: f64 = times.iter().map(Duration::as_secs_f64).sum();
                (w, sum / times.len() as f64)
            })
            .collect()
    }

    /// Empty every slot, keeping the worker counts.
    pub fn clear(&mut self) {
        self.0.values_mut().for_each(Vec::clear);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}
