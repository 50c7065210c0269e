use crate::{tools, types::WorkAssignment};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Behaviour of a worker once it has reported a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// stop scanning at the first match
    #[default]
    StopAtFirst,
    /// keep scanning to the end of the range, without reporting again
    Exhaust,
}

/// Flag shared between a coordinator and its workers to stop a race.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Successive values `(x, g^x mod p)` for `x = start, start + stride, ...`
/// while `x < end`.
///
/// Only the first value and the step factor `g^stride` are computed by
/// exponentiation: each next value costs a single modular multiplication.
/// The assignment is validated first, so an empty modulus is an error.
pub struct Powers {
    x: u64,
    end: u64,
    stride: u64,
    current: u64,
    factor: u64,
    p: u64,
}

impl Powers {
    pub fn new(assignment: &WorkAssignment) -> Result<Self> {
        assignment.validate()?;
        let WorkAssignment {
            p,
            g,
            start,
            stride,
            end,
            ..
        } = *assignment;
        Ok(Self {
            x: start,
            end,
            stride,
            current: tools::mod_pow(g, start, p),
            factor: tools::mod_pow(g, stride, p),
            p,
        })
    }
}

impl Iterator for Powers {
    type Item = (u64, u64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.end {
            return None;
        }
        let item = (self.x, self.current);
        self.current = tools::mod_mul(self.current, self.factor, self.p);
        self.x = self.x.checked_add(self.stride).unwrap_or(self.end);
        Some(item)
    }
}

/// Lifecycle of a worker search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Searching,
    MatchFound,
    Done,
}

/// Worker search unit: scans one assignment for the first `x` with `g^x = h mod p`.
pub struct Searcher {
    assignment: WorkAssignment,
    mode: ScanMode,
    state: State,
    steps: u64,
    solution: Option<u64>,
    cancelled: bool,
}

impl Searcher {
    pub fn new(assignment: WorkAssignment, mode: ScanMode) -> Self {
        Self {
            assignment,
            mode,
            state: State::Idle,
            steps: 0,
            solution: None,
            cancelled: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of exponents compared so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn solution(&self) -> Option<u64> {
        self.solution
    }

    /// Whether the scan was interrupted by the cancel token.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Scan the assignment and return the first matching exponent.
    ///
    /// `report` is called exactly once, as soon as the first match is found.
    /// The cancel token is checked before every comparison.
    /// - `cancel`: token stopping the scan when triggered
    /// - `report`: callback receiving the matching exponent
    pub fn run<F>(&mut self, cancel: &CancelToken, mut report: F) -> Result<Option<u64>>
    where
        F: FnMut(u64) -> Result<()>,
    {
        eyre::ensure!(
            self.state == State::Idle,
            "A search can only be run once (current state: {:?})!",
            self.state
        );
        let powers = Powers::new(&self.assignment)?;
        self.state = State::Searching;

        let h = self.assignment.h;
        for (x, current) in powers {
            if cancel.is_cancelled() {
                self.cancelled = true;
                break;
            }
            self.steps += 1;
            if current == h && self.solution.is_none() {
                self.solution = Some(x);
                self.state = State::MatchFound;
                report(x)?;
                if self.mode == ScanMode::StopAtFirst {
                    break;
                }
            }
        }

        self.state = State::Done;
        tracing::debug!(
            start = self.assignment.start,
            stride = self.assignment.stride,
            steps = self.steps,
            solution = ?self.solution,
            cancelled = self.cancelled,
            "scan finished"
        );
        Ok(self.solution)
    }
}

/// Scan a whole assignment on the current thread and return the first match.
pub fn solve(assignment: &WorkAssignment) -> Result<Option<u64>> {
    Searcher::new(*assignment, ScanMode::StopAtFirst).run(&CancelToken::new(), |_| Ok(()))
}
