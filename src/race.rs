//! Race coordinator: one worker per assignment, the first reported solution wins.
//!
//! Workers are started through a [`WorkerFactory`], each on its own execution
//! unit with its own point-to-point channel. The coordinator sends every worker
//! its request, then waits for the responses in arrival order. The first
//! `found` response decides the race; a worker reporting `not found` is
//! discarded and the wait goes on with the remaining ones.
use crate::channel::{self, Endpoint};
use crate::dlp::{CancelToken, ScanMode, Searcher};
use crate::protocol::{self, Response};
use crate::tools::join;
use crate::types::{SearchOutcome, WorkAssignment};
use eyre::{Result, WrapErr};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Handle on an execution unit running a worker routine.
pub type UnitHandle = thread::JoinHandle<Result<()>>;

/// Worker started by a factory.
/// - `link`:   coordinator end of the worker channel
/// - `handle`: handle on the execution unit, if it can be joined
pub struct Worker {
    pub link: Endpoint,
    pub handle: Option<UnitHandle>,
}

/// Capability to start workers on fresh execution units.
pub trait WorkerFactory {
    /// Start the worker with the given index. The worker must wait for its
    /// request on the returned channel and stop scanning once `cancel` is
    /// triggered.
    /// - `index`:  index of the worker in the race
    /// - `cancel`: race cancel token
    fn launch(&self, index: usize, cancel: &CancelToken) -> Result<Worker>;
}

/// Factory running every worker on a dedicated OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadFactory {
    pub mode: ScanMode,
}

impl ThreadFactory {
    pub fn new(mode: ScanMode) -> Self {
        Self { mode }
    }
}

impl WorkerFactory for ThreadFactory {
    fn launch(&self, index: usize, cancel: &CancelToken) -> Result<Worker> {
        let (link, peer) = channel::duplex();
        let (mode, cancel) = (self.mode, cancel.clone());
        let handle = thread::Builder::new()
            .name(format!("dlog-worker-{}", index))
            .spawn(move || serve(index, &peer, mode, &cancel))
            .wrap_err_with(|| format!("Cannot start worker {}", index))?;
        tracing::debug!(worker = index, "worker launched");
        Ok(Worker {
            link,
            handle: Some(handle),
        })
    }
}

/// Worker routine: read one request, scan it and report the outcome.
///
/// A match is sent as soon as it is found. A worker exhausting its range
/// without a match sends `not found`; a cancelled worker sends nothing.
/// - `index`:  worker index, used for logging
/// - `link`:   worker end of the channel
/// - `mode`:   behaviour after a match
/// - `cancel`: race cancel token
pub fn serve(index: usize, link: &Endpoint, mode: ScanMode, cancel: &CancelToken) -> Result<()> {
    let assignment = protocol::decode_request(&link.recv()?)?;
    tracing::debug!(
        worker = index,
        start = assignment.start,
        stride = assignment.stride,
        end = assignment.end,
        "worker searching"
    );

    let mut searcher = Searcher::new(assignment, mode);
    let solution = searcher.run(cancel, |x| {
        tracing::debug!(worker = index, solution = x, "match found");
        link.send(protocol::encode_response(&Response::Found(x))?)
    })?;

    if solution.is_none() && !searcher.cancelled() {
        link.send(protocol::encode_response(&Response::NotFound)?)?;
    }
    Ok(())
}

/// What happens to the workers still running once the race is decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoserPolicy {
    /// trigger the cancel token and join every worker
    Cancel,
    /// leave the workers running until they exhaust their range
    Detach,
}

/// Outcome of a race.
/// - `winner`:     first reported solution, `None` if every worker exhausted its range
/// - `elapsed`:    time from dispatch to the deciding response
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaceResult {
    pub winner: Option<SearchOutcome>,
    pub elapsed: Duration,
}

impl RaceResult {
    pub fn solution(&self) -> Option<u64> {
        self.winner.and_then(|outcome| outcome.solution)
    }
}

/// Run one worker per assignment and return the first solution reported.
/// - `factory`:        worker factory
/// - `assignments`:    one assignment per worker
/// - `losers`:         policy applied to the remaining workers
pub fn race<F>(factory: &F, assignments: &[WorkAssignment], losers: LoserPolicy) -> Result<RaceResult>
where
    F: WorkerFactory + ?Sized,
{
    eyre::ensure!(!assignments.is_empty(), "Cannot run a race without workers!");
    let requests = assignments
        .iter()
        .map(protocol::encode_request)
        .collect::<Result<Vec<_>>>()?;

    let cancel = CancelToken::new();
    let mut handles = Vec::with_capacity(assignments.len());
    let res = dispatch_and_wait(factory, requests, &cancel, &mut handles);

    if losers == LoserPolicy::Cancel || res.is_err() {
        cancel.cancel();
    }
    if losers == LoserPolicy::Cancel {
        for (index, handle) in handles.iter_mut().enumerate() {
            if let Some(handle) = handle.take() {
                if let Err(err) = join(handle) {
                    tracing::warn!(worker = index, "worker failed after the race: {:?}", err);
                }
            }
        }
    }

    let res = res?;
    tracing::debug!(
        workers = assignments.len(),
        winner = ?res.winner,
        elapsed = res.elapsed.as_secs_f64(),
        "race decided"
    );
    Ok(res)
}

/// Start the workers, send their requests and wait for the deciding response.
fn dispatch_and_wait<F>(
    factory: &F,
    requests: Vec<Vec<u8>>,
    cancel: &CancelToken,
    handles: &mut Vec<Option<UnitHandle>>,
) -> Result<RaceResult>
where
    F: WorkerFactory + ?Sized,
{
    // allocate every execution unit before the timer starts
    let mut links = Vec::with_capacity(requests.len());
    for index in 0..requests.len() {
        let Worker { link, handle } = factory.launch(index, cancel)?;
        links.push(link);
        handles.push(handle);
    }

    // responses are forwarded here in arrival order
    let (done_tx, done_rx) = mpsc::channel::<(usize, Result<Response>)>();

    let timer = Instant::now();
    for (index, (link, request)) in links.into_iter().zip(requests).enumerate() {
        link.send(request)
            .wrap_err_with(|| format!("Cannot dispatch the request of worker {}", index))?;
        let done_tx = done_tx.clone();
        thread::Builder::new()
            .name(format!("dlog-reader-{}", index))
            .spawn(move || {
                let response = link
                    .recv()
                    .and_then(|bytes| protocol::decode_response(&bytes));
                // nobody listens anymore once the race is decided
                let _ = done_tx.send((index, response));
            })
            .wrap_err_with(|| format!("Cannot start the reader of worker {}", index))?;
    }
    drop(done_tx);

    let mut pending = handles.len();
    while pending > 0 {
        let (origin, response) = done_rx
            .recv()
            .map_err(|err| eyre::eyre!("Receive Error: {:?}", err))?;
        pending -= 1;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                // the faulty worker may still be scanning
                cancel.cancel();
                // surface the failure of the worker itself when there is one
                if let Some(handle) = handles[origin].take() {
                    join(handle).wrap_err_with(|| format!("Worker {} failed", origin))?;
                }
                return Err(err.wrap_err(format!("Worker {} did not respond", origin)));
            }
        };

        match response {
            Response::Found(x) => {
                return Ok(RaceResult {
                    winner: Some(SearchOutcome {
                        solution: Some(x),
                        origin,
                    }),
                    elapsed: timer.elapsed(),
                })
            }
            Response::NotFound => {
                tracing::debug!(worker = origin, "worker exhausted its range");
            }
        }
    }

    Ok(RaceResult {
        winner: None,
        elapsed: timer.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlp;

    #[test]
    fn test_race_small() -> Result<()> {
        // 2^3 = 8 mod 11
        for n in 1..=4 {
            let assignments = dlp::partition(11, 2, 8, n)?;
            let res = race(&ThreadFactory::default(), &assignments, LoserPolicy::Cancel)?;
            eyre::ensure!(res.solution() == Some(3), "Wrong solution with {} workers!", n);
            let origin = res.winner.map(|w| w.origin);
            eyre::ensure!(origin == Some(3 % n), "Wrong winner: {:?}", origin);
        }
        Ok(())
    }

    #[test]
    fn test_race_without_workers() {
        assert!(race(&ThreadFactory::default(), &[], LoserPolicy::Cancel).is_err());
    }

    #[test]
    fn test_serve_rejects_malformed_request() {
        let (link, peer) = channel::duplex();
        let handle = thread::spawn(move || {
            serve(0, &peer, ScanMode::StopAtFirst, &CancelToken::new())
        });
        assert!(link.send(vec![1, 2, 3]).is_ok());
        assert!(join(handle).is_err());
    }
}
