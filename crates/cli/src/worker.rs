//! Runs a load on a worker thread and gives up on it after a deadline.
//!
//! Loads own all their state, so an overrunning worker is simply detached;
//! its result is dropped whenever it finishes.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("load did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("load worker panicked")]
    Panicked,
}

/// Run `job` on its own thread, checking every `poll` until it finishes or
/// `budget` has elapsed.
pub fn run_with_budget<T, F>(budget: Duration, poll: Duration, job: F) -> Result<T, WorkerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    let started = Instant::now();
    thread::spawn(move || {
        // The receiver is gone once we have given up.
        let _ = tx.send(job());
    });

    let poll = poll.max(Duration::from_millis(1));
    loop {
        match rx.recv_timeout(poll) {
            Ok(result) => {
                log::debug!("load finished in {:?}", started.elapsed());
                return Ok(result);
            }
            Err(RecvTimeoutError::Timeout) => {
                let elapsed = started.elapsed();
                if elapsed >= budget {
                    log::warn!("abandoning load after {elapsed:?}");
                    return Err(WorkerError::TimedOut(budget));
                }
                log::trace!("still loading after {elapsed:?}");
            }
            Err(RecvTimeoutError::Disconnected) => return Err(WorkerError::Panicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(5);

    #[test]
    fn returns_the_job_result() {
        let result = run_with_budget(Duration::from_secs(5), POLL, || 6 * 7).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn gives_up_on_slow_jobs() {
        let started = Instant::now();
        let result = run_with_budget(Duration::from_millis(50), POLL, || {
            thread::sleep(Duration::from_secs(2));
        });
        assert!(matches!(result, Err(WorkerError::TimedOut(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn reports_panicking_jobs() {
        let result: Result<(), _> =
            run_with_budget(Duration::from_secs(5), POLL, || panic!("bad dump"));
        assert!(matches!(result, Err(WorkerError::Panicked)));
    }
}
