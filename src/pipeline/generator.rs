//! Producer worker: builds jobs and hands them to the slot.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::job::Job;
use super::rng::XorShift64;
use super::slot::JobSlot;
use super::WorkerExit;

use crate::functions::basic::Log;

/// Source of jobs for the generator loop.
///
/// Implementations decide what each job integrates; the loop owns sequencing
/// and the handoff protocol. `seq` starts at 1 and increments per job.
pub trait JobSource: Send {
    fn next_job(&mut self, seq: u64) -> Job;
}

/// The default workload: logarithms with random base over random intervals.
///
/// Per job, all drawn from the source's own deterministic RNG:
///
/// - base in `(1, 10]` (bases at or below 1 are not valid logarithms),
/// - `left` in `[1, 100)`, `right` in `[100, 200)`,
/// - `step` in `[0.01, 1)`, clamped to half the interval so every job is a
///   valid integration request.
///
/// `left` starts at 1 so the interval always sits inside the logarithm's
/// positive domain; out-of-domain jobs are exercised separately in tests via
/// a custom [`JobSource`].
#[derive(Debug)]
pub struct RandomLogJobs {
    rng: XorShift64,
}

impl RandomLogJobs {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: XorShift64::new(seed),
        }
    }
}

impl JobSource for RandomLogJobs {
    fn next_job(&mut self, seq: u64) -> Job {
        // Keep the base strictly above 1; ln(1) = 0 would divide by zero.
        let base = 1.0 + 1e-6 + self.rng.next_f64() * (9.0 - 1e-6);
        let left = self.rng.next_range(1.0, 100.0);
        let right = self.rng.next_range(100.0, 200.0);
        let step = self
            .rng
            .next_range(0.01, 1.0)
            .min((right - left) / 2.0);
        Job {
            function: Arc::new(Log::new(base)),
            left,
            right,
            step,
            seq,
        }
    }
}

/// Generator loop: produce `slot.target()` jobs, one handoff each.
///
/// Each iteration builds the next job outside the critical section, then
/// `wait_empty → write → signal_full`. Returns [`WorkerExit::Cancelled`] as
/// soon as a wait observes cancellation; that is a clean exit.
///
/// `pace` inserts an artificial delay before each handoff, used by stress
/// tests to skew relative worker speeds.
pub fn run_generator(
    slot: &JobSlot,
    source: &mut dyn JobSource,
    pace: Option<Duration>,
) -> WorkerExit {
    for seq in 1..=slot.target() {
        let job = source.next_job(seq);
        if let Some(delay) = pace {
            thread::sleep(delay);
        }
        let turn = match slot.wait_empty() {
            Ok(turn) => turn,
            Err(_) => {
                debug!(seq, "generator cancelled while waiting for empty slot");
                return WorkerExit::Cancelled;
            }
        };
        slot.write(&turn, job);
        slot.signal_full(turn);
    }
    debug!(jobs = slot.target(), "generator completed");
    WorkerExit::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Function;

    #[test]
    fn random_jobs_are_always_valid_requests() {
        let mut source = RandomLogJobs::new(12345);
        for seq in 1..=500 {
            let job = source.next_job(seq);
            assert_eq!(job.seq, seq);
            assert!(job.left >= 1.0 && job.left < 100.0, "left={}", job.left);
            assert!(job.right >= 100.0 && job.right < 200.0, "right={}", job.right);
            assert!(job.step > 0.0 && job.step <= (job.right - job.left) / 2.0);
            // The sampled interval sits inside the logarithm's domain.
            let (dl, _) = job.function.domain();
            assert!(job.left > dl);
        }
    }

    #[test]
    fn job_stream_is_reproducible() {
        let mut a = RandomLogJobs::new(7);
        let mut b = RandomLogJobs::new(7);
        for seq in 1..=50 {
            let ja = a.next_job(seq);
            let jb = b.next_job(seq);
            assert_eq!(ja.left.to_bits(), jb.left.to_bits());
            assert_eq!(ja.right.to_bits(), jb.right.to_bits());
            assert_eq!(ja.step.to_bits(), jb.step.to_bits());
        }
    }

    #[test]
    fn generator_stops_on_cancelled_slot() {
        let slot = JobSlot::new(10);
        slot.cancel();
        let mut source = RandomLogJobs::new(1);
        assert_eq!(
            run_generator(&slot, &mut source, None),
            WorkerExit::Cancelled
        );
        assert_eq!(slot.snapshot().produced, 0);
    }
}
