//! Consumer worker: takes jobs from the slot and runs the evaluator.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::slot::JobSlot;
use super::WorkerExit;

use crate::functions::IntegrationError;

/// Result of one consumed job.
///
/// Evaluator errors are recorded here, not propagated: a job with bad data
/// fails alone and the run continues.
#[derive(Clone, Debug, serde::Serialize)]
pub struct JobOutcome {
    pub seq: u64,
    pub left: f64,
    pub right: f64,
    pub step: f64,
    pub result: Result<f64, IntegrationError>,
}

/// Integrator loop: consume up to `slot.target()` jobs.
///
/// Each iteration is `wait_full → read → signal_empty`, with the evaluator
/// run **after** `signal_empty` so the generator refills the slot while this
/// thread integrates. Outcomes land in `outcomes` in consumption order.
///
/// The loop asserts that sequence numbers arrive in strict `1, 2, 3, ...`
/// order. A gap or repeat means the handoff protocol lost or duplicated a
/// job, which is a fault, not a recoverable condition.
///
/// `pace` inserts an artificial delay per job, used by stress tests to skew
/// relative worker speeds.
pub fn run_integrator(
    slot: &JobSlot,
    outcomes: &mut Vec<JobOutcome>,
    pace: Option<Duration>,
) -> WorkerExit {
    let mut expected_seq = 1u64;
    while expected_seq <= slot.target() {
        if let Some(delay) = pace {
            thread::sleep(delay);
        }
        let turn = match slot.wait_full() {
            Ok(turn) => turn,
            Err(_) => {
                debug!(
                    consumed = expected_seq - 1,
                    "integrator cancelled while waiting for a job"
                );
                return WorkerExit::Cancelled;
            }
        };
        let job = slot.read(&turn);
        slot.signal_empty(turn);

        assert_eq!(
            job.seq, expected_seq,
            "handoff order violated: expected seq {expected_seq}, got {}",
            job.seq
        );
        expected_seq += 1;

        let result = job.evaluate();
        if let Err(err) = &result {
            warn!(seq = job.seq, %err, "job failed in the evaluator");
        }
        outcomes.push(JobOutcome {
            seq: job.seq,
            left: job.left,
            right: job.right,
            step: job.step,
            result,
        });
    }
    debug!(jobs = slot.target(), "integrator completed");
    WorkerExit::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::basic::Constant;
    use crate::pipeline::job::Job;
    use std::sync::Arc;

    fn feed(slot: &JobSlot, job: Job) {
        let wt = slot.wait_empty().unwrap();
        slot.write(&wt, job);
        slot.signal_full(wt);
    }

    #[test]
    fn consumes_in_order_and_records_results() {
        let slot = Arc::new(JobSlot::new(3));
        let feeder = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for seq in 1..=3 {
                    feed(
                        &slot,
                        Job {
                            function: Arc::new(Constant(seq as f64)),
                            left: 0.0,
                            right: 1.0,
                            step: 0.5,
                            seq,
                        },
                    );
                }
            })
        };

        let mut outcomes = Vec::new();
        let exit = run_integrator(&slot, &mut outcomes, None);
        feeder.join().unwrap();

        assert_eq!(exit, WorkerExit::Completed);
        assert_eq!(outcomes.len(), 3);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.seq, i as u64 + 1);
            let v = outcome.result.as_ref().unwrap();
            assert!((v - (i as f64 + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn bad_job_is_recorded_not_fatal() {
        let slot = Arc::new(JobSlot::new(2));
        let feeder = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                // Inverted bounds: evaluator error, pipeline keeps going.
                feed(
                    &slot,
                    Job {
                        function: Arc::new(Constant(1.0)),
                        left: 5.0,
                        right: 1.0,
                        step: 0.5,
                        seq: 1,
                    },
                );
                feed(
                    &slot,
                    Job {
                        function: Arc::new(Constant(1.0)),
                        left: 0.0,
                        right: 1.0,
                        step: 0.5,
                        seq: 2,
                    },
                );
            })
        };

        let mut outcomes = Vec::new();
        let exit = run_integrator(&slot, &mut outcomes, None);
        feeder.join().unwrap();

        assert_eq!(exit, WorkerExit::Completed);
        assert!(matches!(
            outcomes[0].result,
            Err(IntegrationError::InvalidBounds { .. })
        ));
        assert!(outcomes[1].result.is_ok());
    }

    #[test]
    fn cancelled_slot_yields_clean_exit() {
        let slot = JobSlot::new(5);
        slot.cancel();
        let mut outcomes = Vec::new();
        assert_eq!(
            run_integrator(&slot, &mut outcomes, None),
            WorkerExit::Cancelled
        );
        assert!(outcomes.is_empty());
    }
}
