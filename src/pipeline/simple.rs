//! The ungated variant: a mutex-guarded mailbox with polling workers.
//!
//! Kept as a working contrast to the gated pipeline. There is no phase
//! machine and no blocking handoff; each side spins (with `yield_now`) until
//! the mailbox is in the state it wants. Correct, because the mutex still
//! serializes access and `Option::take` makes each job consumed exactly
//! once, but wasteful: both threads burn cycles polling instead of sleeping.
//!
//! This variant always runs to completion; the driver's shutdown policy does
//! not apply here.

use std::sync::{Arc, Mutex};
use std::thread;

use tracing::warn;

use super::driver::{
    outcome_capacity, PipelineConfig, PipelineError, PipelineReport, WorkerStatus,
};
use super::generator::{JobSource, RandomLogJobs};
use super::integrator::JobOutcome;
use super::job::Job;

fn lock_mailbox(mailbox: &Mutex<Option<Job>>) -> std::sync::MutexGuard<'_, Option<Job>> {
    // A poisoned mailbox means the peer panicked; the pending job (if any)
    // is still valid, so keep going and let join() surface the panic.
    match mailbox.lock() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    }
}

/// Run the polling pipeline with the default random-logarithm workload.
pub fn run_simple(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    let mailbox: Arc<Mutex<Option<Job>>> = Arc::new(Mutex::new(None));
    let target = config.target;

    let producer = {
        let mailbox = Arc::clone(&mailbox);
        let mut source = RandomLogJobs::new(config.seed);
        thread::Builder::new()
            .name("quadpipe-simple-generator".into())
            .spawn(move || {
                for seq in 1..=target {
                    let mut job = Some(source.next_job(seq));
                    // Spin until the consumer has drained the previous job.
                    loop {
                        let mut pending = lock_mailbox(&mailbox);
                        if pending.is_none() {
                            *pending = job.take();
                            break;
                        }
                        drop(pending);
                        thread::yield_now();
                    }
                }
            })
            .map_err(PipelineError::Spawn)?
    };

    let consumer = {
        let mailbox = Arc::clone(&mailbox);
        thread::Builder::new()
            .name("quadpipe-simple-integrator".into())
            .spawn(move || {
                let mut outcomes = Vec::with_capacity(outcome_capacity(target));
                while (outcomes.len() as u64) < target {
                    let job = loop {
                        let mut pending = lock_mailbox(&mailbox);
                        if let Some(job) = pending.take() {
                            break job;
                        }
                        drop(pending);
                        thread::yield_now();
                    };
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
                outcomes
            })
            .map_err(PipelineError::Spawn)?
    };

    producer
        .join()
        .map_err(|_| PipelineError::WorkerPanicked { worker: "generator" })?;
    let outcomes = consumer
        .join()
        .map_err(|_| PipelineError::WorkerPanicked { worker: "integrator" })?;

    Ok(PipelineReport {
        target,
        produced: target,
        consumed: target,
        generator: WorkerStatus::Completed,
        integrator: WorkerStatus::Completed,
        cancelled: false,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::driver::run_serial;

    #[test]
    fn simple_variant_consumes_every_job_in_order() {
        let config = PipelineConfig {
            target: 40,
            ..PipelineConfig::default()
        };
        let report = run_simple(&config).unwrap();
        assert_eq!(report.consumed, 40);
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(outcome.seq, i as u64 + 1);
        }
    }

    #[test]
    fn simple_variant_matches_serial_baseline() {
        let config = PipelineConfig {
            target: 20,
            seed: 4242,
            ..PipelineConfig::default()
        };
        let simple = run_simple(&config).unwrap();
        let serial = run_serial(&config);
        for (a, b) in simple.outcomes.iter().zip(&serial.outcomes) {
            match (&a.result, &b.result) {
                (Ok(x), Ok(y)) => assert_eq!(x.to_bits(), y.to_bits()),
                (x, y) => assert_eq!(x.is_err(), y.is_err()),
            }
        }
    }
}
