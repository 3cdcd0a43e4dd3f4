//! Driver: spawns the two workers, applies the shutdown policy, reports.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::generator::{run_generator, JobSource, RandomLogJobs};
use super::integrator::{run_integrator, JobOutcome};
use super::slot::JobSlot;
use super::WorkerExit;

/// How the driver ends a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Let both workers process the full target.
    RunToCompletion,
    /// Let the pipeline run for the given budget, then cancel it.
    ///
    /// Cancellation is a normal ending: workers unblock, stop cleanly and
    /// report partial progress.
    CancelAfter(Duration),
}

/// Driver configuration. See [`PipelineConfig::default`] for the defaults.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Jobs a full run hands off.
    pub target: u64,
    /// Seed for the job stream; same seed, same jobs.
    pub seed: u64,
    /// Termination policy.
    pub shutdown: ShutdownPolicy,
    /// How long a cancelled worker may take to wind down before the driver
    /// gives up waiting and reports it still running.
    pub join_grace: Duration,
    /// Artificial delay per generator handoff (stress knob).
    pub generator_pace: Option<Duration>,
    /// Artificial delay per integrator job (stress knob).
    pub integrator_pace: Option<Duration>,
}

impl Default for PipelineConfig {
    /// 100 jobs, fixed seed, run to completion, 5 s join grace, no pacing.
    fn default() -> Self {
        Self {
            target: 100,
            seed: 0x853c_49e6_748f_ea9b,
            shutdown: ShutdownPolicy::RunToCompletion,
            join_grace: Duration::from_secs(5),
            generator_pace: None,
            integrator_pace: None,
        }
    }
}

/// Final status of one worker thread, as the driver saw it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum WorkerStatus {
    /// Exited after processing its full share.
    Completed,
    /// Exited cleanly after observing cancellation.
    Cancelled,
    /// Did not exit within the join grace after cancellation.
    ///
    /// The thread is detached, not killed; this status flags a worker stuck
    /// outside the handoff protocol (for example inside a long evaluation).
    StillRunning,
}

impl From<WorkerExit> for WorkerStatus {
    fn from(exit: WorkerExit) -> Self {
        match exit {
            WorkerExit::Completed => Self::Completed,
            WorkerExit::Cancelled => Self::Cancelled,
        }
    }
}

/// What a run did, end to end.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PipelineReport {
    pub target: u64,
    /// Handoffs committed by the generator.
    pub produced: u64,
    /// Handoffs retired by the integrator.
    pub consumed: u64,
    pub generator: WorkerStatus,
    pub integrator: WorkerStatus,
    /// Whether the run ended by cancellation.
    pub cancelled: bool,
    /// Per-job results in consumption order. Present only for jobs the
    /// integrator actually consumed.
    pub outcomes: Vec<JobOutcome>,
}

/// Driver-level failures.
///
/// These are infrastructure faults, distinct from per-job evaluator errors
/// (which live inside [`JobOutcome`]).
#[derive(Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// The OS refused to spawn a worker thread.
    Spawn(io::Error),
    /// A worker thread panicked. The peer worker was unblocked by the
    /// abandoned-turn cancel path, so the driver still got to join it.
    WorkerPanicked { worker: &'static str },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn worker thread: {err}"),
            Self::WorkerPanicked { worker } => write!(f, "{worker} thread panicked"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::WorkerPanicked { .. } => None,
        }
    }
}

/// Cancels the slot if the owning worker thread unwinds.
///
/// The abandoned-turn path only covers panics while a turn token is live.
/// A panic outside a turn (in the evaluator or a job source) would strand
/// the peer on a wait no signal will ever end; this guard turns it into a
/// cancellation the peer observes.
struct CancelOnPanic<'a>(&'a JobSlot);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// Run the gated pipeline with the default random-logarithm workload.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    run_with_source(config, RandomLogJobs::new(config.seed))
}

/// Run the gated pipeline with a caller-supplied job source.
pub fn run_with_source<S>(
    config: &PipelineConfig,
    source: S,
) -> Result<PipelineReport, PipelineError>
where
    S: JobSource + 'static,
{
    let slot = Arc::new(JobSlot::new(config.target));
    info!(
        jobs = config.target,
        seed = config.seed,
        "starting pipeline run"
    );

    let generator = {
        let slot = Arc::clone(&slot);
        let pace = config.generator_pace;
        let mut source = source;
        thread::Builder::new()
            .name("quadpipe-generator".into())
            .spawn(move || {
                let _guard = CancelOnPanic(&slot);
                run_generator(&slot, &mut source, pace)
            })
            .map_err(PipelineError::Spawn)?
    };
    let integrator = {
        let worker_slot = Arc::clone(&slot);
        let pace = config.integrator_pace;
        thread::Builder::new()
            .name("quadpipe-integrator".into())
            .spawn(move || {
                let _guard = CancelOnPanic(&worker_slot);
                let mut outcomes = Vec::new();
                let exit = run_integrator(&worker_slot, &mut outcomes, pace);
                (exit, outcomes)
            })
            .map_err(|err| {
                // The generator is already running; unblock it before
                // reporting the spawn failure.
                slot.cancel();
                PipelineError::Spawn(err)
            })?
    };

    let (generator_status, integrator_status, outcomes) = match config.shutdown {
        ShutdownPolicy::RunToCompletion => {
            let gen_exit = generator
                .join()
                .map_err(|_| PipelineError::WorkerPanicked { worker: "generator" })?;
            let (int_exit, outcomes) = integrator
                .join()
                .map_err(|_| PipelineError::WorkerPanicked { worker: "integrator" })?;
            (gen_exit.into(), int_exit.into(), outcomes)
        }
        ShutdownPolicy::CancelAfter(budget) => {
            let budget_deadline = Instant::now() + budget;
            // Let the run proceed; stop early if both workers finish first.
            while Instant::now() < budget_deadline
                && !(generator.is_finished() && integrator.is_finished())
            {
                thread::sleep(Duration::from_millis(1));
            }
            if generator.is_finished() && integrator.is_finished() {
                debug!("pipeline finished inside the cancel budget");
            } else {
                debug!("cancelling pipeline after budget");
                slot.cancel();
            }

            let join_deadline = Instant::now() + config.join_grace;
            let generator_status = match join_within(generator, join_deadline) {
                Some(result) => result
                    .map_err(|_| PipelineError::WorkerPanicked { worker: "generator" })?
                    .into(),
                None => {
                    warn!("generator did not exit within the join grace");
                    WorkerStatus::StillRunning
                }
            };
            let (integrator_status, outcomes) = match join_within(integrator, join_deadline) {
                Some(result) => {
                    let (exit, outcomes) = result
                        .map_err(|_| PipelineError::WorkerPanicked { worker: "integrator" })?;
                    (exit.into(), outcomes)
                }
                None => {
                    warn!("integrator did not exit within the join grace");
                    (WorkerStatus::StillRunning, Vec::new())
                }
            };
            (generator_status, integrator_status, outcomes)
        }
    };

    let snap = slot.snapshot();
    // A cancel that lands after both workers already completed did not end
    // the run; the statuses are authoritative.
    let cancelled = snap.cancelled
        && !(generator_status == WorkerStatus::Completed
            && integrator_status == WorkerStatus::Completed);
    info!(
        produced = snap.produced,
        consumed = snap.consumed,
        cancelled,
        "pipeline run finished"
    );
    Ok(PipelineReport {
        target: config.target,
        produced: snap.produced,
        consumed: snap.consumed,
        generator: generator_status,
        integrator: integrator_status,
        cancelled,
        outcomes,
    })
}

/// Join `handle` with a deadline.
///
/// `JoinHandle` has no timed join, so this polls `is_finished` in 1 ms
/// slices. Returns `None` if the thread is still running at the deadline;
/// the handle is dropped and the thread detaches.
fn join_within<T>(handle: JoinHandle<T>, deadline: Instant) -> Option<thread::Result<T>> {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(Duration::from_millis(1));
    }
    Some(handle.join())
}

/// Pre-allocation cap for outcome buffers. Absurd targets (say `u64::MAX`
/// under a cancel budget) must not abort on allocation before the run even
/// starts; the vector grows past this normally.
pub(crate) fn outcome_capacity(target: u64) -> usize {
    target.min(1024) as usize
}

/// Single-threaded baseline: same jobs, same evaluator, no threads.
///
/// Useful for comparing results against a concurrent run with the same seed,
/// and as the ground truth in tests. The shutdown policy does not apply; a
/// serial run always completes.
pub fn run_serial(config: &PipelineConfig) -> PipelineReport {
    let mut source = RandomLogJobs::new(config.seed);
    let mut outcomes = Vec::with_capacity(outcome_capacity(config.target));
    for seq in 1..=config.target {
        let job = source.next_job(seq);
        let result = job.evaluate();
        if let Err(err) = &result {
            warn!(seq, %err, "job failed in the evaluator");
        }
        outcomes.push(JobOutcome {
            seq,
            left: job.left,
            right: job.right,
            step: job.step,
            result,
        });
    }
    PipelineReport {
        target: config.target,
        produced: config.target,
        consumed: config.target,
        generator: WorkerStatus::Completed,
        integrator: WorkerStatus::Completed,
        cancelled: false,
        outcomes,
    }
}
