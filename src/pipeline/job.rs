//! The unit of work the two workers exchange.

use std::fmt;
use std::sync::Arc;

use crate::functions::{integrate, Function, IntegrationError};

/// One integration request: a function, an interval and a step.
///
/// Jobs are immutable once handed off — [`JobSlot::read`](super::slot::JobSlot::read)
/// transfers ownership out of the slot, so the generator cannot touch a job
/// after signaling it full even by mistake.
///
/// `seq` is the monotonic handoff sequence number, assigned by the generator
/// starting at 1. The integrator asserts it increases by exactly one per
/// read, which makes lost or duplicated handoffs loudly visible.
#[derive(Clone)]
pub struct Job {
    pub function: Arc<dyn Function>,
    pub left: f64,
    pub right: f64,
    pub step: f64,
    pub seq: u64,
}

impl Job {
    /// Run the evaluator for this job.
    ///
    /// Errors are per-job data errors (bad bounds, bad step, interval outside
    /// the function's domain) and are recorded, not propagated as pipeline
    /// failures.
    pub fn evaluate(&self) -> Result<f64, IntegrationError> {
        integrate(self.function.as_ref(), self.left, self.right, self.step)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("step", &self.step)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}
