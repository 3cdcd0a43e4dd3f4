//! Numeric-integration pipeline over a single-slot blocking handoff.
//!
//! ## Scope
//! This crate has two halves. The `functions` half is a small scalar-function
//! toolkit: elementary functions, composition, array-backed tabulation with
//! linear interpolation, text/binary codecs for tabulated data, and a
//! trapezoidal-rule evaluator. The `pipeline` half is the interesting part:
//! a two-thread producer-consumer pipeline in which a job **generator** and a
//! job **integrator** exchange integration jobs through a single-capacity
//! mailbox guarded by a hand-built synchronization primitive.
//!
//! ## Key invariants
//! - The mailbox holds at most one pending job; the generator never overwrites
//!   an unconsumed job and the integrator never reads an empty slot.
//! - Handoffs are strictly alternating and totally ordered: the Nth job
//!   written is the Nth job read, no job is read twice or skipped.
//! - `consumed <= produced <= target` holds at every instant of a run.
//! - Blocking waits are cancellable: a cancelled worker unblocks promptly and
//!   treats cancellation as normal termination, not as an error.
//!
//! ## Handoff flow (one job)
//! ```text
//! Generator                 HandoffGate                 Integrator
//!    │  wait_empty() ──────▶ Empty→Writing
//!    │  slot.write(job)           │
//!    │  signal_full() ──────▶ Writing→Full ──────▶ wait_full() returns
//!    │                            │                slot.read() -> job
//!    │  wait_empty() blocks ◀── Reading→Empty ◀── signal_empty()
//!    │                                            integrate(job)  (no lock held)
//! ```
//!
//! ## Notable entry points
//! - [`pipeline::run`] / [`pipeline::PipelineConfig`]: gated two-thread run.
//! - [`pipeline::run_simple`]: the looser polling variant, kept as contrast.
//! - [`pipeline::run_serial`]: single-threaded baseline.
//! - [`functions::integrate`]: the trapezoidal evaluator the pipeline drives.
//!
//! ## Design trade-offs
//! The handoff gate is a Mutex + two Condvars rather than a ready-made
//! channel: the point is the explicit `Empty/Writing/Full/Reading` state
//! machine, which makes the mutual-exclusion contract checkable. Integration
//! runs outside the critical section so the generator prepares the next job
//! concurrently with evaluation.

pub mod functions;
pub mod pipeline;

pub use functions::{integrate, Function, IntegrationError};
pub use pipeline::{
    run, run_serial, run_simple, Job, JobOutcome, PipelineConfig, PipelineError, PipelineReport,
    ShutdownPolicy, WorkerStatus,
};
