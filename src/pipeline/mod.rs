//! Two-thread producer-consumer pipeline for integration jobs.
//!
//! # Architecture
//!
//! ```text
//!                        ┌──────────────────────────────┐
//!                        │          Driver              │
//!                        │  run() / run_with_source()   │
//!                        │  spawn, await, cancel, report│
//!                        └──────┬───────────────┬───────┘
//!                               │               │
//!                   ┌───────────▼───┐   ┌───────▼────────┐
//!                   │   Generator   │   │   Integrator   │
//!                   │  (one thread) │   │  (one thread)  │
//!                   └───────┬───────┘   └───────▲────────┘
//!                           │ wait_empty /      │ wait_full /
//!                           │ write+signal_full │ read+signal_empty
//!                           ▼                   │
//!                   ┌───────────────────────────┴──────┐
//!                   │  JobSlot (capacity 1)            │
//!                   │  └─ HandoffGate: Empty→Writing   │
//!                   │     →Full→Reading→Empty          │
//!                   └──────────────────────────────────┘
//! ```
//!
//! The gated variant ([`run`]) is the interesting one. [`run_simple`] is the
//! looser polling variant kept as contrast, and [`run_serial`] is the
//! single-threaded baseline.

pub mod driver;
pub mod gate;
pub mod generator;
pub mod integrator;
pub mod job;
pub mod rng;
pub mod simple;
pub mod slot;

pub use driver::{
    run, run_serial, run_with_source, PipelineConfig, PipelineError, PipelineReport,
    ShutdownPolicy, WorkerStatus,
};
pub use gate::{Cancelled, GateSnapshot, HandoffGate, Phase, ReadTurn, WriteTurn};
pub use generator::{JobSource, RandomLogJobs};
pub use integrator::JobOutcome;
pub use job::Job;
pub use simple::run_simple;
pub use slot::JobSlot;

/// How a worker left its loop.
///
/// Cancellation is a normal exit, not an error: a worker that unblocks with
/// [`Cancelled`] stops cleanly mid-run and reports so.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerExit {
    /// Processed its full share of `target` jobs.
    Completed,
    /// Unblocked by cancellation before reaching `target`.
    Cancelled,
}
