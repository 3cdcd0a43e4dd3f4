//! Single-job slot: the gate plus the one cell it guards.
//!
//! The cell is an `UnsafeCell<Option<Job>>` rather than a second mutex. The
//! access protocol makes a lock redundant:
//!
//! 1. The cell is touched only through [`JobSlot::write`] and
//!    [`JobSlot::read`], which demand a live turn token from **this** slot's
//!    gate (checked by pointer identity).
//! 2. The gate's state machine issues at most one live token at a time
//!    (`Writing` and `Reading` are exclusive reservations, and abandoning a
//!    token cancels the gate instead of recycling the phase).
//! 3. The gate mutex's acquire/release on every phase transition orders the
//!    cell access of one turn before the cell access of the next.
//!
//! So every cell access is exclusive and happens-before the following one.
//! That is the whole safety argument for the `unsafe impl Sync` below.

use std::cell::UnsafeCell;

use super::gate::{Cancelled, GateSnapshot, HandoffGate, ReadTurn, WriteTurn};
use super::job::Job;

/// A capacity-one job mailbox shared by the generator and the integrator.
///
/// Holds the [`HandoffGate`], the job cell and the run's `target` (how many
/// jobs a full run hands off). Workers drive it in strict alternation:
///
/// ```text
/// generator: wait_empty → write → signal_full
/// integrator: wait_full → read → signal_empty
/// ```
#[derive(Debug)]
pub struct JobSlot {
    gate: HandoffGate,
    cell: UnsafeCell<Option<Job>>,
    target: u64,
}

// SAFETY: the cell is only accessed with a turn token issued by `self.gate`,
// and the gate issues at most one live token at a time. Token issue and
// retirement go through the gate mutex, which provides the happens-before
// edge between consecutive accesses. See the module docs.
unsafe impl Sync for JobSlot {}

impl JobSlot {
    /// Create an empty slot for a run of `target` handoffs.
    pub fn new(target: u64) -> Self {
        Self {
            gate: HandoffGate::new(),
            cell: UnsafeCell::new(None),
            target,
        }
    }

    /// Number of handoffs a complete run performs.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Block until the slot is empty and reserve it for writing.
    pub fn wait_empty(&self) -> Result<WriteTurn<'_>, Cancelled> {
        self.gate.wait_empty()
    }

    /// Block until the slot holds a job and reserve it for reading.
    pub fn wait_full(&self) -> Result<ReadTurn<'_>, Cancelled> {
        self.gate.wait_full()
    }

    /// Place `job` in the slot under a live write reservation.
    ///
    /// # Panics
    ///
    /// Panics if `turn` came from another slot's gate, or if the cell is
    /// occupied. An occupied cell under a write reservation means a previous
    /// handoff was committed without being drained, which the gate's state
    /// machine is supposed to make impossible.
    pub fn write(&self, turn: &WriteTurn<'_>, job: Job) {
        assert!(
            turn.issued_by(&self.gate),
            "write with a turn from a different gate"
        );
        // SAFETY: `turn` is the unique live reservation for this gate, so no
        // other thread can reach the cell until it is committed or abandoned.
        let cell = unsafe { &mut *self.cell.get() };
        assert!(
            cell.is_none(),
            "generator overwrote an unconsumed job (seq {})",
            job.seq
        );
        *cell = Some(job);
    }

    /// Take the pending job out of the slot under a live read reservation.
    ///
    /// # Panics
    ///
    /// Panics if `turn` came from another slot's gate, or if the cell is
    /// empty despite the `Full` phase that issued the reservation.
    pub fn read(&self, turn: &ReadTurn<'_>) -> Job {
        assert!(
            turn.issued_by(&self.gate),
            "read with a turn from a different gate"
        );
        // SAFETY: as in `write`, the reservation is exclusive.
        let cell = unsafe { &mut *self.cell.get() };
        cell.take()
            .expect("integrator read an empty slot under a full reservation")
    }

    /// Commit a written job and wake the reader.
    pub fn signal_full(&self, turn: WriteTurn<'_>) {
        self.gate.signal_full(turn);
    }

    /// Retire a read job and wake the writer.
    pub fn signal_empty(&self, turn: ReadTurn<'_>) {
        self.gate.signal_empty(turn);
    }

    /// Cancel the run; unblocks both workers.
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    /// Whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }

    /// Consistent view of phase, counters and cancel flag.
    pub fn snapshot(&self) -> GateSnapshot {
        self.gate.snapshot()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use crate::functions::basic::Constant;
    use crate::pipeline::gate::Phase;
    use std::sync::Arc;
    use std::thread;

    fn job(seq: u64) -> Job {
        Job {
            function: Arc::new(Constant(1.0)),
            left: 0.0,
            right: 1.0,
            step: 0.5,
            seq,
        }
    }

    #[test]
    fn write_then_read_round_trips_the_job() {
        let slot = JobSlot::new(1);

        let wt = slot.wait_empty().unwrap();
        slot.write(&wt, job(1));
        slot.signal_full(wt);

        let rt = slot.wait_full().unwrap();
        let got = slot.read(&rt);
        slot.signal_empty(rt);

        assert_eq!(got.seq, 1);
        assert_eq!(slot.snapshot().phase, Phase::Empty);
    }

    #[test]
    fn cross_thread_handoff_transfers_ownership() {
        let slot = Arc::new(JobSlot::new(3));

        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                for seq in 1..=slot.target() {
                    let wt = slot.wait_empty().unwrap();
                    slot.write(&wt, job(seq));
                    slot.signal_full(wt);
                }
            })
        };

        for expected in 1..=slot.target() {
            let rt = slot.wait_full().unwrap();
            let got = slot.read(&rt);
            slot.signal_empty(rt);
            assert_eq!(got.seq, expected);
        }
        producer.join().unwrap();

        let snap = slot.snapshot();
        assert_eq!(snap.produced, 3);
        assert_eq!(snap.consumed, 3);
    }

    #[test]
    #[should_panic(expected = "different gate")]
    fn write_with_foreign_turn_is_a_fault() {
        let a = JobSlot::new(1);
        let b = JobSlot::new(1);
        let turn = a.wait_empty().unwrap();
        b.write(&turn, job(1));
    }
}
