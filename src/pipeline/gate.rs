//! Blocking handoff gate: exclusive, alternating access to a one-job slot.
//!
//! # Design
//!
//! A Mutex + two Condvars (one per waiting side). Simple and correct: the
//! handoff rate is bounded by integration work, so blocking beats spinning
//! and there are no memory-ordering subtleties to get wrong.
//!
//! # State machine
//!
//! ```text
//!          wait_empty()              signal_full()
//!   EMPTY ─────────────▶ WRITING ─────────────────▶ FULL
//!     ▲                 (writer owns slot)           │
//!     │                                              │ wait_full()
//!     │ signal_empty()                               ▼
//!     └───────────────── READING ◀───────────────────┘
//!                       (reader owns slot)
//! ```
//!
//! No other transition is legal. `wait_empty` is the only way into `Writing`
//! and it requires `Empty`, so two writers can never both hold a write
//! reservation; symmetrically for readers. The reservation is witnessed by a
//! turn token ([`WriteTurn`] / [`ReadTurn`]) that the matching signal
//! consumes.
//!
//! # Counters
//!
//! `produced` and `consumed` live inside the gate's mutex state and are
//! bumped by `signal_full` / `signal_empty` respectively, so counter updates
//! are atomic with the phase transition they describe. They are deliberately
//! not free-standing atomics: independent atomicity would not prevent the
//! double-reservation race the state machine exists to exclude, and
//! [`snapshot`](HandoffGate::snapshot) gives observers a consistent view.
//!
//! # Cancellation
//!
//! `cancel()` sets a flag and wakes every waiter on both sides. A blocked
//! wait returns `Err(Cancelled)`; callers treat that as "stop processing".
//! Dropping a turn token without signaling also cancels the gate — that is
//! the panic-unwinding path, and it guarantees the peer thread cannot stay
//! blocked on a handoff that will never happen.

#[cfg(not(loom))]
use std::sync::{Condvar, Mutex, MutexGuard};

#[cfg(loom)]
use loom::sync::{Condvar, Mutex, MutexGuard};

use std::fmt;

/// A blocked wait was interrupted by cancellation.
///
/// Normal, expected termination for a worker — not a data error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("handoff cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Slot occupancy phase, as the gate tracks it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Phase {
    /// No pending job; a writer may reserve.
    Empty,
    /// Reserved by the writer; the job is being placed.
    Writing,
    /// One pending job; a reader may reserve.
    Full,
    /// Reserved by the reader; the job is being taken.
    Reading,
}

/// State under the gate mutex.
#[derive(Debug)]
struct GateState {
    phase: Phase,
    cancelled: bool,
    /// Handoffs committed by `signal_full`.
    produced: u64,
    /// Handoffs retired by `signal_empty`.
    consumed: u64,
}

/// Consistent view of the gate, taken under its mutex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GateSnapshot {
    pub phase: Phase,
    pub cancelled: bool,
    pub produced: u64,
    pub consumed: u64,
}

/// The handoff gate. See the module docs for the full contract.
#[derive(Debug)]
pub struct HandoffGate {
    state: Mutex<GateState>,
    /// Writers block here waiting for `Empty`.
    writer_cv: Condvar,
    /// Readers block here waiting for `Full`.
    reader_cv: Condvar,
}

impl Default for HandoffGate {
    fn default() -> Self {
        Self::new()
    }
}

impl HandoffGate {
    /// Create a gate in the initial state: slot empty, nothing produced.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                phase: Phase::Empty,
                cancelled: false,
                produced: 0,
                consumed: 0,
            }),
            writer_cv: Condvar::new(),
            reader_cv: Condvar::new(),
        }
    }

    /// Lock state with poison recovery.
    ///
    /// Used on Drop/cancel paths that must not panic: if a worker panicked
    /// while holding the lock we still need to flip the cancel flag so the
    /// peer can observe it.
    fn lock_or_recover(&self) -> MutexGuard<'_, GateState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Block until the slot is empty, then reserve it for writing.
    ///
    /// Returns the write reservation, or `Err(Cancelled)` if the gate was
    /// cancelled before or while waiting.
    pub fn wait_empty(&self) -> Result<WriteTurn<'_>, Cancelled> {
        let mut st = self.state.lock().expect("handoff gate mutex poisoned");
        loop {
            if st.cancelled {
                return Err(Cancelled);
            }
            if st.phase == Phase::Empty {
                break;
            }
            st = self
                .writer_cv
                .wait(st)
                .expect("handoff gate condvar poisoned");
        }
        st.phase = Phase::Writing;
        drop(st);
        Ok(WriteTurn {
            gate: self,
            armed: true,
        })
    }

    /// Commit the written job: mark the slot full and wake the reader.
    ///
    /// Consumes the write reservation and increments `produced`.
    ///
    /// # Panics
    ///
    /// Panics if `turn` was issued by a different gate, or if the phase is
    /// not `Writing` — both are primitive faults, never expected at runtime.
    pub fn signal_full(&self, turn: WriteTurn<'_>) {
        assert!(
            turn.issued_by(self),
            "signal_full with a turn from a different gate"
        );
        let mut turn = turn;
        turn.armed = false;

        let mut st = self.state.lock().expect("handoff gate mutex poisoned");
        assert_eq!(
            st.phase,
            Phase::Writing,
            "signal_full without a live write reservation"
        );
        st.phase = Phase::Full;
        st.produced += 1;
        drop(st);
        self.reader_cv.notify_one();
    }

    /// Block until the slot is full, then reserve it for reading.
    ///
    /// Returns the read reservation, or `Err(Cancelled)` if the gate was
    /// cancelled before or while waiting.
    pub fn wait_full(&self) -> Result<ReadTurn<'_>, Cancelled> {
        let mut st = self.state.lock().expect("handoff gate mutex poisoned");
        loop {
            if st.cancelled {
                return Err(Cancelled);
            }
            if st.phase == Phase::Full {
                break;
            }
            st = self
                .reader_cv
                .wait(st)
                .expect("handoff gate condvar poisoned");
        }
        st.phase = Phase::Reading;
        drop(st);
        Ok(ReadTurn {
            gate: self,
            armed: true,
        })
    }

    /// Retire the read job: mark the slot empty and wake the writer.
    ///
    /// Consumes the read reservation and increments `consumed`.
    ///
    /// # Panics
    ///
    /// Panics if `turn` was issued by a different gate, or if the phase is
    /// not `Reading`.
    pub fn signal_empty(&self, turn: ReadTurn<'_>) {
        assert!(
            turn.issued_by(self),
            "signal_empty with a turn from a different gate"
        );
        let mut turn = turn;
        turn.armed = false;

        let mut st = self.state.lock().expect("handoff gate mutex poisoned");
        assert_eq!(
            st.phase,
            Phase::Reading,
            "signal_empty without a live read reservation"
        );
        st.phase = Phase::Empty;
        st.consumed += 1;
        drop(st);
        self.writer_cv.notify_one();
    }

    /// Cancel the gate: wake every blocked waiter on both sides.
    ///
    /// Idempotent. Waits that race with cancellation either complete their
    /// current handoff step or return `Err(Cancelled)`; they never re-block.
    pub fn cancel(&self) {
        let mut st = self.lock_or_recover();
        st.cancelled = true;
        drop(st);
        self.writer_cv.notify_all();
        self.reader_cv.notify_all();
    }

    /// Whether `cancel()` has been called (or a turn was abandoned).
    pub fn is_cancelled(&self) -> bool {
        self.lock_or_recover().cancelled
    }

    /// Consistent snapshot of phase, counters and cancel flag.
    pub fn snapshot(&self) -> GateSnapshot {
        let st = self.lock_or_recover();
        GateSnapshot {
            phase: st.phase,
            cancelled: st.cancelled,
            produced: st.produced,
            consumed: st.consumed,
        }
    }

    /// Abandon path for turn tokens dropped without signaling.
    fn abandon(&self) {
        let mut st = self.lock_or_recover();
        st.cancelled = true;
        drop(st);
        self.writer_cv.notify_all();
        self.reader_cv.notify_all();
    }
}

/// Witness of an exclusive write reservation (phase `Writing`).
///
/// While this token is alive the holder is the only party allowed to touch
/// the slot. Pass it to [`HandoffGate::signal_full`] to commit; dropping it
/// without signaling cancels the gate (the unwinding path).
#[derive(Debug)]
#[must_use = "a write reservation must be committed with signal_full"]
pub struct WriteTurn<'a> {
    gate: &'a HandoffGate,
    armed: bool,
}

impl WriteTurn<'_> {
    /// Whether this turn was issued by `gate` (identity check).
    #[inline]
    pub fn issued_by(&self, gate: &HandoffGate) -> bool {
        std::ptr::eq(self.gate, gate)
    }
}

impl Drop for WriteTurn<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.gate.abandon();
        }
    }
}

/// Witness of an exclusive read reservation (phase `Reading`).
///
/// Counterpart of [`WriteTurn`]; pass to [`HandoffGate::signal_empty`] to
/// retire the handoff.
#[derive(Debug)]
#[must_use = "a read reservation must be retired with signal_empty"]
pub struct ReadTurn<'a> {
    gate: &'a HandoffGate,
    armed: bool,
}

impl ReadTurn<'_> {
    /// Whether this turn was issued by `gate` (identity check).
    #[inline]
    pub fn issued_by(&self, gate: &HandoffGate) -> bool {
        std::ptr::eq(self.gate, gate)
    }
}

impl Drop for ReadTurn<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.gate.abandon();
        }
    }
}
