//! Monotonic timestamp generation.
//!
//! A clock answers "what time is it"; a generator answers "give me a
//! timestamp strictly greater than the last one". When the clock stalls or
//! steps backwards the generator keeps counting `last + 1`, trading
//! accuracy for order, and resynchronizes with the clock as soon as it
//! moves ahead again.

use std::cell::Cell;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::clock::Clock;

/// Produces microsecond write timestamps.
pub trait TimestampGenerator: Send + Sync + 'static {
    /// Next timestamp, strictly greater than every timestamp previously
    /// returned by this instance.
    fn next(&self) -> i64;
}

/// One monotonic step: the clock reading when it moved forward, `last + 1`
/// when it did not.
fn compute_next(clock: &dyn Clock, last: i64) -> i64 {
    let current = clock.now_micros();
    if last >= current {
        last + 1
    } else {
        current
    }
}

/// Shared generator: strictly increasing across all threads using it.
///
/// Under contention on a stalled clock, timestamps drift ahead of real
/// time one microsecond per call; the drift heals once the clock catches
/// up.
pub struct AtomicTimestampGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl AtomicTimestampGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(0),
        }
    }
}

impl TimestampGenerator for AtomicTimestampGenerator {
    fn next(&self) -> i64 {
        loop {
            let last = self.last.load(Ordering::SeqCst);
            let next = compute_next(self.clock.as_ref(), last);
            if self
                .last
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }
}

/// Hands out independent monotonic counters, one per logical execution
/// context.
///
/// Each [`TimestampContext`] is monotonic on its own; two contexts may
/// produce the same timestamp for concurrent writes. No CAS on the hot
/// path, for workloads where per-worker ordering is enough and each worker
/// owns its context.
pub struct ContextTimestampGenerator {
    clock: Arc<dyn Clock>,
}

impl ContextTimestampGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// A fresh context with its own ordering history.
    pub fn context(&self) -> TimestampContext {
        TimestampContext {
            clock: Arc::clone(&self.clock),
            last: Cell::new(0),
        }
    }
}

/// Per-context timestamp counter.
///
/// `Send` but not `Sync`: a context can move with the task that owns it,
/// and the isolation boundary is the handle itself rather than thread
/// identity.
pub struct TimestampContext {
    clock: Arc<dyn Clock>,
    last: Cell<i64>,
}

impl TimestampContext {
    /// Next timestamp, strictly greater than this context's previous one.
    pub fn next(&self) -> i64 {
        let next = compute_next(self.clock.as_ref(), self.last.get());
        self.last.set(next);
        next
    }
}
