//! Finalization dispatcher: queues collected wrappers and runs their
//! finalizers.
//!
//! A collection cycle moves every unreachable wrapper to
//! `PendingFinalize` and pushes it here. [`drain`] then pops entries in
//! FIFO order and, for each one:
//!
//! 1. invokes the finalizer (if any) with the native object still live,
//! 2. escalates a failure to [`fatal::finalizer_failed`](crate::fatal::finalizer_failed),
//! 3. counts the success, retires the wrapper as `Finalized` and releases
//!    the native object.
//!
//! A finalizer may itself trigger collections that queue more work, so the
//! drain keeps going until the queue is empty. A drain started from inside
//! a finalizer is refused; the outer drain picks the new entries up.

use std::collections::VecDeque;

use tether_core::CycleId;

use crate::env::Env;
use crate::fatal::{self, FinalizerFailure};
use crate::registry::PendingFinalization;

struct Queued<T: 'static> {
    pending: PendingFinalization<T>,
    cycle: CycleId,
}

/// Per-env queue of wrappers awaiting finalization.
pub struct FinalizationDispatcher<T: 'static> {
    queue: VecDeque<Queued<T>>,
    draining: bool,
    finalize_count: u64,
    queued_total: u64,
}

impl<T: 'static> FinalizationDispatcher<T> {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(8),
            draining: false,
            finalize_count: 0,
            queued_total: 0,
        }
    }

    pub(crate) fn enqueue(&mut self, pending: PendingFinalization<T>, cycle: CycleId) {
        log::trace!(
            "object {} queued for finalization in cycle {cycle}",
            pending.object
        );
        self.queue.push_back(Queued { pending, cycle });
        self.queued_total += 1;
    }

    /// Number of finalizers waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether a drain is in progress.
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Finalizers that have returned successfully.
    pub fn finalize_count(&self) -> u64 {
        self.finalize_count
    }

    /// Wrappers ever queued.
    pub fn queued_total(&self) -> u64 {
        self.queued_total
    }
}

impl<T: 'static> Default for FinalizationDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for FinalizationDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinalizationDispatcher")
            .field("pending", &self.pending())
            .field("draining", &self.draining)
            .field("finalize_count", &self.finalize_count)
            .finish()
    }
}

/// Run every queued finalizer. Returns how many completed successfully.
///
/// Returns 0 without doing anything when called re-entrantly.
pub(crate) fn drain<T: 'static>(env: &mut Env<T>) -> usize {
    if env.dispatcher.draining {
        return 0;
    }
    env.dispatcher.draining = true;

    let mut finalized = 0;
    while let Some(Queued { pending, cycle }) = env.dispatcher.queue.pop_front() {
        let PendingFinalization {
            object,
            handle,
            finalizer,
        } = pending;

        if let Some(finalizer) = finalizer {
            if let Err(error) = finalizer.invoke(env, object, handle) {
                fatal::finalizer_failed(FinalizerFailure {
                    object,
                    handle,
                    cycle,
                    error,
                });
            }
            env.dispatcher.finalize_count += 1;
            finalized += 1;
        }

        env.registry.complete(object);
        match env.store.release(handle) {
            Ok(_) => log::trace!("object {object} finalized, native {handle} released"),
            Err(e) => log::warn!("object {object} finalized without a native object: {e}"),
        }
    }

    env.dispatcher.draining = false;
    finalized
}
