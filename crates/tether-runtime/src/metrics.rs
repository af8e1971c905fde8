//! Collection reports and cumulative environment metrics.

use tether_core::CycleId;

/// Outcome of a single [`Env::collect`](crate::Env::collect) call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// The cycle that ran.
    pub cycle: CycleId,
    /// Managed objects found unreachable and removed.
    pub swept: usize,
    /// Wrappers moved to `PendingFinalize` by this cycle.
    pub queued: usize,
    /// Finalizers that completed during this call (always 0 in deferred
    /// mode or when the collection ran inside a finalizer).
    pub finalized: usize,
}

/// Outcome of tearing an environment down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Finalizers already queued when teardown began that then ran.
    pub drained: usize,
    /// Still-live wrappers finalized by teardown.
    pub finalized_live: usize,
    /// Whether an instance-data finalizer ran.
    pub instance_finalized: bool,
    /// Native objects left in the store afterwards (unwrapped or never
    /// wrapped, and never released by their owner).
    pub native_remaining: usize,
}

/// Cumulative counters and current sizes for an environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvMetrics {
    /// Collection cycles run.
    pub collections: u64,
    /// Managed objects swept across all cycles.
    pub objects_swept: u64,
    /// Wrappers queued for finalization across all cycles.
    pub finalizers_queued: u64,
    /// Finalizers that returned successfully (the finalize count).
    pub finalizers_run: u64,
    /// Wrappers released by `unwrap`.
    pub unwrapped: u64,
    /// Native objects created.
    pub native_created: u64,
    /// Native objects released.
    pub native_released: u64,
    /// Live managed objects.
    pub live_objects: usize,
    /// Live native objects.
    pub live_native: usize,
    /// Wrappers tracked (live or pending).
    pub tracked_wrappers: usize,
    /// References created and not yet deleted.
    pub references: usize,
    /// Finalizers waiting in the dispatcher queue.
    pub pending_finalizers: usize,
}
