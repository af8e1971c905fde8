//! The environment: one managed heap, its native store, wrappers and
//! finalization queue.
//!
//! Every operation a host or addon performs goes through an [`Env`].
//! State is never shared between environments, so finalize counts and
//! pending queues are per env.

use tether_core::{
    Combine, CycleId, EnvError, Handle, HeapError, ObjectId, ReferenceId, RegistryError, RootId,
    StoreError,
};
use tether_store::NativeObjectStore;

use crate::config::{ConfigError, DispatchMode, EnvConfig};
use crate::dispatch::{self, FinalizationDispatcher};
use crate::finalizer::Finalizer;
use crate::heap::ManagedHeap;
use crate::metrics::{CollectReport, EnvMetrics, TeardownReport};
use crate::reference::ReferenceTable;
use crate::registry::{WrapperRegistry, WrapperState};

/// A managed environment holding native objects of type `T`.
///
/// Dropping an env tears it down (see [`Env::teardown`]) unless the
/// thread is already unwinding.
pub struct Env<T: 'static> {
    config: EnvConfig,
    pub(crate) heap: ManagedHeap,
    pub(crate) store: NativeObjectStore<T>,
    pub(crate) registry: WrapperRegistry<T>,
    pub(crate) dispatcher: FinalizationDispatcher<T>,
    references: ReferenceTable,
    instance: Option<(ObjectId, RootId)>,
    cycle: CycleId,
    objects_swept: u64,
    unwrapped: u64,
    tearing_down: bool,
    torn_down: bool,
}

impl<T: 'static> Env<T> {
    /// Create an environment after validating `config`.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!("env created ({:?} dispatch)", config.dispatch);
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: EnvConfig) -> Self {
        Self {
            config,
            heap: ManagedHeap::new(),
            store: NativeObjectStore::new(),
            registry: WrapperRegistry::new(),
            dispatcher: FinalizationDispatcher::new(),
            references: ReferenceTable::new(),
            instance: None,
            cycle: CycleId::default(),
            objects_swept: 0,
            unwrapped: 0,
            tearing_down: false,
            torn_down: false,
        }
    }

    /// The configuration this env was created with.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    // ── Scopes and roots ────────────────────────────────────────

    /// Open a handle scope. Returns the new depth.
    pub fn open_scope(&mut self) -> usize {
        self.heap.open_scope()
    }

    /// Close the innermost handle scope. Returns how many locals it rooted.
    pub fn close_scope(&mut self) -> Result<usize, EnvError> {
        Ok(self.heap.close_scope()?)
    }

    /// Run `f` inside a fresh handle scope.
    ///
    /// Every scope opened by `f` and left open is closed along with it.
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.heap.scope_depth();
        self.heap.open_scope();
        let result = f(self);
        self.heap.close_scopes_to(depth);
        result
    }

    /// Move `object` from the innermost scope to its parent.
    pub fn escape(&mut self, object: ObjectId) -> Result<(), EnvError> {
        Ok(self.heap.escape(object)?)
    }

    /// Allocate a managed object in the innermost scope.
    ///
    /// With `auto_collect_after` configured, a collection runs first once
    /// that many objects were allocated since the last one.
    pub fn alloc_object(&mut self) -> Result<ObjectId, EnvError> {
        if self.tearing_down {
            return Err(EnvError::TearingDown);
        }
        if self.heap.scope_depth() == 0 {
            return Err(HeapError::NoOpenScope.into());
        }
        if let Some(threshold) = self.config.auto_collect_after {
            if self.heap.allocated_since_collect() >= threshold && !self.dispatcher.is_draining() {
                self.collect();
            }
        }
        Ok(self.heap.alloc()?)
    }

    /// Whether `object` has not been collected.
    pub fn is_live(&self, object: ObjectId) -> bool {
        self.heap.is_live(object)
    }

    /// Keep `object` reachable until the returned root is released.
    pub fn persist(&mut self, object: ObjectId) -> Result<RootId, EnvError> {
        Ok(self.heap.persist(object)?)
    }

    /// Release a persistent root. Returns the object it held.
    pub fn release_root(&mut self, root: RootId) -> Result<ObjectId, EnvError> {
        Ok(self.heap.release_root(root)?)
    }

    /// Make `to` reachable from `from`.
    pub fn link(&mut self, from: ObjectId, to: ObjectId) -> Result<(), EnvError> {
        Ok(self.heap.link(from, to)?)
    }

    /// Remove one `from → to` edge. Returns whether an edge was removed.
    pub fn unlink(&mut self, from: ObjectId, to: ObjectId) -> Result<bool, EnvError> {
        Ok(self.heap.unlink(from, to)?)
    }

    // ── References ──────────────────────────────────────────────

    /// Create a counted reference to `object`.
    ///
    /// With `initial > 0` the reference keeps the object alive. A weak
    /// reference (`initial == 0`) only observes it.
    pub fn create_reference(
        &mut self,
        object: ObjectId,
        initial: u32,
    ) -> Result<ReferenceId, EnvError> {
        self.references.create(&mut self.heap, object, initial)
    }

    /// Increment a reference's count, making it strong. Returns the new
    /// count.
    pub fn reference_ref(&mut self, reference: ReferenceId) -> Result<u32, EnvError> {
        self.references.add_ref(&mut self.heap, reference)
    }

    /// Decrement a reference's count. At zero it turns weak. Returns the
    /// new count.
    pub fn reference_unref(&mut self, reference: ReferenceId) -> Result<u32, EnvError> {
        self.references.release_ref(&mut self.heap, reference)
    }

    /// The object a reference names, or `None` once it was collected.
    pub fn reference_value(&self, reference: ReferenceId) -> Result<Option<ObjectId>, EnvError> {
        self.references.value(&self.heap, reference)
    }

    /// Current count of a reference.
    pub fn reference_count(&self, reference: ReferenceId) -> Result<u32, EnvError> {
        self.references.count(reference)
    }

    /// Delete a reference. A strong reference stops keeping its object
    /// alive.
    pub fn delete_reference(&mut self, reference: ReferenceId) -> Result<(), EnvError> {
        self.references.delete(&mut self.heap, reference)
    }

    // ── Native objects ──────────────────────────────────────────

    /// Store `value` as a native object not yet bound to any wrapper.
    pub fn create_native(&mut self, value: T) -> Handle {
        self.store.create(value)
    }

    /// Release a native object that no wrapper owns.
    pub fn release_native(&mut self, handle: Handle) -> Result<T, EnvError> {
        if self.registry.owner_of(handle).is_some() {
            return Err(RegistryError::HandleWrapped(handle).into());
        }
        Ok(self.store.release(handle)?)
    }

    /// Borrow a live native object.
    pub fn get(&self, handle: Handle) -> Result<&T, EnvError> {
        Ok(self.store.get(handle)?)
    }

    /// Mutably borrow a live native object.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, EnvError> {
        Ok(self.store.get_mut(handle)?)
    }

    /// Combine two live native objects into a new value.
    pub fn combine(&self, a: Handle, b: Handle) -> Result<T, EnvError>
    where
        T: Combine,
    {
        Ok(self.store.combine(a, b)?)
    }

    // ── Wrapping ────────────────────────────────────────────────

    /// Create a native object holding `value` and bind it to `object`.
    ///
    /// On failure the native object is released again and `finalizer` is
    /// dropped uncalled.
    pub fn wrap(
        &mut self,
        object: ObjectId,
        value: T,
        finalizer: Option<Finalizer<T>>,
    ) -> Result<Handle, EnvError> {
        self.check_live(object)?;
        let handle = self.store.create(value);
        if let Err(e) = self.registry.wrap(object, handle, finalizer) {
            let _ = self.store.release(handle);
            return Err(e.into());
        }
        Ok(handle)
    }

    /// Bind an existing native object to `object`.
    pub fn wrap_handle(
        &mut self,
        object: ObjectId,
        handle: Handle,
        finalizer: Option<Finalizer<T>>,
    ) -> Result<(), EnvError> {
        self.check_live(object)?;
        if !self.store.contains(handle) {
            return Err(StoreError::InvalidHandle(handle).into());
        }
        Ok(self.registry.wrap(object, handle, finalizer)?)
    }

    /// Remove the wrapper on a live `object` without finalizing it.
    ///
    /// The native object stays in the store and becomes the caller's to
    /// release.
    pub fn unwrap(&mut self, object: ObjectId) -> Result<Handle, EnvError> {
        self.check_live(object)?;
        let handle = self.registry.unwrap(object)?;
        self.unwrapped += 1;
        Ok(handle)
    }

    /// Unwrap `object` and take its native value out of the store.
    pub fn unwrap_value(&mut self, object: ObjectId) -> Result<T, EnvError> {
        let handle = self.unwrap(object)?;
        Ok(self.store.release(handle)?)
    }

    /// Handle wrapped by a live `object`.
    pub fn handle_of(&self, object: ObjectId) -> Result<Handle, EnvError> {
        Ok(self.registry.handle_of(object)?)
    }

    /// The object whose wrapper owns `handle`, until it is finalized or
    /// unwrapped.
    pub fn owner_of(&self, handle: Handle) -> Option<ObjectId> {
        self.registry.owner_of(handle)
    }

    /// Native value wrapped by a live `object`.
    pub fn value_of(&self, object: ObjectId) -> Result<&T, EnvError> {
        let handle = self.handle_of(object)?;
        self.get(handle)
    }

    /// Allocate a managed object wrapping `value` in the current scope.
    pub fn create_external(
        &mut self,
        value: T,
        finalizer: Option<Finalizer<T>>,
    ) -> Result<ObjectId, EnvError> {
        let object = self.alloc_object()?;
        self.wrap(object, value, finalizer)?;
        Ok(object)
    }

    /// Lifecycle state of the wrapper on `object`, if one is tracked.
    ///
    /// `None` once the wrapper was finalized or unwrapped.
    pub fn wrapper_state(&self, object: ObjectId) -> Option<WrapperState> {
        self.registry.state(object)
    }

    // ── Instance data ───────────────────────────────────────────

    /// Attach per-env data, finalized when the env is torn down.
    ///
    /// The data lives in a wrapper held by an env-owned root. Replacing
    /// it releases that root, so the previous data is finalized by a
    /// later collection like any other unreachable wrapper.
    pub fn set_instance_data(
        &mut self,
        value: T,
        finalizer: Option<Finalizer<T>>,
    ) -> Result<(), EnvError> {
        let (object, root) = self.with_scope(|env| -> Result<_, EnvError> {
            let object = env.alloc_object()?;
            env.wrap(object, value, finalizer)?;
            let root = env.persist(object)?;
            Ok((object, root))
        })?;
        if let Some((_, previous)) = self.instance.replace((object, root)) {
            self.heap.release_root(previous)?;
        }
        Ok(())
    }

    /// The data set by [`set_instance_data`](Self::set_instance_data).
    pub fn instance_data(&self) -> Option<&T> {
        let (object, _) = self.instance?;
        self.value_of(object).ok()
    }

    // ── Collection and finalization ─────────────────────────────

    /// Run one collection cycle.
    ///
    /// Unreachable objects are swept and their wrappers queued in sweep
    /// order. In [`DispatchMode::Inline`] the queue is drained before
    /// returning, unless this call is itself running inside a finalizer.
    pub fn collect(&mut self) -> CollectReport {
        self.cycle = self.cycle.next();
        let cycle = self.cycle;
        let swept = self.heap.sweep_unreachable();
        let mut queued = 0;
        for &object in &swept {
            if let Some(pending) = self.registry.schedule(object) {
                self.dispatcher.enqueue(pending, cycle);
                queued += 1;
            }
        }
        self.objects_swept += swept.len() as u64;

        let finalized = match self.config.dispatch {
            DispatchMode::Inline => self.drain_finalizers(),
            DispatchMode::Deferred => 0,
        };
        log::debug!(
            "cycle {cycle}: swept {}, queued {queued}, finalized {finalized}",
            swept.len()
        );
        CollectReport {
            cycle,
            swept: swept.len(),
            queued,
            finalized,
        }
    }

    /// Run every queued finalizer. Returns how many completed.
    ///
    /// Does nothing when called from inside a finalizer.
    pub fn drain_finalizers(&mut self) -> usize {
        dispatch::drain(self)
    }

    /// Finalizers of this env that have returned successfully.
    pub fn finalize_count(&self) -> u64 {
        self.dispatcher.finalize_count()
    }

    /// Finalizers waiting to run.
    pub fn pending_finalizers(&self) -> usize {
        self.dispatcher.pending()
    }

    /// The most recent collection cycle.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Whether teardown has begun.
    pub fn is_tearing_down(&self) -> bool {
        self.tearing_down
    }

    /// Snapshot of this env's counters.
    pub fn metrics(&self) -> EnvMetrics {
        EnvMetrics {
            collections: self.cycle.0,
            objects_swept: self.objects_swept,
            finalizers_queued: self.dispatcher.queued_total(),
            finalizers_run: self.dispatcher.finalize_count(),
            unwrapped: self.unwrapped,
            native_created: self.store.created(),
            native_released: self.store.released(),
            live_objects: self.heap.live_count(),
            live_native: self.store.live_count(),
            tracked_wrappers: self.registry.len(),
            references: self.references.len(),
            pending_finalizers: self.dispatcher.pending(),
        }
    }

    // ── Teardown ────────────────────────────────────────────────

    /// Tear the env down.
    ///
    /// Order: queued finalizers drain first; then, with
    /// `finalize_on_teardown`, every still-live wrapper is finalized in wrap
    /// order; the instance-data finalizer runs last. No objects can be
    /// allocated once teardown has begun.
    pub fn teardown(mut self) -> TeardownReport {
        self.finalize_all()
    }

    fn finalize_all(&mut self) -> TeardownReport {
        if self.torn_down {
            return TeardownReport::default();
        }
        self.tearing_down = true;
        let mut report = TeardownReport {
            drained: self.drain_finalizers(),
            ..TeardownReport::default()
        };

        let instance = self.instance.take().map(|(object, _)| object);
        if self.config.finalize_on_teardown {
            // Finalizers may wrap further live objects, so repeat until
            // nothing but the instance data is left.
            loop {
                let live: Vec<ObjectId> = self
                    .registry
                    .live_objects()
                    .into_iter()
                    .filter(|&object| Some(object) != instance)
                    .collect();
                if live.is_empty() {
                    break;
                }
                for object in live {
                    if let Some(pending) = self.registry.schedule(object) {
                        self.dispatcher.enqueue(pending, self.cycle);
                    }
                }
                report.finalized_live += self.drain_finalizers();
            }
        }

        if let Some(object) = instance {
            if let Some(pending) = self.registry.schedule(object) {
                self.dispatcher.enqueue(pending, self.cycle);
                report.instance_finalized = self.drain_finalizers() > 0;
            }
        }

        self.heap.close_scopes_to(0);
        self.heap.release_all_roots();
        self.references.clear();
        self.torn_down = true;
        report.native_remaining = self.store.live_count();
        log::debug!(
            "env torn down: drained {}, finalized {} live, {} native remaining",
            report.drained,
            report.finalized_live,
            report.native_remaining
        );
        report
    }

    fn check_live(&self, object: ObjectId) -> Result<(), EnvError> {
        if self.heap.is_live(object) {
            Ok(())
        } else {
            Err(HeapError::DeadObject(object).into())
        }
    }
}

impl<T: 'static> Default for Env<T> {
    fn default() -> Self {
        Self::with_validated(EnvConfig::default())
    }
}

impl<T: 'static> Drop for Env<T> {
    fn drop(&mut self) {
        // Never run user callbacks while unwinding.
        if self.torn_down || std::thread::panicking() {
            return;
        }
        self.finalize_all();
    }
}

impl<T: 'static> std::fmt::Debug for Env<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("config", &self.config)
            .field("cycle", &self.cycle)
            .field("live_objects", &self.heap.live_count())
            .field("live_native", &self.store.live_count())
            .field("dispatcher", &self.dispatcher)
            .field("tearing_down", &self.tearing_down)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalizer::Finalization;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tether_core::FinalizerError;

    fn counting(counter: &Arc<AtomicUsize>) -> Finalizer<f64> {
        let counter = counter.clone();
        Finalizer::new(move |_: &mut Env<f64>, _: Finalization<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn alloc_requires_scope() {
        let mut env: Env<f64> = Env::default();
        assert_eq!(
            env.alloc_object(),
            Err(EnvError::Heap(HeapError::NoOpenScope))
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EnvConfig {
            auto_collect_after: Some(0),
            ..EnvConfig::default()
        };
        assert!(matches!(
            Env::<f64>::new(config),
            Err(ConfigError::ZeroAutoCollect)
        ));
    }

    #[test]
    fn duplicate_wrap_rolls_back_native_object() {
        let mut env: Env<f64> = Env::default();
        env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            env.wrap(obj, 1.0, None).unwrap();
            assert_eq!(
                env.wrap(obj, 2.0, None),
                Err(EnvError::Registry(RegistryError::DuplicateWrap(obj)))
            );
            assert_eq!(env.store.live_count(), 1);
            assert_eq!(env.value_of(obj), Ok(&1.0));
        });
    }

    #[test]
    fn wrapped_native_cannot_be_released_directly() {
        let mut env: Env<f64> = Env::default();
        env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            let handle = env.wrap(obj, 1.0, None).unwrap();
            assert_eq!(
                env.release_native(handle),
                Err(EnvError::Registry(RegistryError::HandleWrapped(handle)))
            );
            assert_eq!(env.unwrap_value(obj), Ok(1.0));
            assert_eq!(
                env.get(handle),
                Err(EnvError::Store(StoreError::InvalidHandle(handle)))
            );
        });
    }

    #[test]
    fn wrap_handle_binds_existing_native() {
        let mut env: Env<f64> = Env::default();
        let handle = env.create_native(4.5);
        let counter = Arc::new(AtomicUsize::new(0));
        env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            env.wrap_handle(obj, handle, Some(counting(&counter)))
                .unwrap();
            assert_eq!(env.handle_of(obj), Ok(handle));
        });
        env.collect();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!env.store.contains(handle));
    }

    #[test]
    fn wrapping_a_dead_object_fails() {
        let mut env: Env<f64> = Env::default();
        let obj = env.with_scope(|env| env.alloc_object().unwrap());
        env.collect();
        assert_eq!(
            env.wrap(obj, 1.0, None),
            Err(EnvError::Heap(HeapError::DeadObject(obj)))
        );
        assert_eq!(env.store.live_count(), 0);
    }

    #[test]
    fn unwrap_cancels_finalizer() {
        let mut env: Env<f64> = Env::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            env.wrap(obj, 3.0, Some(counting(&counter))).unwrap();
            env.unwrap(obj).unwrap()
        });
        env.collect();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(env.finalize_count(), 0);
        assert_eq!(env.get(handle), Ok(&3.0));
        assert_eq!(env.metrics().unwrapped, 1);
    }

    #[test]
    fn reachable_through_edges_survives() {
        let mut env: Env<f64> = Env::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let (root, child) = env.with_scope(|env| {
            let parent = env.alloc_object().unwrap();
            let child = env.alloc_object().unwrap();
            env.wrap(child, 1.0, Some(counting(&counter))).unwrap();
            env.link(parent, child).unwrap();
            (env.persist(parent).unwrap(), child)
        });
        env.collect();
        assert!(env.is_live(child));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        env.release_root(root).unwrap();
        env.collect();
        assert!(!env.is_live(child));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_collect_runs_on_allocation() {
        let config = EnvConfig {
            auto_collect_after: Some(4),
            ..EnvConfig::default()
        };
        let mut env: Env<f64> = Env::new(config).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            env.with_scope(|env| {
                let obj = env.alloc_object().unwrap();
                env.wrap(obj, 0.0, Some(counting(&counter))).unwrap();
            });
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        env.with_scope(|env| env.alloc_object().unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(env.cycle(), CycleId(1));
    }

    #[test]
    fn instance_data_is_finalized_last_on_teardown() {
        let mut env: Env<f64> = Env::default();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = |label: &'static str| {
            let order = order.clone();
            Finalizer::new(move |_: &mut Env<f64>, _: Finalization<'_>| {
                order.lock().unwrap().push(label);
                Ok(())
            })
        };
        env.set_instance_data(9.0, Some(record("instance"))).unwrap();
        env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            env.wrap(obj, 1.0, Some(record("live"))).unwrap();
            env.persist(obj).unwrap();
        });
        assert_eq!(env.instance_data(), Some(&9.0));

        let report = env.teardown();
        assert_eq!(report.finalized_live, 1);
        assert!(report.instance_finalized);
        assert_eq!(report.native_remaining, 0);
        assert_eq!(*order.lock().unwrap(), vec!["live", "instance"]);
    }

    #[test]
    fn replaced_instance_data_is_finalized_by_collection() {
        let mut env: Env<f64> = Env::default();
        let counter = Arc::new(AtomicUsize::new(0));
        env.set_instance_data(1.0, Some(counting(&counter))).unwrap();
        env.set_instance_data(2.0, None).unwrap();
        assert_eq!(env.instance_data(), Some(&2.0));
        env.collect();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(env.instance_data(), Some(&2.0));
    }

    #[test]
    fn allocation_fails_while_tearing_down() {
        let mut env: Env<f64> = Env::default();
        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = seen.clone();
        env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            env.persist(obj).unwrap();
            env.wrap(
                obj,
                0.0,
                Some(Finalizer::new(move |env: &mut Env<f64>, _: Finalization<'_>| {
                    env.open_scope();
                    *sink.lock().unwrap() = Some(env.alloc_object());
                    env.close_scope()
                        .map_err(|e| FinalizerError::new(e.to_string()))?;
                    Ok(())
                })),
            )
            .unwrap();
        });
        drop(env);
        assert_eq!(*seen.lock().unwrap(), Some(Err(EnvError::TearingDown)));
    }

    #[test]
    fn teardown_without_finalize_on_teardown_leaves_live_wrappers() {
        let config = EnvConfig {
            finalize_on_teardown: false,
            ..EnvConfig::default()
        };
        let mut env: Env<f64> = Env::new(config).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        env.with_scope(|env| {
            let obj = env.alloc_object().unwrap();
            env.wrap(obj, 0.0, Some(counting(&counter))).unwrap();
            env.persist(obj).unwrap();
        });
        let report = env.teardown();
        assert_eq!(report.finalized_live, 0);
        assert_eq!(report.native_remaining, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn metrics_track_lifecycle() {
        let mut env: Env<f64> = Env::default();
        env.with_scope(|env| {
            for i in 0..3 {
                let obj = env.alloc_object().unwrap();
                env.wrap(obj, f64::from(i), None).unwrap();
            }
        });
        let report = env.collect();
        assert_eq!(report.swept, 3);
        let m = env.metrics();
        assert_eq!(m.collections, 1);
        assert_eq!(m.objects_swept, 3);
        assert_eq!(m.finalizers_queued, 3);
        assert_eq!(m.native_created, 3);
        assert_eq!(m.native_released, 3);
        assert_eq!(m.live_native, 0);
        assert_eq!(m.tracked_wrappers, 0);
    }
}
