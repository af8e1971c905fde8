//! Wrapper registry: binds managed objects to native handles and finalizers.

use indexmap::IndexMap;
use tether_core::{Handle, ObjectId, RegistryError};

use crate::finalizer::Finalizer;

/// Lifecycle of a wrapper.
///
/// `Live → PendingFinalize → Finalized`, or `Live → Unwrapped` when the
/// wrapper is released explicitly. Both end states are terminal; a wrapper
/// in either is no longer tracked by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapperState {
    /// The managed object is reachable (or not yet collected).
    Live,
    /// The object was collected; its finalizer is queued.
    PendingFinalize,
    /// The finalizer ran and the native object was released.
    Finalized,
    /// The wrapper was removed by `unwrap`; no finalizer will run.
    Unwrapped,
}

/// Binding between a managed object, its native handle and its finalizer.
pub struct Wrapper<T: 'static> {
    handle: Handle,
    finalizer: Option<Finalizer<T>>,
    state: WrapperState,
}

impl<T: 'static> Wrapper<T> {
    /// Handle of the wrapped native object.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WrapperState {
        self.state
    }
}

/// A collected wrapper waiting for the dispatcher.
pub(crate) struct PendingFinalization<T: 'static> {
    pub object: ObjectId,
    pub handle: Handle,
    pub finalizer: Option<Finalizer<T>>,
}

/// Tracks every wrapper that is live or pending finalization.
pub struct WrapperRegistry<T: 'static> {
    wrappers: IndexMap<ObjectId, Wrapper<T>>,
    owners: IndexMap<Handle, ObjectId>,
}

impl<T: 'static> WrapperRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            wrappers: IndexMap::new(),
            owners: IndexMap::new(),
        }
    }

    /// Bind `object` to `handle`, registering `finalizer` for collection.
    pub fn wrap(
        &mut self,
        object: ObjectId,
        handle: Handle,
        finalizer: Option<Finalizer<T>>,
    ) -> Result<(), RegistryError> {
        if self.wrappers.contains_key(&object) {
            return Err(RegistryError::DuplicateWrap(object));
        }
        if self.owners.contains_key(&handle) {
            return Err(RegistryError::HandleWrapped(handle));
        }
        self.owners.insert(handle, object);
        self.wrappers.insert(
            object,
            Wrapper {
                handle,
                finalizer,
                state: WrapperState::Live,
            },
        );
        log::trace!("object {object} wrapped native {handle}");
        Ok(())
    }

    /// Remove a live wrapper without running its finalizer.
    pub fn unwrap(&mut self, object: ObjectId) -> Result<Handle, RegistryError> {
        match self.wrappers.get(&object).map(Wrapper::state) {
            Some(WrapperState::Live) => {}
            _ => return Err(RegistryError::NotWrapped(object)),
        }
        let mut wrapper = self
            .wrappers
            .shift_remove(&object)
            .ok_or(RegistryError::NotWrapped(object))?;
        self.owners.shift_remove(&wrapper.handle);
        wrapper.state = WrapperState::Unwrapped;
        // The finalizer is dropped here, uncalled.
        wrapper.finalizer = None;
        log::trace!("object {object} unwrapped ({:?})", wrapper.state);
        Ok(wrapper.handle)
    }

    /// Handle wrapped by a live `object`.
    pub fn handle_of(&self, object: ObjectId) -> Result<Handle, RegistryError> {
        match self.wrappers.get(&object) {
            Some(w) if w.state == WrapperState::Live => Ok(w.handle),
            _ => Err(RegistryError::NotWrapped(object)),
        }
    }

    /// The object whose wrapper owns `handle`, live or pending.
    pub fn owner_of(&self, handle: Handle) -> Option<ObjectId> {
        self.owners.get(&handle).copied()
    }

    /// State of the wrapper on `object`, if one is tracked.
    pub fn state(&self, object: ObjectId) -> Option<WrapperState> {
        self.wrappers.get(&object).map(Wrapper::state)
    }

    /// Move a live wrapper to `PendingFinalize`, handing its finalizer out.
    ///
    /// Returns `None` if `object` carries no live wrapper, so a wrapper can
    /// be scheduled at most once.
    pub(crate) fn schedule(&mut self, object: ObjectId) -> Option<PendingFinalization<T>> {
        let wrapper = self.wrappers.get_mut(&object)?;
        if wrapper.state != WrapperState::Live {
            return None;
        }
        wrapper.state = WrapperState::PendingFinalize;
        Some(PendingFinalization {
            object,
            handle: wrapper.handle,
            finalizer: wrapper.finalizer.take(),
        })
    }

    /// Retire a pending wrapper as `Finalized`.
    pub(crate) fn complete(&mut self, object: ObjectId) -> Option<Wrapper<T>> {
        let mut wrapper = self.wrappers.shift_remove(&object)?;
        self.owners.shift_remove(&wrapper.handle);
        wrapper.state = WrapperState::Finalized;
        Some(wrapper)
    }

    /// Objects whose wrappers are still live, in wrap order.
    pub fn live_objects(&self) -> Vec<ObjectId> {
        self.wrappers
            .iter()
            .filter(|(_, w)| w.state == WrapperState::Live)
            .map(|(object, _)| *object)
            .collect()
    }

    /// Number of tracked wrappers (live or pending).
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    /// Whether no wrappers are tracked.
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }
}

impl<T: 'static> Default for WrapperRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
