//! The native object store: owns native payloads behind opaque handles.

use tether_core::{Combine, Handle, StoreError};

use crate::table::HandleTable;

/// Owns natively-held payloads and hands out [`Handle`]s to them.
///
/// The store is the exclusive owner of every payload. Handles are
/// non-owning; once a payload is released its handle is stale and every
/// operation through it fails with [`StoreError::InvalidHandle`].
pub struct NativeObjectStore<T> {
    objects: HandleTable<T>,
    created: u64,
    released: u64,
}

impl<T> NativeObjectStore<T> {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            objects: HandleTable::new(),
            created: 0,
            released: 0,
        }
    }

    /// Allocate a native object holding `value` and return a fresh handle.
    pub fn create(&mut self, value: T) -> Handle {
        self.created += 1;
        let handle = self.objects.insert(value);
        log::trace!("native object {handle} created");
        handle
    }

    /// Borrow the payload behind `handle`.
    pub fn get(&self, handle: Handle) -> Result<&T, StoreError> {
        self.objects
            .get(handle)
            .ok_or(StoreError::InvalidHandle(handle))
    }

    /// Mutably borrow the payload behind `handle`.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, StoreError> {
        self.objects
            .get_mut(handle)
            .ok_or(StoreError::InvalidHandle(handle))
    }

    /// Apply a binary operation to the payloads behind two handles.
    ///
    /// Fails with the first invalid handle, checking `a` before `b`.
    pub fn combine_with<R>(
        &self,
        a: Handle,
        b: Handle,
        op: impl FnOnce(&T, &T) -> R,
    ) -> Result<R, StoreError> {
        let lhs = self.get(a)?;
        let rhs = self.get(b)?;
        Ok(op(lhs, rhs))
    }

    /// Combine the payloads behind two handles with [`Combine`].
    pub fn combine(&self, a: Handle, b: Handle) -> Result<T, StoreError>
    where
        T: Combine,
    {
        self.combine_with(a, b, T::combine)
    }

    /// Destroy the native object behind `handle`, returning its payload.
    pub fn release(&mut self, handle: Handle) -> Result<T, StoreError> {
        let value = self
            .objects
            .remove(handle)
            .ok_or(StoreError::InvalidHandle(handle))?;
        self.released += 1;
        log::trace!("native object {handle} released");
        Ok(value)
    }

    /// Whether `handle` references a live native object.
    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains(handle)
    }

    /// Number of live native objects.
    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    /// Handles of every live native object.
    pub fn handles(&self) -> Vec<Handle> {
        self.objects.handles()
    }

    /// Total native objects ever created.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Total native objects released.
    pub fn released(&self) -> u64 {
        self.released
    }
}

impl<T> Default for NativeObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
