//! Counted references to managed objects.
//!
//! A reference whose count is above zero holds a persistent root, so its
//! object stays reachable. At zero the reference is weak: it still names
//! the object but no longer keeps it alive, and stops resolving once a
//! collection has swept it. Raising the count again re-roots the object,
//! provided it has not been collected yet.

use indexmap::IndexMap;
use tether_core::{EnvError, HeapError, ObjectId, ReferenceError, ReferenceId, RootId};

use crate::heap::ManagedHeap;

struct Reference {
    object: ObjectId,
    count: u32,
    /// Present exactly while `count > 0`.
    root: Option<RootId>,
}

/// Every reference an environment has handed out and not yet deleted.
pub struct ReferenceTable {
    refs: IndexMap<ReferenceId, Reference>,
    next: u64,
}

impl ReferenceTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            refs: IndexMap::new(),
            next: 1,
        }
    }

    /// Create a reference to `object` with `initial` strong counts.
    pub fn create(
        &mut self,
        heap: &mut ManagedHeap,
        object: ObjectId,
        initial: u32,
    ) -> Result<ReferenceId, EnvError> {
        if !heap.is_live(object) {
            return Err(HeapError::DeadObject(object).into());
        }
        let root = if initial > 0 {
            Some(heap.persist(object)?)
        } else {
            None
        };
        let id = ReferenceId(self.next);
        self.next += 1;
        self.refs.insert(
            id,
            Reference {
                object,
                count: initial,
                root,
            },
        );
        log::trace!("reference {id} to object {object} created (count {initial})");
        Ok(id)
    }

    /// Increment the count. Returns the new count.
    ///
    /// Going from weak to strong fails with `DeadObject` if the object was
    /// already collected.
    pub fn add_ref(&mut self, heap: &mut ManagedHeap, id: ReferenceId) -> Result<u32, EnvError> {
        let reference = self.refs.get_mut(&id).ok_or(ReferenceError::Unknown(id))?;
        if reference.count == 0 {
            reference.root = Some(heap.persist(reference.object)?);
        }
        reference.count += 1;
        Ok(reference.count)
    }

    /// Decrement the count. Returns the new count.
    ///
    /// At zero the root is released and the reference turns weak.
    pub fn release_ref(
        &mut self,
        heap: &mut ManagedHeap,
        id: ReferenceId,
    ) -> Result<u32, EnvError> {
        let reference = self.refs.get_mut(&id).ok_or(ReferenceError::Unknown(id))?;
        if reference.count == 0 {
            return Err(ReferenceError::AlreadyWeak(id).into());
        }
        reference.count -= 1;
        if reference.count == 0 {
            if let Some(root) = reference.root.take() {
                heap.release_root(root)?;
            }
            log::trace!("reference {id} is now weak");
        }
        Ok(reference.count)
    }

    /// The referenced object, or `None` once it has been collected.
    pub fn value(
        &self,
        heap: &ManagedHeap,
        id: ReferenceId,
    ) -> Result<Option<ObjectId>, EnvError> {
        let reference = self.refs.get(&id).ok_or(ReferenceError::Unknown(id))?;
        Ok(heap.is_live(reference.object).then_some(reference.object))
    }

    /// Current count of a reference.
    pub fn count(&self, id: ReferenceId) -> Result<u32, EnvError> {
        self.refs
            .get(&id)
            .map(|reference| reference.count)
            .ok_or_else(|| ReferenceError::Unknown(id).into())
    }

    /// Delete a reference, releasing its root if it still holds one.
    pub fn delete(&mut self, heap: &mut ManagedHeap, id: ReferenceId) -> Result<(), EnvError> {
        let reference = self
            .refs
            .shift_remove(&id)
            .ok_or(ReferenceError::Unknown(id))?;
        if let Some(root) = reference.root {
            heap.release_root(root)?;
        }
        Ok(())
    }

    /// Forget every reference without touching the heap.
    pub(crate) fn clear(&mut self) {
        self.refs.clear();
    }

    /// Number of references not yet deleted.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether no references exist.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::new()
    }
}
