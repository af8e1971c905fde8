//! Managed heap model: object liveness, handle scopes, roots and tracing.
//!
//! Stands in for the managed runtime's collector. Objects are rooted by
//! the handle scope they were allocated in and by persistent roots;
//! anything not reachable from a root through object edges is swept by
//! [`ManagedHeap::sweep_unreachable`].

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tether_core::{HeapError, ObjectId, RootId};

#[derive(Default)]
struct ManagedObject {
    edges: SmallVec<[ObjectId; 4]>,
}

/// Tracing heap of managed objects.
pub struct ManagedHeap {
    objects: IndexMap<ObjectId, ManagedObject>,
    /// Stack of open handle scopes; each holds the locals it roots.
    scopes: Vec<Vec<ObjectId>>,
    persistent: IndexMap<RootId, ObjectId>,
    next_object: u64,
    next_root: u64,
    allocated_since_collect: usize,
}

impl ManagedHeap {
    /// Create an empty heap with no open scopes.
    pub fn new() -> Self {
        Self {
            objects: IndexMap::new(),
            scopes: Vec::new(),
            persistent: IndexMap::new(),
            next_object: 1,
            next_root: 1,
            allocated_since_collect: 0,
        }
    }

    // ── Scopes ─────────────────────────────────────────────────────

    /// Open a handle scope. Returns the new scope depth.
    pub fn open_scope(&mut self) -> usize {
        self.scopes.push(Vec::new());
        self.scopes.len()
    }

    /// Close the innermost scope, unrooting its locals.
    ///
    /// Returns how many locals the scope held.
    pub fn close_scope(&mut self) -> Result<usize, HeapError> {
        self.scopes
            .pop()
            .map(|locals| locals.len())
            .ok_or(HeapError::NoOpenScope)
    }

    /// Close scopes until at most `depth` remain open.
    pub fn close_scopes_to(&mut self, depth: usize) {
        self.scopes.truncate(depth);
    }

    /// Number of open scopes.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Root `object` in the enclosing scope so it survives the innermost
    /// one closing.
    pub fn escape(&mut self, object: ObjectId) -> Result<(), HeapError> {
        self.check_live(object)?;
        let depth = self.scopes.len();
        if depth < 2 {
            return Err(HeapError::NoOpenScope);
        }
        self.scopes[depth - 2].push(object);
        Ok(())
    }

    // ── Objects ────────────────────────────────────────────────────

    /// Allocate an object rooted by the innermost open scope.
    pub fn alloc(&mut self) -> Result<ObjectId, HeapError> {
        let scope = self.scopes.last_mut().ok_or(HeapError::NoOpenScope)?;
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        scope.push(id);
        self.objects.insert(id, ManagedObject::default());
        self.allocated_since_collect += 1;
        Ok(id)
    }

    /// Whether `object` has not been collected.
    pub fn is_live(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }

    fn check_live(&self, object: ObjectId) -> Result<(), HeapError> {
        if self.is_live(object) {
            Ok(())
        } else {
            Err(HeapError::DeadObject(object))
        }
    }

    /// Record that `from` references `to`, keeping `to` alive as long as
    /// `from` is reachable.
    pub fn link(&mut self, from: ObjectId, to: ObjectId) -> Result<(), HeapError> {
        self.check_live(to)?;
        let source = self
            .objects
            .get_mut(&from)
            .ok_or(HeapError::DeadObject(from))?;
        if !source.edges.contains(&to) {
            source.edges.push(to);
        }
        Ok(())
    }

    /// Drop the reference from `from` to `to`. Returns whether it existed.
    pub fn unlink(&mut self, from: ObjectId, to: ObjectId) -> Result<bool, HeapError> {
        let source = self
            .objects
            .get_mut(&from)
            .ok_or(HeapError::DeadObject(from))?;
        let before = source.edges.len();
        source.edges.retain(|edge| *edge != to);
        Ok(source.edges.len() != before)
    }

    // ── Persistent roots ───────────────────────────────────────────

    /// Keep `object` alive independently of any scope.
    pub fn persist(&mut self, object: ObjectId) -> Result<RootId, HeapError> {
        self.check_live(object)?;
        let root = RootId(self.next_root);
        self.next_root += 1;
        self.persistent.insert(root, object);
        Ok(root)
    }

    /// Release a persistent root, returning the object it kept alive.
    pub fn release_root(&mut self, root: RootId) -> Result<ObjectId, HeapError> {
        self.persistent
            .shift_remove(&root)
            .ok_or(HeapError::UnknownRoot(root))
    }

    /// Release every persistent root.
    pub fn release_all_roots(&mut self) -> usize {
        let n = self.persistent.len();
        self.persistent.clear();
        n
    }

    // ── Collection ─────────────────────────────────────────────────

    /// Number of live objects.
    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of persistent roots.
    pub fn root_count(&self) -> usize {
        self.persistent.len()
    }

    /// Objects allocated since the last sweep.
    pub fn allocated_since_collect(&self) -> usize {
        self.allocated_since_collect
    }

    /// Mark from scope locals and persistent roots, remove every object
    /// that was not reached, and return the removed objects in allocation
    /// order.
    pub fn sweep_unreachable(&mut self) -> Vec<ObjectId> {
        let mut marked: IndexSet<ObjectId> = IndexSet::with_capacity(self.objects.len());
        let mut worklist: Vec<ObjectId> = self
            .scopes
            .iter()
            .flatten()
            .copied()
            .chain(self.persistent.values().copied())
            .collect();

        while let Some(id) = worklist.pop() {
            if !marked.insert(id) {
                continue;
            }
            if let Some(object) = self.objects.get(&id) {
                worklist.extend(object.edges.iter().copied());
            }
        }

        let dead: Vec<ObjectId> = self
            .objects
            .keys()
            .filter(|id| !marked.contains(*id))
            .copied()
            .collect();
        self.objects.retain(|id, _| marked.contains(id));
        self.allocated_since_collect = 0;
        dead
    }
}

impl Default for ManagedHeap {
    fn default() -> Self {
        Self::new()
    }
}
