//! Generation-checked storage behind every native [`Handle`].
//!
//! A native object's slot remembers how many times it has been vacated.
//! A handle carries the count it was issued under, so once the object is
//! released the handle stops resolving, even after the slot holds a new
//! object. A slot whose count would wrap back to zero is taken out of
//! service for good.

use tether_core::Handle;

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

impl<T> Entry<T> {
    fn generation(&self) -> u32 {
        match self {
            Entry::Occupied { generation, .. } | Entry::Vacant { generation } => *generation,
        }
    }
}

/// Values addressed by [`Handle`]s that go stale when the value is removed.
pub struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    /// Vacant slots that may be handed out again, most recent last.
    reusable: Vec<u32>,
    occupied: usize,
}

impl<T> HandleTable<T> {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            reusable: Vec::new(),
            occupied: 0,
        }
    }

    /// Store `value`, reusing a vacated slot when one is available.
    pub fn insert(&mut self, value: T) -> Handle {
        self.occupied += 1;
        let slot = match self.reusable.pop() {
            Some(slot) => slot,
            None => {
                self.entries.push(Entry::Vacant { generation: 0 });
                (self.entries.len() - 1) as u32
            }
        };
        let entry = &mut self.entries[slot as usize];
        let generation = entry.generation();
        *entry = Entry::Occupied { generation, value };
        Handle::from_parts(slot, generation)
    }

    /// The value behind `handle`, unless it was removed or never issued.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.entries.get(handle.slot() as usize)? {
            Entry::Occupied { generation, value } if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Mutable access to the value behind `handle`.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.entries.get_mut(handle.slot() as usize)? {
            Entry::Occupied { generation, value } if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Whether `handle` still resolves.
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Take the value behind `handle` out of the table.
    ///
    /// Every handle issued for the slot so far goes stale. Removing through
    /// a stale handle returns `None` and changes nothing.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = handle.slot();
        let entry = self.entries.get_mut(slot as usize)?;
        match entry {
            Entry::Occupied { generation, .. } if *generation == handle.generation() => {}
            _ => return None,
        }
        let next = handle.generation().wrapping_add(1);
        let Entry::Occupied { value, .. } =
            std::mem::replace(entry, Entry::Vacant { generation: next })
        else {
            return None;
        };
        self.occupied -= 1;
        // At zero the slot would start handing out handles it issued before.
        if next != 0 {
            self.reusable.push(slot);
        }
        Some(value)
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Handles of every stored value, in slot order.
    pub fn handles(&self) -> Vec<Handle> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Entry::Occupied { generation, .. } => {
                    Some(Handle::from_parts(slot as u32, *generation))
                }
                Entry::Vacant { .. } => None,
            })
            .collect()
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
