//! Strongly-typed identifiers for managed objects, native handles, roots
//! and references.

use std::fmt;

/// Identifies a managed object within an environment's heap.
///
/// Allocated sequentially by the heap and never reused for the lifetime
/// of the environment, so a dead `ObjectId` can never alias a newer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Opaque reference to a natively-owned object.
///
/// Encoding: upper 32 bits = slot index, lower 32 bits = generation.
/// A handle does not own its object; once the object is released the
/// handle goes stale and every lookup through it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Build a handle from its slot index and generation counter.
    pub const fn from_parts(slot: u32, generation: u32) -> Self {
        Self(((slot as u64) << 32) | (generation as u64))
    }

    /// Reinterpret a raw `u64` (e.g. received over FFI) as a handle.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw `u64` encoding, suitable for passing across FFI.
    pub const fn into_raw(self) -> u64 {
        self.0
    }

    /// Slot index in the owning table.
    pub const fn slot(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Generation counter the slot had when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slot(), self.generation())
    }
}

/// Identifies a persistent root that keeps one managed object alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub u64);

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RootId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a counted reference to a managed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(pub u64);

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ReferenceId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing collection cycle counter.
///
/// `CycleId(0)` means no collection has run yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

impl CycleId {
    /// The cycle that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CycleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn handle_parts_are_recoverable() {
        let h = Handle::from_parts(7, 3);
        assert_eq!(h.slot(), 7);
        assert_eq!(h.generation(), 3);
        assert_eq!(Handle::from_raw(h.into_raw()), h);
    }

    #[test]
    fn handle_display_shows_slot_and_generation() {
        assert_eq!(Handle::from_parts(2, 9).to_string(), "2:9");
    }

    #[test]
    fn cycle_advances() {
        assert_eq!(CycleId::default().next(), CycleId(1));
    }

    proptest! {
        #[test]
        fn distinct_generations_give_distinct_handles(
            slot in any::<u32>(),
            a in any::<u32>(),
            b in any::<u32>()
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(Handle::from_parts(slot, a), Handle::from_parts(slot, b));
        }
    }
}
