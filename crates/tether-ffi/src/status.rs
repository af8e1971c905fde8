//! C-compatible status codes.
//!
//! [`TetherStatus`] is a `repr(i32)` enum covering every error the runtime
//! reports synchronously. Finalizer failures have no code: they abort the
//! process instead of returning.

use tether_core::{EnvError, HeapError, ReferenceError, RegistryError, StoreError};
use tether_runtime::ConfigError;

/// C-compatible status code returned by FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TetherStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid, stale, or was already destroyed.
    InvalidHandle = -1,
    /// The object already carries a wrapper.
    DuplicateWrap = -2,
    /// The object carries no live wrapper.
    NotWrapped = -3,
    /// The object was collected.
    DeadObject = -4,
    /// No handle scope is open.
    NoOpenScope = -5,
    /// The persistent root does not exist.
    UnknownRoot = -6,
    /// The env is tearing down.
    TearingDown = -7,
    /// Configuration validation error.
    ConfigError = -8,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -9,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -10,
    /// The native object is owned by a wrapper.
    HandleWrapped = -11,
    /// The reference was deleted or never created.
    UnknownReference = -12,
    /// The reference count is already zero.
    ReferenceWeak = -13,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&EnvError> for TetherStatus {
    fn from(e: &EnvError) -> Self {
        match e {
            EnvError::Store(StoreError::InvalidHandle(_)) => TetherStatus::InvalidHandle,
            EnvError::Registry(RegistryError::DuplicateWrap(_)) => TetherStatus::DuplicateWrap,
            EnvError::Registry(RegistryError::NotWrapped(_)) => TetherStatus::NotWrapped,
            EnvError::Registry(RegistryError::HandleWrapped(_)) => TetherStatus::HandleWrapped,
            EnvError::Heap(HeapError::DeadObject(_)) => TetherStatus::DeadObject,
            EnvError::Heap(HeapError::NoOpenScope) => TetherStatus::NoOpenScope,
            EnvError::Heap(HeapError::UnknownRoot(_)) => TetherStatus::UnknownRoot,
            EnvError::Reference(ReferenceError::Unknown(_)) => TetherStatus::UnknownReference,
            EnvError::Reference(ReferenceError::AlreadyWeak(_)) => TetherStatus::ReferenceWeak,
            EnvError::TearingDown => TetherStatus::TearingDown,
        }
    }
}

impl From<&ConfigError> for TetherStatus {
    fn from(_e: &ConfigError) -> Self {
        TetherStatus::ConfigError
    }
}
