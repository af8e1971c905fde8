//! Error types for the Tether wrapping runtime.
//!
//! Organized by subsystem: native object store, wrapper registry and
//! managed heap, plus counted references. [`EnvError`] unifies them for the environment API.
//! [`FinalizerError`] is deliberately not part of [`EnvError`]: a failing
//! finalizer has no caller to return to and is escalated to a process
//! abort by the runtime.

use thiserror::Error;

use crate::id::{Handle, ObjectId, ReferenceId, RootId};

/// Errors from the native object store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The handle does not reference a live native object (never issued,
    /// already finalized, or already released).
    #[error("handle {0} does not reference a live native object")]
    InvalidHandle(Handle),
}

/// Misuse of the wrapper registry API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The managed object already carries a wrapper.
    #[error("object {0} is already wrapped")]
    DuplicateWrap(ObjectId),
    /// The managed object has no live wrapper.
    #[error("object {0} is not wrapped")]
    NotWrapped(ObjectId),
    /// The native object is already owned by a wrapper, so it can be
    /// neither wrapped again nor released directly.
    #[error("native {0} is owned by a wrapper")]
    HandleWrapped(Handle),
}

/// Errors from the managed heap model.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The object was collected (or never allocated).
    #[error("object {0} is not live")]
    DeadObject(ObjectId),
    /// Allocation requires an open handle scope.
    #[error("cannot allocate without an open handle scope")]
    NoOpenScope,
    /// The persistent root was already released (or never created).
    #[error("root {0} does not exist")]
    UnknownRoot(RootId),
}

/// Misuse of a counted reference.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The reference was deleted (or never created).
    #[error("reference {0} does not exist")]
    Unknown(ReferenceId),
    /// The reference count is already zero.
    #[error("reference {0} is already weak")]
    AlreadyWeak(ReferenceId),
}

/// Errors returned synchronously by environment operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnvError {
    /// A native object store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A wrapper registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A managed heap operation failed.
    #[error(transparent)]
    Heap(#[from] HeapError),
    /// A reference operation failed.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    /// The environment is being torn down and accepts no new objects.
    #[error("environment is tearing down")]
    TearingDown,
}

/// Error raised by a finalizer callback.
///
/// Carries the message the finalizer failed with. The runtime never hands
/// this back to a caller; it is written to the diagnostic stream before
/// the process aborts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FinalizerError {
    message: String,
}

impl FinalizerError {
    /// Create a finalizer error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the finalizer failed with.
    pub fn message(&self) -> &str {
        &self.message
    }
}
