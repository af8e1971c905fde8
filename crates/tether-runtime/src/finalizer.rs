//! Finalizer callbacks and the arguments they receive.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tether_core::{FinalizerError, Handle, ObjectId};

use crate::env::Env;

/// Boxed finalizer callback.
pub type FinalizeFn<T> =
    dyn FnOnce(&mut Env<T>, Finalization<'_>) -> Result<(), FinalizerError> + Send;

/// What a finalizer is told about the object being finalized.
///
/// The native object behind `handle` is still live while the finalizer
/// runs, so it can be read through the env.
pub struct Finalization<'a> {
    /// The managed object that became unreachable.
    pub object: ObjectId,
    /// Handle of the native object wrapped by `object`.
    pub handle: Handle,
    hint: Option<&'a (dyn Any + Send)>,
}

impl Finalization<'_> {
    /// The hint registered with the finalizer, if it has type `H`.
    pub fn hint<H: Any>(&self) -> Option<&H> {
        self.hint?.downcast_ref::<H>()
    }
}

/// A cleanup callback plus optional hint data, registered at wrap time.
///
/// The callback is `FnOnce`: a finalizer can run at most once.
pub struct Finalizer<T: 'static> {
    callback: Box<FinalizeFn<T>>,
    hint: Option<Box<dyn Any + Send>>,
}

impl<T: 'static> Finalizer<T> {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(&mut Env<T>, Finalization<'_>) -> Result<(), FinalizerError> + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
            hint: None,
        }
    }

    /// Attach hint data handed back to the callback.
    pub fn with_hint(mut self, hint: impl Any + Send) -> Self {
        self.hint = Some(Box::new(hint));
        self
    }

    /// Run the callback. A panic inside it counts as a failure.
    pub(crate) fn invoke(
        self,
        env: &mut Env<T>,
        object: ObjectId,
        handle: Handle,
    ) -> Result<(), FinalizerError> {
        let Self { callback, hint } = self;
        let finalization = Finalization {
            object,
            handle,
            hint: hint.as_deref(),
        };
        match panic::catch_unwind(AssertUnwindSafe(|| callback(env, finalization))) {
            Ok(result) => result,
            Err(payload) => Err(FinalizerError::new(format!(
                "finalizer panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

impl<T: 'static> std::fmt::Debug for Finalizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finalizer")
            .field("has_hint", &self.hint.is_some())
            .finish()
    }
}

/// Extract a printable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
