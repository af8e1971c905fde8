//! The wrapping addon surface, as managed code sees it.
//!
//! Native objects hold an `f64`. Managed code only ever sees the native
//! [`Handle`]; the wrapping object stays reachable through the scope it was
//! created in (see [`Env::owner_of`]). Every object made here carries a
//! finalizer, so each one counts toward [`finalize_count`] once collected.

use tether_core::{EnvError, FinalizerError, Handle};

use crate::env::Env;
use crate::finalizer::{Finalization, Finalizer};

fn counted() -> Finalizer<f64> {
    Finalizer::new(|_: &mut Env<f64>, _: Finalization<'_>| Ok(()))
}

/// Wrap `value` in a new managed object in the current scope.
///
/// Returns the handle of the wrapped native number.
pub fn create_object(env: &mut Env<f64>, value: f64) -> Result<Handle, EnvError> {
    let object = env.create_external(value, Some(counted()))?;
    env.handle_of(object)
}

/// Sum the native numbers behind `a` and `b`.
///
/// Fails with `InvalidHandle` once either one has been finalized.
pub fn add(env: &Env<f64>, a: Handle, b: Handle) -> Result<f64, EnvError> {
    env.combine(a, b)
}

/// Finalizers of `env` that have completed.
pub fn finalize_count(env: &Env<f64>) -> u64 {
    env.finalize_count()
}

/// Create an object whose finalizer runs `callback`.
///
/// An `Err` from `callback` aborts the process when the object is
/// finalized.
pub fn create_external_with_finalize<F>(
    env: &mut Env<f64>,
    callback: F,
) -> Result<Handle, EnvError>
where
    F: FnOnce() -> Result<(), FinalizerError> + Send + 'static,
{
    let finalizer = Finalizer::new(move |_: &mut Env<f64>, _: Finalization<'_>| callback());
    let object = env.create_external(0.0, Some(finalizer))?;
    env.handle_of(object)
}
