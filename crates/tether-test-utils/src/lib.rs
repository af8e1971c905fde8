//! Test utilities for Tether development.
//!
//! Collection is asynchronous from the point of view of managed code, so
//! tests drive it with [`gc_until`] instead of asserting that one
//! collection finalized everything. Finalizer fixtures live in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{failing_finalizer, FinalizeCounter};

use tether_runtime::{Env, EnvConfig};

/// Collection attempts [`gc_until`] makes before giving up.
pub const DEFAULT_GC_ATTEMPTS: usize = 10;

/// Install `env_logger` for the test binary. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An env with default (inline) dispatch.
pub fn test_env<T: 'static>() -> Env<T> {
    init_logging();
    Env::default()
}

/// An env whose finalizers only run on an explicit drain.
pub fn deferred_env<T: 'static>() -> Env<T> {
    init_logging();
    match Env::new(EnvConfig::deferred()) {
        Ok(env) => env,
        Err(e) => panic!("deferred config rejected: {e}"),
    }
}

/// Collect and drain until `done` holds, up to [`DEFAULT_GC_ATTEMPTS`]
/// times. Returns the number of attempts used.
///
/// # Panics
///
/// Panics with `label` if `done` still fails after the last attempt.
pub fn gc_until<T: 'static>(
    env: &mut Env<T>,
    label: &str,
    done: impl FnMut(&Env<T>) -> bool,
) -> usize {
    gc_until_within(env, label, DEFAULT_GC_ATTEMPTS, done)
}

/// [`gc_until`] with an explicit attempt budget.
pub fn gc_until_within<T: 'static>(
    env: &mut Env<T>,
    label: &str,
    attempts: usize,
    mut done: impl FnMut(&Env<T>) -> bool,
) -> usize {
    if done(env) {
        return 0;
    }
    for attempt in 1..=attempts {
        let report = env.collect();
        env.drain_finalizers();
        log::debug!("{label}: attempt {attempt}, {report:?}");
        if done(env) {
            return attempt;
        }
    }
    panic!("{label}: condition not reached after {attempts} collections");
}
