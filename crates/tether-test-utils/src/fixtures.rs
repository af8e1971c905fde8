//! Finalizer fixtures.
//!
//! - [`FinalizeCounter`] counts the finalizers it hands out as they run.
//! - [`failing_finalizer`] returns an error, which aborts the process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tether_core::FinalizerError;
use tether_runtime::{Env, Finalization, Finalizer};

/// Shared counter bumped by every finalizer made from it.
///
/// Independent of the env's own finalize count, so a test can tell its
/// finalizers apart from others.
#[derive(Clone, Debug, Default)]
pub struct FinalizeCounter {
    count: Arc<AtomicUsize>,
}

impl FinalizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A finalizer that increments this counter.
    pub fn finalizer<T: 'static>(&self) -> Finalizer<T> {
        let count = self.count.clone();
        Finalizer::new(move |_: &mut Env<T>, _: Finalization<'_>| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// A finalizer that fails with `message`.
pub fn failing_finalizer<T: 'static>(message: &str) -> Finalizer<T> {
    let message = message.to_string();
    Finalizer::new(move |_: &mut Env<T>, _: Finalization<'_>| Err(FinalizerError::new(message)))
}
