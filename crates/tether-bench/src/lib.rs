//! Benchmark profiles for the Tether wrapping runtime.
//!
//! - [`populate`]: allocate and wrap `n` objects in the current scope
//! - [`rooted_profile`]: an env with `n` wrapped objects pinned by roots

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tether_core::{EnvError, ObjectId, RootId, StoreError};
use tether_runtime::addon::create_object;
use tether_runtime::Env;

/// Wrap `n` numbers into fresh objects in the innermost open scope.
///
/// Returns the wrapping objects, in allocation order.
pub fn populate(env: &mut Env<f64>, n: usize) -> Result<Vec<ObjectId>, EnvError> {
    (0..n)
        .map(|i| {
            let handle = create_object(env, i as f64)?;
            env.owner_of(handle)
                .ok_or(EnvError::Store(StoreError::InvalidHandle(handle)))
        })
        .collect()
}

/// An env holding `n` wrapped objects, each pinned by a persistent root.
///
/// Releasing the roots and collecting finalizes all of them.
pub fn rooted_profile(n: usize) -> Result<(Env<f64>, Vec<RootId>), EnvError> {
    let mut env = Env::default();
    let roots = env.with_scope(|env| -> Result<Vec<RootId>, EnvError> {
        populate(env, n)?
            .into_iter()
            .map(|object| env.persist(object))
            .collect()
    })?;
    Ok((env, roots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_profile_finalizes_after_release() {
        let (mut env, roots) = rooted_profile(16).unwrap();
        env.collect();
        assert_eq!(env.finalize_count(), 0);
        for root in roots {
            env.release_root(root).unwrap();
        }
        env.collect();
        assert_eq!(env.finalize_count(), 16);
    }
}
