//! Tether: native object wrapping with exactly-once finalization.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tether sub-crates. For most users, adding `tether` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tether::prelude::*;
//! use tether::addon::{add, create_object, finalize_count};
//!
//! let mut env: Env<f64> = Env::new(EnvConfig::default()).unwrap();
//!
//! // Objects allocated in a scope are reachable until the scope closes.
//! let sum = env.with_scope(|env| {
//!     let a = create_object(env, 10.0).unwrap();
//!     let b = create_object(env, 20.0).unwrap();
//!     add(env, a, b).unwrap()
//! });
//! assert_eq!(sum, 30.0);
//!
//! // Both objects are now unreachable; a collection finalizes them.
//! env.collect();
//! assert_eq!(finalize_count(&env), 2);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | IDs, handles, error types, `Combine` |
//! | [`store`] | `tether-store` | Native object store and handle table |
//! | [`runtime`] | `tether-runtime` | Env, heap, registry, dispatcher, config |
//! | [`addon`] | `tether-runtime` | The wrapped-number addon surface |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs and errors (`tether-core`).
pub use tether_core as types;

/// Native object storage (`tether-store`).
///
/// [`store::NativeObjectStore`] hands out generation-checked handles.
pub use tether_store as store;

/// The managed-side runtime (`tether-runtime`).
///
/// [`runtime::Env`] owns a heap, its wrappers and the finalizer queue.
pub use tether_runtime as runtime;

/// Addon entry points over `Env<f64>` (`tether-runtime::addon`).
pub use tether_runtime::addon;

/// Common imports for typical Tether usage.
///
/// ```rust
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Identifiers and traits
    pub use tether_core::{Combine, CycleId, Handle, ObjectId, ReferenceId, RootId};

    // Errors
    pub use tether_core::{
        EnvError, FinalizerError, HeapError, ReferenceError, RegistryError, StoreError,
    };

    // Runtime
    pub use tether_runtime::{
        CollectReport, ConfigError, DispatchMode, Env, EnvConfig, EnvMetrics, Finalization,
        Finalizer, TeardownReport, WrapperState,
    };
}
