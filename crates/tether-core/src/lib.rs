//! Core types and traits for the Tether wrapping runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers shared by every layer (managed objects, native
//! handles, roots, references, collection cycles), the error taxonomy,
//! and the [`Combine`] contract for binary operations over native
//! payloads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{
    EnvError, FinalizerError, HeapError, ReferenceError, RegistryError, StoreError,
};
pub use id::{CycleId, Handle, ObjectId, ReferenceId, RootId};
pub use traits::Combine;
