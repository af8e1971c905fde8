//! Native object storage for the Tether wrapping runtime.
//!
//! [`NativeObjectStore`] owns native payloads and exposes them through
//! generation-checked [`Handle`](tether_core::Handle)s backed by a
//! [`HandleTable`]. A handle that outlives its object resolves to
//! [`StoreError::InvalidHandle`](tether_core::StoreError::InvalidHandle),
//! never to another object.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod store;
pub mod table;

pub use store::NativeObjectStore;
pub use table::HandleTable;
