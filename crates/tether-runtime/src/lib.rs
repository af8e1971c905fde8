//! Managed-side runtime for the Tether wrapping subsystem.
//!
//! An [`Env`] models one managed heap. Objects allocated in it can be
//! bound to native objects through the [`WrapperRegistry`]; once an object
//! becomes unreachable, a collection queues its wrapper on the
//! [`FinalizationDispatcher`], which runs the finalizer exactly once and
//! releases the native object. A failing finalizer aborts the process via
//! [`fatal::finalizer_failed`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod addon;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod fatal;
pub mod finalizer;
pub mod heap;
pub mod metrics;
pub mod reference;
pub mod registry;

pub use config::{ConfigError, DispatchMode, EnvConfig};
pub use dispatch::FinalizationDispatcher;
pub use env::Env;
pub use fatal::FinalizerFailure;
pub use finalizer::{panic_message, FinalizeFn, Finalization, Finalizer};
pub use heap::ManagedHeap;
pub use metrics::{CollectReport, EnvMetrics, TeardownReport};
pub use reference::ReferenceTable;
pub use registry::{Wrapper, WrapperRegistry, WrapperState};
