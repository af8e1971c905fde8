//! Fatal-error channel for failed finalizers.
//!
//! A finalizer runs outside any managed call stack, so there is nobody to
//! return its error to. The only exit is [`finalizer_failed`], which
//! never returns: it reports the failure on stderr and aborts the process
//! so hosts and harnesses can observe both the exit status and the text.

use std::fmt;
use std::io::Write;

use tether_core::{CycleId, FinalizerError, Handle, ObjectId};

/// Record of a finalizer that failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizerFailure {
    /// Managed object whose finalizer failed.
    pub object: ObjectId,
    /// Native handle the finalizer was given.
    pub handle: Handle,
    /// Collection cycle during (or after) which the finalizer ran.
    pub cycle: CycleId,
    /// The error the finalizer raised.
    pub error: FinalizerError,
}

impl fmt::Display for FinalizerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "finalizer for object {} (native {}, cycle {}) failed: {}",
            self.object, self.handle, self.cycle, self.error
        )
    }
}

/// Report `failure` on the diagnostic stream and abort the process.
pub fn finalizer_failed(failure: FinalizerFailure) -> ! {
    log::error!("{failure}");
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "FATAL ERROR: {failure}");
    let _ = writeln!(stderr, "{}", failure.error);
    let _ = stderr.flush();
    std::process::abort()
}
