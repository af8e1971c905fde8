//! C FFI bindings for the Tether wrapping runtime.
//!
//! Environments live in a global handle table and are addressed by `u64`
//! handles; managed objects, roots and references are addressed by their
//! raw ids. Native numbers are addressed by their raw handles.
//! Every entry point returns a [`TetherStatus`] code (or a plain value
//! for the convenience getters) and never unwinds into C: panics are
//! caught and reported through [`tether_last_panic_message`].
//!
//! Finalizers run while the env is locked. A C finalizer callback must
//! not call back into the API for its own env.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

thread_local! {
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

pub(crate) fn record_panic(payload: &(dyn Any + Send)) {
    let message = tether_runtime::panic_message(payload);
    log::error!("panic caught at FFI boundary: {message}");
    LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
}

/// Run a body, turning a panic into `$default`.
macro_rules! ffi_guard_or {
    ($default:expr, $body:block) => {{
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(payload.as_ref());
                $default
            }
        }
    }};
}

/// Run a status-returning body, turning a panic into `Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::TetherStatus::Panicked as i32, $body)
    };
}

/// Lock a mutex, returning `InternalError` from the guarded body if it
/// is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::TetherStatus::InternalError as i32,
        }
    };
}

pub mod addon;
pub mod env;
pub mod reference;
pub mod status;

pub use addon::{
    tether_add, tether_create_external_with_finalize, tether_create_object, TetherFinalizeCallback,
};
pub use env::{
    tether_collect, tether_drain_finalizers, tether_env_create, tether_env_destroy,
    tether_finalize_count, tether_finalize_count_get, tether_persist, tether_release_root,
    tether_scope_close, tether_scope_open, tether_unwrap, TetherCollectReport, TetherEnvConfig,
};
pub use reference::{
    tether_reference_create, tether_reference_delete, tether_reference_ref,
    tether_reference_unref, tether_reference_value,
};
pub use status::TetherStatus;

/// Copy the last panic message caught on this thread into `buf`.
///
/// Returns the full message length in bytes (0 if none). At most
/// `cap - 1` bytes are written, followed by a NUL. Pass a null `buf` to
/// query the length only.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let message = cell.borrow();
        let bytes = message.as_bytes();
        if !buf.is_null() && cap > 0 {
            let n = bytes.len().min(cap - 1);
            // SAFETY: buf points to at least `cap` writable bytes per caller contract.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}
