//! Addon entry points: wrapped numbers, `add`, and C finalizer callbacks.

use std::ffi::{c_char, c_void, CStr};

use tether_core::{EnvError, FinalizerError, Handle};
use tether_runtime::{addon, Env};

use crate::env::get_env;
use crate::status::TetherStatus;

/// Finalizer callback for [`tether_create_external_with_finalize`].
///
/// Returns null on success, or a NUL-terminated error message. A non-null
/// return is a finalizer failure and aborts the process after the message
/// is written to stderr.
pub type TetherFinalizeCallback = extern "C" fn(user_data: *mut c_void) -> *const c_char;

/// Caller-owned pointer handed back to a finalize callback.
struct UserData(*mut c_void);

// SAFETY: the pointer is only passed back to the caller's callback; the
// caller is responsible for whatever it points to.
#[allow(unsafe_code)]
unsafe impl Send for UserData {}

impl UserData {
    fn get(&self) -> *mut c_void {
        self.0
    }
}

/// Write the native handle and, if asked for, its wrapping object.
#[allow(unsafe_code)]
fn write_created(
    env: &Env<f64>,
    created: Result<Handle, EnvError>,
    handle_out: *mut u64,
    object_out: *mut u64,
) -> i32 {
    let handle = match created {
        Ok(handle) => handle,
        Err(e) => return TetherStatus::from(&e) as i32,
    };
    // SAFETY: handle_out is non-null and valid per caller contract.
    unsafe { *handle_out = handle.into_raw() };
    if !object_out.is_null() {
        if let Some(object) = env.owner_of(handle) {
            // SAFETY: object_out is valid per caller contract.
            unsafe { *object_out = object.0 };
        }
    }
    TetherStatus::Ok as i32
}

/// Wrap `value` in a new managed object in the current scope.
///
/// Writes the native handle to `handle_out`, and the id of the wrapping
/// object to `object_out` if non-null. The object id is what
/// [`tether_persist`](crate::tether_persist) and
/// [`tether_unwrap`](crate::tether_unwrap) take.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_create_object(
    env_handle: u64,
    value: f64,
    handle_out: *mut u64,
    object_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        let created = addon::create_object(&mut env, value);
        write_created(&*env, created, handle_out, object_out)
    })
}

/// Sum the native numbers behind handles `a` and `b` into `sum_out`.
///
/// Returns `InvalidHandle` once either number has been finalized.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_add(env_handle: u64, a: u64, b: u64, sum_out: *mut f64) -> i32 {
    ffi_guard!({
        if sum_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let env = ffi_lock!(env_arc);
        match addon::add(&env, Handle::from_raw(a), Handle::from_raw(b)) {
            Ok(sum) => {
                // SAFETY: sum_out is valid per caller contract.
                unsafe { *sum_out = sum };
                TetherStatus::Ok as i32
            }
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

/// Create an object whose finalizer calls `callback(user_data)`.
///
/// `callback` must not be null. It runs with the env locked and must not
/// call back into this API for the same env. The outputs are written as
/// for [`tether_create_object`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_create_external_with_finalize(
    env_handle: u64,
    callback: Option<TetherFinalizeCallback>,
    user_data: *mut c_void,
    handle_out: *mut u64,
    object_out: *mut u64,
) -> i32 {
    ffi_guard!({
        let callback = match callback {
            Some(cb) => cb,
            None => return TetherStatus::InvalidArgument as i32,
        };
        if handle_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let data = UserData(user_data);
        let finalize = move || {
            let message = callback(data.get());
            if message.is_null() {
                return Ok(());
            }
            // SAFETY: a non-null return is a NUL-terminated string per the
            // callback contract.
            let text = unsafe { CStr::from_ptr(message) };
            Err(FinalizerError::new(text.to_string_lossy()))
        };
        let mut env = ffi_lock!(env_arc);
        let created = addon::create_external_with_finalize(&mut env, finalize);
        write_created(&*env, created, handle_out, object_out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{
        tether_collect, tether_env_create, tether_env_destroy, tether_finalize_count,
        tether_scope_close, tether_scope_open,
    };
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_env() -> u64 {
        let mut h = 0u64;
        assert_eq!(
            tether_env_create(std::ptr::null(), &mut h),
            TetherStatus::Ok as i32
        );
        tether_scope_open(h, std::ptr::null_mut());
        h
    }

    fn number(h: u64, value: f64) -> u64 {
        let mut handle = 0u64;
        assert_eq!(
            tether_create_object(h, value, &mut handle, std::ptr::null_mut()),
            TetherStatus::Ok as i32
        );
        handle
    }

    #[test]
    fn add_two_wrapped_numbers() {
        let h = create_env();
        let a = number(h, 10.0);
        let b = number(h, 20.0);
        let mut sum = 0.0f64;
        assert_eq!(tether_add(h, a, b, &mut sum), TetherStatus::Ok as i32);
        assert_eq!(sum, 30.0);

        tether_scope_close(h);
        tether_collect(h, std::ptr::null_mut());
        assert_eq!(tether_finalize_count(h), 2);
        assert_eq!(
            tether_add(h, a, b, &mut sum),
            TetherStatus::InvalidHandle as i32
        );
        assert_eq!(sum, 30.0, "sum_out must not be written on error");
        tether_env_destroy(h);
    }

    #[test]
    fn object_out_names_the_wrapping_object() {
        let h = create_env();
        let (mut first, mut second) = (0u64, 0u64);
        let (mut obj_a, mut obj_b) = (0u64, 0u64);
        assert_eq!(
            tether_create_object(h, 1.0, &mut first, &mut obj_a),
            TetherStatus::Ok as i32
        );
        assert_eq!(
            tether_create_object(h, 2.0, &mut second, &mut obj_b),
            TetherStatus::Ok as i32
        );
        assert_ne!(obj_a, 0);
        assert_ne!(obj_a, obj_b);
        assert_ne!(first, second);
        tether_env_destroy(h);
    }

    #[test]
    fn null_out_pointers_are_invalid_arguments() {
        let h = create_env();
        assert_eq!(
            tether_create_object(h, 1.0, std::ptr::null_mut(), std::ptr::null_mut()),
            TetherStatus::InvalidArgument as i32
        );
        assert_eq!(
            tether_add(h, 1, 2, std::ptr::null_mut()),
            TetherStatus::InvalidArgument as i32
        );
        let mut handle = 0u64;
        assert_eq!(
            tether_create_external_with_finalize(
                h,
                None,
                std::ptr::null_mut(),
                &mut handle,
                std::ptr::null_mut()
            ),
            TetherStatus::InvalidArgument as i32
        );
        tether_env_destroy(h);
    }

    #[test]
    fn create_object_without_scope_fails() {
        let mut h = 0u64;
        tether_env_create(std::ptr::null(), &mut h);
        let mut handle = 0u64;
        assert_eq!(
            tether_create_object(h, 1.0, &mut handle, std::ptr::null_mut()),
            TetherStatus::NoOpenScope as i32
        );
        tether_env_destroy(h);
    }

    static CALLBACK_CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn counting_callback(_user_data: *mut c_void) -> *const c_char {
        CALLBACK_CALLS.fetch_add(1, Ordering::SeqCst);
        std::ptr::null()
    }

    #[test]
    fn external_callback_runs_once_on_collection() {
        let h = create_env();
        let mut handle = 0u64;
        assert_eq!(
            tether_create_external_with_finalize(
                h,
                Some(counting_callback),
                std::ptr::null_mut(),
                &mut handle,
                std::ptr::null_mut()
            ),
            TetherStatus::Ok as i32
        );
        tether_scope_close(h);
        tether_collect(h, std::ptr::null_mut());
        tether_collect(h, std::ptr::null_mut());
        assert_eq!(CALLBACK_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(tether_finalize_count(h), 1);
        tether_env_destroy(h);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn add_over_ffi_matches_sum(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
            let h = create_env();
            let x = number(h, a);
            let y = number(h, b);
            let mut sum = 0.0f64;
            prop_assert_eq!(tether_add(h, x, y, &mut sum), TetherStatus::Ok as i32);
            prop_assert_eq!(sum, a + b);
            tether_env_destroy(h);
        }
    }
}
