//! Reference FFI: counted references that are strong above zero and weak
//! at zero.
//!
//! Object ids are never 0, so [`tether_reference_value`] reports a
//! collected object as 0.

use tether_core::{EnvError, ObjectId, ReferenceId};
use tether_runtime::Env;

use crate::env::get_env;
use crate::status::TetherStatus;

/// Run `op` on the env behind `env_handle` and write its count result.
#[allow(unsafe_code)]
fn update_count(
    env_handle: u64,
    count_out: *mut u32,
    op: impl FnOnce(&mut Env<f64>) -> Result<u32, EnvError>,
) -> i32 {
    let env_arc = match get_env(env_handle) {
        Some(arc) => arc,
        None => return TetherStatus::InvalidHandle as i32,
    };
    let mut env = ffi_lock!(env_arc);
    match op(&mut *env) {
        Ok(count) => {
            if !count_out.is_null() {
                // SAFETY: count_out is valid per caller contract.
                unsafe { *count_out = count };
            }
            TetherStatus::Ok as i32
        }
        Err(e) => TetherStatus::from(&e) as i32,
    }
}

/// Create a reference to `object` with `initial` strong counts.
///
/// Writes the reference id to `ref_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_reference_create(
    env_handle: u64,
    object: u64,
    initial: u32,
    ref_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if ref_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        match env.create_reference(ObjectId(object), initial) {
            Ok(reference) => {
                // SAFETY: ref_out is valid per caller contract.
                unsafe { *ref_out = reference.0 };
                TetherStatus::Ok as i32
            }
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

/// Increment a reference's count. Writes the new count to `count_out` if
/// non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_reference_ref(
    env_handle: u64,
    reference: u64,
    count_out: *mut u32,
) -> i32 {
    ffi_guard!({
        update_count(env_handle, count_out, |env| env.reference_ref(ReferenceId(reference)))
    })
}

/// Decrement a reference's count. Writes the new count to `count_out` if
/// non-null. Returns `ReferenceWeak` if the count is already zero.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_reference_unref(
    env_handle: u64,
    reference: u64,
    count_out: *mut u32,
) -> i32 {
    ffi_guard!({
        update_count(env_handle, count_out, |env| env.reference_unref(ReferenceId(reference)))
    })
}

/// Write the referenced object to `object_out`, or 0 once it has been
/// collected.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_reference_value(
    env_handle: u64,
    reference: u64,
    object_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if object_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let env = ffi_lock!(env_arc);
        match env.reference_value(ReferenceId(reference)) {
            Ok(object) => {
                // SAFETY: object_out is valid per caller contract.
                unsafe { *object_out = object.map_or(0, |o| o.0) };
                TetherStatus::Ok as i32
            }
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

/// Delete a reference.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_reference_delete(env_handle: u64, reference: u64) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        match env.delete_reference(ReferenceId(reference)) {
            Ok(()) => TetherStatus::Ok as i32,
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addon::tether_create_object;
    use crate::env::{
        tether_collect, tether_env_create, tether_env_destroy, tether_finalize_count,
        tether_scope_close, tether_scope_open,
    };

    fn env_with_object() -> (u64, u64) {
        let mut h = 0u64;
        assert_eq!(
            tether_env_create(std::ptr::null(), &mut h),
            TetherStatus::Ok as i32
        );
        tether_scope_open(h, std::ptr::null_mut());
        let (mut handle, mut obj) = (0u64, 0u64);
        assert_eq!(
            tether_create_object(h, 1.0, &mut handle, &mut obj),
            TetherStatus::Ok as i32
        );
        tether_scope_close(h);
        (h, obj)
    }

    #[test]
    fn weak_reference_reads_zero_after_collection() {
        let (h, obj) = env_with_object();
        let mut reference = 0u64;
        assert_eq!(
            tether_reference_create(h, obj, 0, &mut reference),
            TetherStatus::Ok as i32
        );
        let mut value = u64::MAX;
        assert_eq!(
            tether_reference_value(h, reference, &mut value),
            TetherStatus::Ok as i32
        );
        assert_eq!(value, obj);

        tether_collect(h, std::ptr::null_mut());
        assert_eq!(tether_finalize_count(h), 1);
        assert_eq!(
            tether_reference_value(h, reference, &mut value),
            TetherStatus::Ok as i32
        );
        assert_eq!(value, 0);
        tether_env_destroy(h);
    }

    #[test]
    fn strong_reference_counts_down_to_weak() {
        let (h, obj) = env_with_object();
        let mut reference = 0u64;
        tether_reference_create(h, obj, 1, &mut reference);
        tether_collect(h, std::ptr::null_mut());
        assert_eq!(tether_finalize_count(h), 0);

        let mut count = 0u32;
        assert_eq!(
            tether_reference_unref(h, reference, &mut count),
            TetherStatus::Ok as i32
        );
        assert_eq!(count, 0);
        assert_eq!(
            tether_reference_unref(h, reference, &mut count),
            TetherStatus::ReferenceWeak as i32
        );
        tether_collect(h, std::ptr::null_mut());
        assert_eq!(tether_finalize_count(h), 1);
        assert_eq!(
            tether_reference_ref(h, reference, &mut count),
            TetherStatus::DeadObject as i32
        );
        tether_env_destroy(h);
    }

    #[test]
    fn deleted_reference_is_unknown() {
        let (h, obj) = env_with_object();
        let mut reference = 0u64;
        tether_reference_create(h, obj, 2, &mut reference);
        assert_eq!(tether_reference_delete(h, reference), TetherStatus::Ok as i32);
        assert_eq!(
            tether_reference_delete(h, reference),
            TetherStatus::UnknownReference as i32
        );
        let mut value = 0u64;
        assert_eq!(
            tether_reference_value(h, reference, &mut value),
            TetherStatus::UnknownReference as i32
        );
        tether_collect(h, std::ptr::null_mut());
        assert_eq!(tether_finalize_count(h), 1);
        tether_env_destroy(h);
    }

    #[test]
    fn null_out_pointers_are_invalid_arguments() {
        let (h, obj) = env_with_object();
        assert_eq!(
            tether_reference_create(h, obj, 0, std::ptr::null_mut()),
            TetherStatus::InvalidArgument as i32
        );
        assert_eq!(
            tether_reference_value(h, 1, std::ptr::null_mut()),
            TetherStatus::InvalidArgument as i32
        );
        tether_env_destroy(h);
    }
}
