//! Env lifecycle FFI: create, destroy, scopes, roots, collection.
//!
//! Uses per-env `Arc<Mutex<Env<f64>>>` so the global `ENVS` table lock is
//! only held for handle lookup. Destroying an env removes it from the
//! table first and tears it down after the table lock is released.

use std::sync::{Arc, Mutex};

use tether_core::{Handle, ObjectId, RootId};
use tether_runtime::{CollectReport, DispatchMode, Env, EnvConfig};
use tether_store::HandleTable;

use crate::status::TetherStatus;

type EnvArc = Arc<Mutex<Env<f64>>>;

static ENVS: Mutex<HandleTable<EnvArc>> = Mutex::new(HandleTable::new());

/// C mirror of [`EnvConfig`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TetherEnvConfig {
    /// 0 = inline dispatch, 1 = deferred dispatch.
    pub dispatch: u8,
    /// Non-zero enables automatic collection.
    pub auto_collect: u8,
    /// Allocations between automatic collections. Must be at least 1 when
    /// `auto_collect` is set.
    pub auto_collect_after: u64,
    /// Non-zero finalizes still-live wrappers on teardown.
    pub finalize_on_teardown: u8,
}

impl Default for TetherEnvConfig {
    fn default() -> Self {
        Self {
            dispatch: 0,
            auto_collect: 0,
            auto_collect_after: 0,
            finalize_on_teardown: 1,
        }
    }
}

impl TetherEnvConfig {
    fn to_config(self) -> Result<EnvConfig, TetherStatus> {
        let dispatch = match self.dispatch {
            0 => DispatchMode::Inline,
            1 => DispatchMode::Deferred,
            _ => return Err(TetherStatus::InvalidArgument),
        };
        let auto_collect_after = if self.auto_collect != 0 {
            let after = usize::try_from(self.auto_collect_after)
                .map_err(|_| TetherStatus::InvalidArgument)?;
            Some(after)
        } else {
            None
        };
        Ok(EnvConfig {
            dispatch,
            auto_collect_after,
            finalize_on_teardown: self.finalize_on_teardown != 0,
        })
    }
}

/// C mirror of [`CollectReport`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TetherCollectReport {
    /// The cycle that ran.
    pub cycle: u64,
    /// Managed objects swept.
    pub swept: u64,
    /// Wrappers queued for finalization.
    pub queued: u64,
    /// Finalizers that completed during the call.
    pub finalized: u64,
}

impl From<CollectReport> for TetherCollectReport {
    fn from(r: CollectReport) -> Self {
        Self {
            cycle: r.cycle.0,
            swept: r.swept as u64,
            queued: r.queued as u64,
            finalized: r.finalized as u64,
        }
    }
}

/// Clone the Arc for an env handle, briefly locking the global table.
///
/// Returns `None` if the handle is invalid or the mutex is poisoned.
pub(crate) fn get_env(handle: u64) -> Option<EnvArc> {
    ENVS.lock().ok()?.get(Handle::from_raw(handle)).cloned()
}

/// Create an env. `config` may be null for defaults.
///
/// On success, writes the env handle to `env_out` and returns `TETHER_OK`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_env_create(config: *const TetherEnvConfig, env_out: *mut u64) -> i32 {
    ffi_guard!({
        if env_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let raw = if config.is_null() {
            TetherEnvConfig::default()
        } else {
            // SAFETY: config is valid per caller contract.
            unsafe { *config }
        };
        let config = match raw.to_config() {
            Ok(c) => c,
            Err(status) => return status as i32,
        };
        let env = match Env::new(config) {
            Ok(env) => env,
            Err(e) => return TetherStatus::from(&e) as i32,
        };
        let handle = ffi_lock!(ENVS).insert(Arc::new(Mutex::new(env)));
        // SAFETY: env_out is valid per caller contract.
        unsafe { *env_out = handle.into_raw() };
        TetherStatus::Ok as i32
    })
}

/// Destroy an env, tearing it down.
///
/// Teardown runs pending finalizers and, if configured, finalizes every
/// live wrapper.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_env_destroy(env_handle: u64) -> i32 {
    ffi_guard!({
        let removed = ffi_lock!(ENVS).remove(Handle::from_raw(env_handle));
        match removed {
            // Dropping the last Arc tears the env down, outside the table lock.
            Some(env) => {
                drop(env);
                TetherStatus::Ok as i32
            }
            None => TetherStatus::InvalidHandle as i32,
        }
    })
}

/// Open a handle scope. Writes the new depth to `depth_out` if non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_scope_open(env_handle: u64, depth_out: *mut u64) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let depth = ffi_lock!(env_arc).open_scope();
        if !depth_out.is_null() {
            // SAFETY: depth_out is valid per caller contract.
            unsafe { *depth_out = depth as u64 };
        }
        TetherStatus::Ok as i32
    })
}

/// Close the innermost handle scope.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_scope_close(env_handle: u64) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        match env.close_scope() {
            Ok(_) => TetherStatus::Ok as i32,
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

/// Run a collection cycle. Writes the report to `report_out` if non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_collect(env_handle: u64, report_out: *mut TetherCollectReport) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let report = ffi_lock!(env_arc).collect();
        if !report_out.is_null() {
            // SAFETY: report_out is valid per caller contract.
            unsafe { *report_out = report.into() };
        }
        TetherStatus::Ok as i32
    })
}

/// Run queued finalizers. Writes how many completed to `finalized_out`
/// if non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_drain_finalizers(env_handle: u64, finalized_out: *mut u64) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let finalized = ffi_lock!(env_arc).drain_finalizers();
        if !finalized_out.is_null() {
            // SAFETY: finalized_out is valid per caller contract.
            unsafe { *finalized_out = finalized as u64 };
        }
        TetherStatus::Ok as i32
    })
}

/// Finalizers of this env that have completed.
///
/// **Ambiguity warning:** returns 0 for both "none yet" and "invalid
/// handle." Prefer [`tether_finalize_count_get`] for error detection.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_finalize_count(env_handle: u64) -> u64 {
    ffi_guard_or!(0, {
        get_env(env_handle)
            .and_then(|arc| arc.lock().ok().map(|env| env.finalize_count()))
            .unwrap_or(0)
    })
}

/// Finalize count with explicit error reporting.
///
/// Writes the count to `*out` and returns `TETHER_OK`. Returns
/// `InvalidHandle` or `InternalError` without writing to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_finalize_count_get(env_handle: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let env = ffi_lock!(env_arc);
        // SAFETY: out is valid per caller contract.
        unsafe { *out = env.finalize_count() };
        TetherStatus::Ok as i32
    })
}

/// Keep `object` alive until the root written to `root_out` is released.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_persist(env_handle: u64, object: u64, root_out: *mut u64) -> i32 {
    ffi_guard!({
        if root_out.is_null() {
            return TetherStatus::InvalidArgument as i32;
        }
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        match env.persist(ObjectId(object)) {
            Ok(root) => {
                // SAFETY: root_out is valid per caller contract.
                unsafe { *root_out = root.0 };
                TetherStatus::Ok as i32
            }
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

/// Release a persistent root.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_release_root(env_handle: u64, root: u64) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        match env.release_root(RootId(root)) {
            Ok(_) => TetherStatus::Ok as i32,
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}

/// Remove the wrapper on `object` without finalizing it, releasing the
/// native value. Writes the value to `value_out` if non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tether_unwrap(env_handle: u64, object: u64, value_out: *mut f64) -> i32 {
    ffi_guard!({
        let env_arc = match get_env(env_handle) {
            Some(arc) => arc,
            None => return TetherStatus::InvalidHandle as i32,
        };
        let mut env = ffi_lock!(env_arc);
        match env.unwrap_value(ObjectId(object)) {
            Ok(value) => {
                if !value_out.is_null() {
                    // SAFETY: value_out is valid per caller contract.
                    unsafe { *value_out = value };
                }
                TetherStatus::Ok as i32
            }
            Err(e) => TetherStatus::from(&e) as i32,
        }
    })
}
