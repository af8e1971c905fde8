//! Integration test: a C finalizer callback that reports an error aborts
//! the process, with the callback's message on stderr.

use std::ffi::{c_char, c_void};
use std::process::Command;

use tether_ffi::{
    tether_collect, tether_create_external_with_finalize, tether_env_create, tether_scope_close,
    tether_scope_open, TetherStatus,
};

const CHILD_ENV: &str = "TETHER_FFI_ABORT_CHILD";

extern "C" fn throwing_callback(_user_data: *mut c_void) -> *const c_char {
    c"finalizer error".as_ptr()
}

#[test]
fn failing_callback_aborts_process() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let mut env = 0u64;
        assert_eq!(
            tether_env_create(std::ptr::null(), &mut env),
            TetherStatus::Ok as i32
        );
        tether_scope_open(env, std::ptr::null_mut());
        let mut handle = 0u64;
        assert_eq!(
            tether_create_external_with_finalize(
                env,
                Some(throwing_callback),
                std::ptr::null_mut(),
                &mut handle,
                std::ptr::null_mut()
            ),
            TetherStatus::Ok as i32
        );
        tether_scope_close(env);
        tether_collect(env, std::ptr::null_mut());
        unreachable!("collection must abort");
    }

    let exe = std::env::current_exe().expect("test binary path");
    let output = Command::new(exe)
        .args(["failing_callback_aborts_process", "--exact", "--nocapture"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("spawn child test process");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "child exited cleanly: {stderr}");
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(output.status.signal(), Some(6), "stderr: {stderr}");
    }
    assert!(stderr.contains("finalizer error"), "stderr: {stderr}");
}
