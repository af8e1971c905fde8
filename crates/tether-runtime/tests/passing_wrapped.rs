//! Integration test: wrapped objects passed back into native operations,
//! then collected and counted.

use proptest::prelude::*;
use tether_runtime::addon::{add, create_object, finalize_count};
use tether_runtime::Env;
use tether_test_utils::{gc_until, test_env};

#[test]
fn add_then_finalize_both() {
    let mut env: Env<f64> = test_env();
    let sum = env.with_scope(|env| {
        let a = create_object(env, 10.0).unwrap();
        let b = create_object(env, 20.0).unwrap();
        add(env, a, b).unwrap()
    });
    assert_eq!(sum, 30.0);

    gc_until(&mut env, "both wrappers finalized", |env| {
        finalize_count(env) == 2
    });
    assert_eq!(env.metrics().live_native, 0);
}

#[test]
fn escaped_object_outlives_inner_scope() {
    let mut env: Env<f64> = test_env();
    env.with_scope(|env| {
        let kept = env.with_scope(|env| {
            let kept = create_object(env, 1.5).unwrap();
            create_object(env, 2.5).unwrap();
            let owner = env.owner_of(kept).unwrap();
            env.escape(owner).unwrap();
            kept
        });
        env.collect();
        assert_eq!(finalize_count(env), 1);
        assert_eq!(env.get(kept), Ok(&1.5));
    });
    env.collect();
    assert_eq!(finalize_count(&env), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn add_matches_float_sum(a in -1.0e9f64..1.0e9, b in -1.0e9f64..1.0e9) {
        let mut env: Env<f64> = test_env();
        let sum = env.with_scope(|env| {
            let x = create_object(env, a).unwrap();
            let y = create_object(env, b).unwrap();
            add(env, x, y).unwrap()
        });
        prop_assert_eq!(sum, a + b);
    }

    #[test]
    fn n_unreachable_objects_finalize_n_times(n in 0usize..128) {
        let mut env: Env<f64> = test_env();
        env.with_scope(|env| {
            for i in 0..n {
                create_object(env, i as f64).unwrap();
            }
        });
        gc_until(&mut env, "all finalized", |env| finalize_count(env) == n as u64);
        prop_assert_eq!(env.metrics().live_native, 0);
        prop_assert_eq!(env.metrics().tracked_wrappers, 0);
    }
}
