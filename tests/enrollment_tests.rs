// tests/enrollment_tests.rs
mod common;

use common::{register_demo_users, sample, TestContext};
use facepay::core::matcher::MatchResult;
use facepay::utils::config::Config;
use facepay::Engine;

#[test]
fn test_registered_users_list_in_enrollment_order() {
    let ctx = TestContext::new();
    register_demo_users(&ctx);

    assert_eq!(
        ctx.engine.enrollment().registered_users(),
        vec!["alice", "bob"]
    );
    assert!(ctx.engine.enrollment().has_pin("alice"));
    assert!(ctx.engine.enrollment().has_pin("bob"));
}

#[test]
fn test_reenrollment_keeps_a_single_listing() {
    let ctx = TestContext::new();
    let enrollment = ctx.engine.enrollment();

    enrollment
        .register("alice", sample(&[0.1, 0.2]), "1234")
        .expect("Failed to register");
    enrollment
        .register("alice", sample(&[0.15, 0.25]), "1234")
        .expect("Failed to re-register");

    assert_eq!(enrollment.registered_users(), vec!["alice"]);
}

#[test]
fn test_rejected_pin_blocks_registration_entirely() {
    let ctx = TestContext::new();
    let enrollment = ctx.engine.enrollment();

    assert!(enrollment
        .register("alice", sample(&[0.1, 0.2]), "12a4")
        .is_err());
    assert!(enrollment.registered_users().is_empty());
    assert!(!enrollment.has_pin("alice"));
}

#[test]
fn test_removed_user_can_no_longer_authorize() {
    let ctx = TestContext::new();
    register_demo_users(&ctx);

    assert!(ctx.engine.enrollment().remove_user("alice").unwrap());
    assert!(!ctx.engine.enrollment().remove_user("alice").unwrap());
    assert_eq!(ctx.engine.enrollment().registered_users(), vec!["bob"]);
    assert!(!ctx.engine.enrollment().has_pin("alice"));

    let auth = ctx.engine.authorization();
    auth.begin_transaction("5.00").unwrap();
    let result = auth.submit_probe(&sample(&[0.1, 0.2])).unwrap();

    // Alice's old probe no longer lands near anyone.
    assert_eq!(result, MatchResult::NoMatch);
}

#[test]
fn test_change_pin_end_to_end() {
    let ctx = TestContext::new();
    register_demo_users(&ctx);
    let enrollment = ctx.engine.enrollment();

    assert!(enrollment.change_pin("alice", "0000", "4321").is_err());
    enrollment
        .change_pin("alice", "1234", "4321")
        .expect("Failed to change PIN");

    let auth = ctx.engine.authorization();
    auth.begin_transaction("5.00").unwrap();
    auth.submit_probe(&sample(&[0.1, 0.2])).unwrap();
    assert!(!auth.submit_pin("1234").unwrap());
    auth.complete().unwrap();

    auth.begin_transaction("5.00").unwrap();
    auth.submit_probe(&sample(&[0.1, 0.2])).unwrap();
    assert!(auth.submit_pin("4321").unwrap());
}

#[test]
fn test_enrollment_survives_an_engine_restart() {
    let dir = tempfile::tempdir().expect("Failed to create tempdir");
    let mut config = Config::default();
    config.storage.data_dir = dir.path().to_path_buf();

    {
        let engine = Engine::new(config.clone()).expect("Failed to build engine");
        engine
            .enrollment()
            .register("alice", sample(&[0.1, 0.2]), "1234")
            .expect("Failed to register");
    }

    let engine = Engine::new(config).expect("Failed to rebuild engine");
    assert_eq!(engine.enrollment().registered_users(), vec!["alice"]);

    let auth = engine.authorization();
    auth.begin_transaction("7.00").unwrap();
    let result = auth.submit_probe(&sample(&[0.1, 0.2])).unwrap();
    assert!(matches!(
        result,
        MatchResult::Matched { ref identity, .. } if identity == "alice"
    ));
    assert!(auth.submit_pin("1234").unwrap());
}

#[test]
fn test_default_single_sample_policy_forgets_the_old_face() {
    // The shipped embedding default keeps one reference per identity.
    let ctx = TestContext::new();

    let enrollment = ctx.engine.enrollment();
    enrollment
        .register("alice", sample(&[0.1, 0.2]), "1234")
        .unwrap();
    enrollment.enroll_sample("alice", sample(&[3.0, 3.0])).unwrap();

    let auth = ctx.engine.authorization();
    auth.begin_transaction("2.00").unwrap();
    assert_eq!(
        auth.submit_probe(&sample(&[0.1, 0.2])).unwrap(),
        MatchResult::NoMatch
    );
    auth.cancel();

    auth.begin_transaction("2.00").unwrap();
    assert!(matches!(
        auth.submit_probe(&sample(&[3.0, 3.0])).unwrap(),
        MatchResult::Matched { .. }
    ));
}

#[test]
fn test_sample_cap_evicts_the_oldest_reference() {
    let mut config = Config::default();
    config.matcher.max_samples_per_identity = 3;
    let ctx = TestContext::with_config(config);
    let enrollment = ctx.engine.enrollment();

    enrollment.register("alice", sample(&[0.0, 0.0]), "1234").unwrap();
    for spot in [[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]] {
        enrollment.enroll_sample("alice", sample(&spot)).unwrap();
    }

    let auth = ctx.engine.authorization();
    auth.begin_transaction("2.00").unwrap();
    assert_eq!(
        auth.submit_probe(&sample(&[0.0, 0.0])).unwrap(),
        MatchResult::NoMatch
    );
    auth.cancel();

    auth.begin_transaction("2.00").unwrap();
    assert!(matches!(
        auth.submit_probe(&sample(&[1.0, 1.0])).unwrap(),
        MatchResult::Matched { .. }
    ));
}
