//! Scope Scenario Tests
//!
//! The reference activate/deactivate scenarios, run through the facade.

use crate::*;
use txscope::TransactionScope;

// =============================================================================
// SAME-WORKER SCENARIOS
// =============================================================================

#[test]
fn test_explicit_id_overrides_then_restores() {
    reset();
    RootContext::bind(xid("T1"));
    let mut scope = TransactionScope::with_xid(xid("T2"));

    scope.activate().unwrap();
    assert_eq!(RootContext::current_xid(), Some(xid("T2")));
    scope.deactivate().unwrap();
    assert_eq!(RootContext::current_xid(), Some(xid("T1")));
    reset();
}

#[test]
fn test_explicit_id_on_empty_worker_restores_absent() {
    reset();
    let mut scope = TransactionScope::with_xid(xid("T3"));

    scope.activate().unwrap();
    assert_eq!(RootContext::current_xid(), Some(xid("T3")));
    scope.deactivate().unwrap();
    assert_eq!(RootContext::current_xid(), None);
}

#[test]
fn test_absent_id_never_clears_enclosing_binding() {
    reset();
    RootContext::bind(xid("T1"));
    let mut scope = TransactionScope::empty();

    scope.activate().unwrap();
    assert_eq!(RootContext::current_xid(), Some(xid("T1")));
    scope.deactivate().unwrap();
    assert_eq!(RootContext::current_xid(), Some(xid("T1")));
    reset();
}

#[test]
fn test_absent_id_on_empty_worker_is_noop() {
    reset();
    let mut scope = TransactionScope::new(None);

    scope.activate().unwrap();
    assert_eq!(RootContext::current_xid(), None);
    scope.deactivate().unwrap();
    assert_eq!(RootContext::current_xid(), None);
}

// =============================================================================
// CROSS-WORKER SCENARIO
// =============================================================================

#[test]
fn test_captured_id_migrates_to_fresh_worker() {
    reset();
    RootContext::bind(xid("T4"));
    let scope = TransactionScope::capture();

    let (during, after) = on_fresh_worker(move || {
        let mut scope = scope;
        assert_eq!(RootContext::current_xid(), None);
        scope.activate().unwrap();
        let during = RootContext::current_xid();
        scope.deactivate().unwrap();
        (during, RootContext::current_xid())
    });

    assert_eq!(during, Some(xid("T4")));
    assert_eq!(after, None);
    assert_eq!(RootContext::current_xid(), Some(xid("T4")), "origin untouched");
    reset();
}

#[test]
fn test_business_rebind_is_undone_on_deactivate() {
    reset();
    RootContext::bind(xid("outer"));
    let mut scope = TransactionScope::with_xid(xid("inner"));

    scope
        .run(|| {
            RootContext::bind(xid("stray"));
        })
        .unwrap();
    assert_eq!(RootContext::current_xid(), Some(xid("outer")));
    reset();
}

#[test]
fn test_misuse_is_reported_not_absorbed() {
    reset();
    let mut scope = TransactionScope::with_xid(xid("T"));
    assert!(scope.deactivate().is_err());

    scope.activate().unwrap();
    let err: txscope::Error = scope.activate().unwrap_err().into();
    assert!(err.is_misuse());
    scope.deactivate().unwrap();
    assert_eq!(RootContext::current_xid(), None);
}
