//! Tokio Task Migration Tests
//!
//! Multi-threaded runtime tests: tasks are free to resume on any worker
//! after every `.await`.

use crate::*;
use std::time::Duration;
use txscope::{spawn_blocking_propagated, spawn_propagated, PropagateExt, TransactionScope};

async fn observe_across_yields(rounds: usize) -> Vec<Option<Xid>> {
    let mut seen = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        seen.push(RootContext::current_xid());
        tracing::debug!(in_transaction = RootContext::in_global_transaction(), "task polled");
        tokio::task::yield_now().await;
    }
    seen
}

// =============================================================================
// SPAWN TESTS
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unwrapped_task_sees_nothing() {
    RootContext::bind(xid("DEFAULT_XID"));
    let seen = tokio::spawn(observe_across_yields(4)).await.unwrap();
    assert!(seen.iter().all(Option::is_none));
    reset();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_propagated_task_sees_xid_after_every_yield() {
    init_tracing();
    RootContext::bind(xid("DEFAULT_XID"));
    let seen = spawn_propagated(observe_across_yields(64)).await.unwrap();
    reset();
    assert_eq!(seen.len(), 64);
    assert!(seen.iter().all(|x| x.as_ref() == Some(&xid("DEFAULT_XID"))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_keep_their_own_xids() {
    let mut handles = Vec::new();
    for _ in 0..32 {
        let tx = fresh_xid();
        RootContext::bind(tx.clone());
        handles.push((tx, spawn_propagated(observe_across_yields(16))));
    }
    reset();

    for (tx, handle) in handles {
        let seen = handle.await.unwrap();
        assert!(seen.iter().all(|x| x.as_ref() == Some(&tx)));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_child_task_inherits_through_parent() {
    RootContext::bind(xid("parent"));
    let child_seen = spawn_propagated(async {
        tokio::task::yield_now().await;
        spawn_propagated(observe_across_yields(4)).await.unwrap()
    })
    .await
    .unwrap();
    reset();
    assert!(child_seen.iter().all(|x| x.as_ref() == Some(&xid("parent"))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_pool_hand_off() {
    let tx = fresh_xid();
    RootContext::bind(tx.clone());
    let seen = spawn_blocking_propagated(RootContext::current_xid).await.unwrap();
    reset();
    assert_eq!(seen, Some(tx));
}

// =============================================================================
// CANCELLATION TESTS
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aborted_tasks_leave_workers_clean() {
    RootContext::bind(fresh_xid());
    let stuck: Vec<_> = (0..16)
        .map(|_| spawn_propagated(std::future::pending::<()>()))
        .collect();
    reset();

    tokio::time::sleep(Duration::from_millis(20)).await;
    for handle in &stuck {
        handle.abort();
    }
    for handle in stuck {
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    let probes: Vec<_> = (0..64).map(|_| tokio::spawn(observe_across_yields(2))).collect();
    for probe in probes {
        assert!(probe.await.unwrap().iter().all(Option::is_none));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timed_out_future_restores_polling_worker() {
    RootContext::bind(xid("caller"));
    let fut = std::future::pending::<()>()
        .with_transaction_scope(TransactionScope::with_xid(xid("abandoned")));

    let result = tokio::time::timeout(Duration::from_millis(10), fut).await;
    assert!(result.is_err());
    assert_eq!(RootContext::current_xid(), Some(xid("caller")));
    reset();
}

// =============================================================================
// RESUMPTION SEMANTICS
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bind_inside_task_is_replaced_on_resume() {
    RootContext::bind(xid("captured"));
    let (during, after_yield) = spawn_propagated(async {
        RootContext::bind(xid("rebound"));
        let during = RootContext::current_xid();
        tokio::task::yield_now().await;
        (during, RootContext::current_xid())
    })
    .await
    .unwrap();
    reset();

    assert_eq!(during, Some(xid("rebound")));
    assert_eq!(after_yield, Some(xid("captured")));
}
