//! Async Execution Tests

use crate::*;
use txscope::{spawn_propagated, ExecutionError, TransactionInfo};

async fn business_across_yields(fail: bool) -> Result<Vec<Option<Xid>>, BusinessError> {
    let mut seen = Vec::new();
    for _ in 0..16 {
        seen.push(RootContext::current_xid());
        tokio::task::yield_now().await;
    }
    if fail {
        Err(BusinessError("late failure"))
    } else {
        Ok(seen)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_launcher_commits() {
    let tm = MockTm::new();
    let t = template(&tm);
    let seen = tokio::spawn(async move {
        t.execute_async(&TransactionInfo::new("async-transfer"), business_across_yields(false))
            .await
    })
    .await
    .unwrap()
    .unwrap();

    assert!(seen.iter().all(|x| x.as_ref().map(Xid::as_str) == Some(DEFAULT_XID)));
    assert_eq!(tm.calls().last(), Some(&Call::Commit(DEFAULT_XID.into())));
    assert_eq!(RootContext::current_xid(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_launcher_rolls_back() {
    let tm = MockTm::new();
    let err = template(&tm)
        .execute_async(&TransactionInfo::default(), business_across_yields(true))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Business(BusinessError("late failure"))));
    assert_eq!(tm.calls().last(), Some(&Call::Rollback(DEFAULT_XID.into())));
    assert_eq!(RootContext::current_xid(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_participant_inside_propagated_task() {
    let tm = MockTm::new();
    let t = template(&tm);
    RootContext::bind(Xid::new("upstream").unwrap());

    let seen = spawn_propagated(async move {
        t.execute_async(&TransactionInfo::default(), business_across_yields(false))
            .await
    })
    .await
    .unwrap()
    .unwrap();
    reset();

    assert!(seen.iter().all(|x| x.as_ref().map(Xid::as_str) == Some("upstream")));
    assert!(tm.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_async_launcher_rolls_back() {
    let tm = MockTm::new();
    let t = template(&tm);
    let info = TransactionInfo::new("stuck-transfer");
    let result = tokio::time::timeout(
        std::time::Duration::from_millis(10),
        t.execute_async(&info, std::future::pending::<Result<(), BusinessError>>()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(tm.calls().last(), Some(&Call::Rollback(DEFAULT_XID.into())));
    assert_eq!(tm.calls().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_aborted_async_launcher_rolls_back() {
    let tm = MockTm::new();
    let t = template(&tm);
    let handle = tokio::spawn(async move {
        let info = TransactionInfo::new("aborted-transfer");
        t.execute_async(&info, std::future::pending::<Result<(), BusinessError>>())
            .await
    });
    while tm.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    handle.abort();

    assert!(handle.await.unwrap_err().is_cancelled());
    assert_eq!(tm.calls().last(), Some(&Call::Rollback(DEFAULT_XID.into())));
}
