//! Thread Hand-off Tests
//!
//! Closure wrapping for `std::thread` and hand-rolled worker pools.

use crate::*;
use std::sync::mpsc;
use txscope::{wrap, TransactionScope};

// =============================================================================
// WRAP TESTS
// =============================================================================

#[test]
fn test_unwrapped_thread_sees_nothing() {
    reset();
    RootContext::bind(fresh_xid());
    assert_eq!(on_fresh_worker(RootContext::current_xid), None);
    reset();
}

#[test]
fn test_wrapped_thread_sees_captured_xid() {
    reset();
    let tx = fresh_xid();
    RootContext::bind(tx.clone());
    let job = TransactionScope::capture().wrap(RootContext::current_xid);
    assert_eq!(on_fresh_worker(job), Some(tx));
    reset();
}

#[test]
fn test_wrap_captures_at_construction() {
    reset();
    RootContext::bind(xid("at-construction"));
    let job = wrap(TransactionScope::capture(), RootContext::current_xid);
    RootContext::bind(xid("at-spawn"));

    assert_eq!(on_fresh_worker(job), Some(xid("at-construction")));
    reset();
}

// =============================================================================
// WORKER POOL TESTS
// =============================================================================

type Job = Box<dyn FnOnce() + Send>;

/// Two long-lived workers pulling jobs off one queue
fn pool(jobs: Vec<Job>) {
    let (tx, rx) = mpsc::channel::<Job>();
    let rx = std::sync::Arc::new(parking_lot::Mutex::new(rx));
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let rx = rx.clone();
            std::thread::spawn(move || loop {
                let job = rx.lock().recv();
                match job {
                    Ok(job) => {
                        job();
                        assert_eq!(RootContext::current_xid(), None, "worker left dirty");
                    }
                    Err(_) => break,
                }
            })
        })
        .collect();
    for job in jobs {
        tx.send(job).unwrap();
    }
    drop(tx);
    for w in workers {
        w.join().unwrap();
    }
}

#[test]
fn test_pool_workers_never_leak_between_jobs() {
    reset();
    let (seen_tx, seen_rx) = mpsc::channel();
    let mut expected = Vec::new();
    let mut jobs: Vec<Job> = Vec::new();

    for i in 0..16 {
        let tx = if i % 3 == 0 { None } else { Some(fresh_xid()) };
        expected.push((i, tx.clone()));
        let seen_tx = seen_tx.clone();
        jobs.push(Box::new(wrap(TransactionScope::new(tx), move || {
            seen_tx.send((i, RootContext::current_xid())).unwrap();
        })));
    }
    drop(seen_tx);
    pool(jobs);

    let mut seen: Vec<_> = seen_rx.iter().collect();
    seen.sort_by_key(|(i, _)| *i);
    assert_eq!(seen, expected);
}

#[test]
fn test_nested_scopes_on_one_thread_unwind_like_a_stack() {
    reset();
    let (a, b, c) = (fresh_xid(), fresh_xid(), fresh_xid());
    RootContext::bind(a.clone());

    let mut outer = TransactionScope::with_xid(b.clone());
    let mut inner = TransactionScope::with_xid(c.clone());
    {
        let _o = outer.enter().unwrap();
        assert_eq!(RootContext::current_xid(), Some(b.clone()));
        {
            let _i = inner.enter().unwrap();
            assert_eq!(RootContext::current_xid(), Some(c));
        }
        assert_eq!(RootContext::current_xid(), Some(b));
    }
    assert_eq!(RootContext::current_xid(), Some(a));
    reset();
}

#[test]
fn test_panicking_job_still_restores_worker() {
    reset();
    let job = wrap(TransactionScope::with_xid(fresh_xid()), || {
        panic!("business failure");
    });
    let after = on_fresh_worker(move || {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));
        assert!(result.is_err());
        RootContext::current_xid()
    });
    assert_eq!(after, None);
}
