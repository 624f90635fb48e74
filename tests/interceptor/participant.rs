//! Participant Tests
//!
//! XID already bound on entry: the template runs the business call and
//! leaves the binding and the manager alone.

use crate::*;
use txscope::{ExecutionError, GlobalTransactionRole, TransactionInfo};

#[test]
fn test_participant_success_leaves_binding() {
    reset();
    RootContext::bind(Xid::new("upstream").unwrap());
    assert_eq!(TransactionalTemplate::role(), GlobalTransactionRole::Participant);

    let tm = MockTm::new();
    let seen = template(&tm)
        .execute(&TransactionInfo::default(), || {
            Ok::<_, BusinessError>(RootContext::current_xid())
        })
        .unwrap();

    assert_eq!(seen.unwrap().as_str(), "upstream");
    assert!(tm.calls().is_empty());
    assert_eq!(RootContext::current_xid().unwrap().as_str(), "upstream");
    reset();
}

#[test]
fn test_participant_failure_is_not_rolled_back_locally() {
    reset();
    RootContext::bind(Xid::new("upstream").unwrap());
    let tm = MockTm::new();
    let err = template(&tm)
        .execute(&TransactionInfo::default(), || {
            Err::<(), _>(BusinessError("stock exhausted"))
        })
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Business(BusinessError("stock exhausted"))));
    assert!(tm.calls().is_empty());
    assert_eq!(RootContext::current_xid().unwrap().as_str(), "upstream");
    reset();
}
