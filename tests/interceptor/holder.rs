//! Process-wide Manager Tests

use crate::*;
use serial_test::serial;
use txscope::{ExecutionError, EngineError, TransactionInfo, TransactionManagerHolder};

#[test]
#[serial(tm_holder)]
fn test_template_without_manager_fails_fast() {
    reset();
    TransactionManagerHolder::take();
    let err = TransactionalTemplate::new(TmOptions::default())
        .execute(&TransactionInfo::default(), || Ok::<_, BusinessError>(()))
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Manager(EngineError::ManagerNotInstalled)));
    let facade: txscope::Error = err.into();
    assert!(matches!(facade, txscope::Error::ManagerNotInstalled));
}

#[test]
#[serial(tm_holder)]
fn test_template_uses_installed_manager() {
    reset();
    let tm = MockTm::new();
    TransactionManagerHolder::set(tm.clone());

    TransactionalTemplate::new(TmOptions::default())
        .execute(&TransactionInfo::new("via-holder"), || Ok::<_, BusinessError>(()))
        .unwrap();
    TransactionManagerHolder::take();

    assert_eq!(tm.calls().len(), 2);
}

#[test]
#[serial(tm_holder)]
fn test_participant_needs_no_manager() {
    reset();
    TransactionManagerHolder::take();
    RootContext::bind(Xid::new("upstream").unwrap());
    let result = TransactionalTemplate::new(TmOptions::default())
        .execute(&TransactionInfo::default(), || Ok::<_, BusinessError>(7));
    reset();
    assert_eq!(result.unwrap(), 7);
}
