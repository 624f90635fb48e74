//! Error types shared across the workspace
//!
//! - [`CoreError`]: model validation and lookup failures
//! - [`TransactionError`]: failures reported by the transaction manager,
//!   tagged with a [`TransactionExceptionCode`]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by the core model types
#[derive(Debug, Error)]
pub enum CoreError {
    /// Xid was empty or whitespace
    #[error("xid must not be blank")]
    InvalidXid,

    /// Branch type code outside the known range
    #[error("unknown branch type code: {0}")]
    UnknownBranchType(u8),

    /// Branch type name that does not match any variant
    #[error("unknown branch type name: {0}")]
    InvalidBranchTypeName(String),

    /// Global status code outside the known range
    #[error("unknown global status code: {0}")]
    UnknownGlobalStatus(i32),

    /// Exception code ordinal outside the known range
    #[error("unknown transaction exception code: {0}")]
    UnknownExceptionCode(i32),

    /// Lock query parameters failed validation
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Failure reported by the transaction layer
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Result type for transaction manager calls
pub type TxResult<T> = std::result::Result<T, TransactionError>;

/// Classification of a transaction-layer failure
///
/// Ordinals are part of the wire protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionExceptionCode {
    /// Unknown failure
    Unknown,
    /// Global transaction could not be started
    BeginFailed,
    /// Row lock held by another global transaction
    LockKeyConflict,
    /// Transport failure
    IO,
    /// Branch rollback failed, retry possible
    BranchRollbackFailedRetriable,
    /// Branch rollback failed, retry pointless
    BranchRollbackFailedUnretriable,
    /// Branch registration rejected
    BranchRegisterFailed,
    /// Branch status report rejected
    BranchReportFailed,
    /// Lock query failed
    LockableCheckFailed,
    /// Branch session missing
    BranchTransactionNotExist,
    /// Global session missing
    GlobalTransactionNotExist,
    /// Global session no longer active
    GlobalTransactionNotActive,
    /// Global session in an unexpected state
    GlobalTransactionStatusInvalid,
    /// Commit request could not be delivered to a branch
    FailedToSendBranchCommitRequest,
    /// Rollback request could not be delivered to a branch
    FailedToSendBranchRollbackRequest,
    /// Branch could not be attached to the global session
    FailedToAddBranch,
    /// Global session lock could not be taken
    FailedLockGlobalTransaction,
    /// Session could not be persisted
    FailedWriteSession,
    /// Store failure
    FailedStore,
    /// Request reached a non-leader coordinator
    NotRaftLeader,
    /// Lock conflict, caller asked to fail fast
    LockKeyConflictFailFast,
    /// Transaction exceeded its timeout
    TransactionTimeout,
    /// Commit outcome is heuristic
    CommitHeuristic,
    /// Coordinator connection broken
    Broken,
}

impl TransactionExceptionCode {
    /// All codes in ordinal order
    pub const ALL: [TransactionExceptionCode; 24] = [
        TransactionExceptionCode::Unknown,
        TransactionExceptionCode::BeginFailed,
        TransactionExceptionCode::LockKeyConflict,
        TransactionExceptionCode::IO,
        TransactionExceptionCode::BranchRollbackFailedRetriable,
        TransactionExceptionCode::BranchRollbackFailedUnretriable,
        TransactionExceptionCode::BranchRegisterFailed,
        TransactionExceptionCode::BranchReportFailed,
        TransactionExceptionCode::LockableCheckFailed,
        TransactionExceptionCode::BranchTransactionNotExist,
        TransactionExceptionCode::GlobalTransactionNotExist,
        TransactionExceptionCode::GlobalTransactionNotActive,
        TransactionExceptionCode::GlobalTransactionStatusInvalid,
        TransactionExceptionCode::FailedToSendBranchCommitRequest,
        TransactionExceptionCode::FailedToSendBranchRollbackRequest,
        TransactionExceptionCode::FailedToAddBranch,
        TransactionExceptionCode::FailedLockGlobalTransaction,
        TransactionExceptionCode::FailedWriteSession,
        TransactionExceptionCode::FailedStore,
        TransactionExceptionCode::NotRaftLeader,
        TransactionExceptionCode::LockKeyConflictFailFast,
        TransactionExceptionCode::TransactionTimeout,
        TransactionExceptionCode::CommitHeuristic,
        TransactionExceptionCode::Broken,
    ];

    /// Ordinal of this code
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Look up a code by ordinal
    pub fn from_ordinal(ordinal: i32) -> CoreResult<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| TransactionExceptionCode::ALL.get(idx).copied())
            .ok_or(CoreError::UnknownExceptionCode(ordinal))
    }
}

impl fmt::Display for TransactionExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Failure reported by the transaction manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct TransactionError {
    /// Failure classification
    pub code: TransactionExceptionCode,
    /// Human-readable detail
    pub message: String,
}

impl TransactionError {
    /// Create a transaction error
    pub fn new(code: TransactionExceptionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an error with [`TransactionExceptionCode::Unknown`]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransactionExceptionCode::Unknown, message)
    }

    /// Check if this error is a lock conflict.
    ///
    /// Lock conflicts may succeed when the business method is retried.
    pub fn is_lock_conflict(&self) -> bool {
        matches!(
            self.code,
            TransactionExceptionCode::LockKeyConflict
                | TransactionExceptionCode::LockKeyConflictFailFast
        )
    }
}
